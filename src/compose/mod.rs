pub(crate) mod background;
pub(crate) mod blur;
pub(crate) mod loader;
