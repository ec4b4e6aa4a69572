pub(crate) mod outline;
pub(crate) mod resolution;
pub(crate) mod text;
