pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod markup;
pub(crate) mod ops;
pub(crate) mod text;
