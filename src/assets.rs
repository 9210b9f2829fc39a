pub(crate) mod decode;
pub(crate) mod load;
pub(crate) mod mask;
pub(crate) mod resolve;
