pub(crate) mod image_out;
pub(crate) mod sink;
pub(crate) mod template;
