pub(crate) mod geometry;
pub(crate) mod model;
pub(crate) mod path;
pub(crate) mod resolver;
pub(crate) mod samples;
pub(crate) mod stage;
