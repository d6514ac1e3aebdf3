pub(crate) mod conform;
pub(crate) mod frustum;
pub(crate) mod scene_camera;
