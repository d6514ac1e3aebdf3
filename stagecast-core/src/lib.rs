//! Stagecast renders image sequences of time-sampled 3D stages through a scene camera.
//!
//! A run is a straight pipeline:
//!
//! 1. **Load**: open a [`Stage`] from a JSON layer, eagerly grafting every referenced layer
//!    through an [`AssetResolver`].
//! 2. **Provision**: create a [`DrawableSurface`] once via a [`SurfaceProvider`].
//! 3. **Frame loop**: for each frame, evaluate the [`SceneCamera`], conform it to the output
//!    aspect, rasterize the render-root subtree with a [`RenderBackend`], read the color buffer
//!    back, flip it top-down and hand it to a [`FrameSink`].
//!
//! Every failure is fatal to the run; per-frame failures carry the frame and the
//! [`FrameStage`] that failed. Both renderer kinds rasterize on the CPU and produce identical
//! pixels.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod camera;
mod config;
mod encode;
mod foundation;
mod render;
mod scene;
mod session;

pub use camera::conform::ConformPolicy;
pub use camera::frustum::{Frustum, Window};
pub use camera::scene_camera::SceneCamera;
pub use config::settings::{
    MAX_COMPLEXITY, MIN_COMPLEXITY, RenderConfig, build_thread_pool, resolve_thread_count,
};
pub use encode::image_out::{
    FrameImage, PixelEncoding, RgbFrame, flip_vertical, output_format, write_image,
};
pub use encode::sink::{FrameSink, ImageSequenceSink, InMemorySink, SinkConfig};
pub use encode::template::OutputTemplate;
pub use foundation::core::{FrameIndex, FrameRange, Resolution, Rgb};
pub use foundation::error::{StagecastError, StagecastResult};
pub use foundation::fingerprint::FrameFingerprint;
pub use foundation::math::{Lerp, Mat4, Vec3, Vec4};
pub use render::backend::{RenderBackend, RenderReport, RendererKind, create_backend};
pub use render::params::{CameraState, CullStyle, DrawMode, HeadLight, RenderParams};
pub use render::surface::{
    DrawableSurface, Framebuffer, HeadlessProvider, HeadlessSurface, MAX_SURFACE_DIMENSION,
    MAX_SURFACE_PIXELS, SurfaceProvider,
};
pub use scene::model::{
    CameraDef, CubeDef, LAYER_VERSION, Layer, MeshDef, Orientation, PrimDef, PrimKind,
    Projection, Purpose, SphereDef, SubdivisionScheme, Visibility, XformOps,
};
pub use scene::path::ScenePath;
pub use scene::resolver::{
    ASSET_PATH_ENV, AssetResolver, FileResolver, MemoryResolver, SchemeResolver,
    parse_search_paths,
};
pub use scene::samples::{Sampled, TimeSample};
pub use scene::stage::{Prim, PrimId, Stage};
pub use session::frame_loop::{
    FrameReport, FrameStage, RenderSession, RenderStats, render_sequence,
};
