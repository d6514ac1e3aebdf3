use std::sync::Arc;

use crate::foundation::error::StagecastResult;
use crate::render::cpu::{CpuRenderer, Schedule};
use crate::render::params::{CameraState, HeadLight, RenderParams};
use crate::render::surface::DrawableSurface;
use crate::scene::stage::{PrimId, Stage};

/// Available renderer backends.
///
/// Both rasterize on the CPU and produce identical pixels; they differ only in scheduling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Row bands rasterized in parallel on the session's thread pool.
    #[default]
    Opt,
    /// Single-threaded reference path.
    Simple,
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Opt => "opt",
            Self::Simple => "simple",
        })
    }
}

/// What a [`RenderBackend::render`] call drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Geometric prims submitted.
    pub prims_drawn: usize,
    /// Screen triangles after clipping and culling.
    pub triangles: usize,
    /// Screen line segments.
    pub lines: usize,
}

/// Draws a stage subtree into a surface.
///
/// Camera and lighting state persist across calls until set again.
pub trait RenderBackend {
    /// Which backend this is.
    fn kind(&self) -> RendererKind;

    /// Set view, projection and viewport.
    fn set_camera_state(&mut self, state: CameraState);

    /// Set the world-space head-light; `None` leaves surfaces unlit.
    fn set_lighting(&mut self, light: Option<HeadLight>);

    /// Draw the subtree at `root` into `surface`, depth-testing against its current contents.
    fn render(
        &mut self,
        stage: &Stage,
        root: PrimId,
        params: &RenderParams,
        surface: &mut dyn DrawableSurface,
    ) -> StagecastResult<RenderReport>;
}

/// Create a backend. `pool` bounds the internal parallelism of [`RendererKind::Opt`].
pub fn create_backend(kind: RendererKind, pool: Arc<rayon::ThreadPool>) -> Box<dyn RenderBackend> {
    match kind {
        RendererKind::Opt => Box::new(CpuRenderer::new(Schedule::Bands(pool))),
        RendererKind::Simple => Box::new(CpuRenderer::new(Schedule::Serial)),
    }
}
