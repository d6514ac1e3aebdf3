use std::path::PathBuf;
use std::sync::Arc;

use crate::camera::scene_camera::SceneCamera;
use crate::config::settings::{RenderConfig, build_thread_pool};
use crate::encode::image_out::{RgbFrame, flip_vertical};
use crate::encode::sink::{FrameSink, ImageSequenceSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Resolution};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::foundation::fingerprint::{FrameFingerprint, fingerprint_rgb_f32};
use crate::render::backend::{RenderBackend, create_backend};
use crate::render::params::{CameraState, HeadLight, RenderParams};
use crate::render::surface::{DrawableSurface, HeadlessProvider, SurfaceProvider};
use crate::scene::model::PrimKind;
use crate::scene::stage::{PrimId, Stage};

/// Step of the per-frame loop; attached to every per-frame error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    /// Nothing started yet.
    Idle,
    /// Evaluating and conforming the camera.
    ComputeCamera,
    /// Pushing camera, lighting and per-frame parameters to the backend.
    ConfigureRenderer,
    /// Clearing and drawing.
    Render,
    /// Reading the color buffer back.
    ReadBack,
    /// Flipping and handing the image to the sink.
    Export,
    /// Presenting the frame.
    SwapBuffers,
    /// Every frame finished.
    Done,
}

impl std::fmt::Display for FrameStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::ComputeCamera => "compute_camera",
            Self::ConfigureRenderer => "configure_renderer",
            Self::Render => "render",
            Self::ReadBack => "readback",
            Self::Export => "export",
            Self::SwapBuffers => "swap_buffers",
            Self::Done => "done",
        })
    }
}

/// One exported frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number.
    pub frame: FrameIndex,
    /// File written for the frame, if the sink writes files.
    pub path: Option<PathBuf>,
    /// Hash of the exported (flipped) pixels.
    pub fingerprint: FrameFingerprint,
}

/// Outcome of [`RenderSession::render_range`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the configured range.
    pub frames_total: u64,
    /// Frames rendered and exported.
    pub frames_rendered: u64,
    /// Per-frame reports in frame order.
    pub reports: Vec<FrameReport>,
}

/// Owns everything a batch render needs: configuration, stage, surface, backend and worker
/// pool.
pub struct RenderSession {
    config: RenderConfig,
    stage: Stage,
    camera: PrimId,
    root: PrimId,
    resolution: Resolution,
    params: RenderParams,
    backend: Box<dyn RenderBackend>,
    surface: Box<dyn DrawableSurface>,
    state: FrameStage,
}

impl RenderSession {
    /// Validate `config` against `stage` and provision the surface.
    ///
    /// The camera and render-root paths must resolve (and the camera prim must be a camera)
    /// before any surface is created.
    #[tracing::instrument(skip_all, fields(camera = %config.camera, select = %config.select))]
    pub fn new(
        config: RenderConfig,
        stage: Stage,
        provider: &dyn SurfaceProvider,
    ) -> StagecastResult<Self> {
        config.validate()?;
        let resolution = config.resolution()?;

        let camera_path = config.camera_path()?;
        let camera = stage.prim_at_path(&camera_path).ok_or_else(|| {
            StagecastError::config(format!("camera prim '{camera_path}' not found on stage"))
        })?;
        let camera_prim = stage.prim(camera);
        if !matches!(camera_prim.kind, PrimKind::Camera(_)) {
            return Err(StagecastError::config(format!(
                "prim '{camera_path}' is a {}, not a camera",
                camera_prim.kind.type_name()
            )));
        }
        let root_path = config.select_path()?;
        let root = stage.prim_at_path(&root_path).ok_or_else(|| {
            StagecastError::config(format!("render root '{root_path}' not found on stage"))
        })?;

        let pool = Arc::new(build_thread_pool(config.threads)?);
        let surface = provider.create_surface(resolution)?;
        let backend = create_backend(config.renderer, pool);
        tracing::info!(
            %resolution,
            renderer = %config.renderer,
            threads = config.threads,
            "render session ready"
        );

        Ok(Self {
            params: config.render_params(),
            config,
            stage,
            camera,
            root,
            resolution,
            backend,
            surface,
            state: FrameStage::Idle,
        })
    }

    /// Run configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Loaded stage.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Current loop step.
    pub fn state(&self) -> FrameStage {
        self.state
    }

    /// Render surface.
    pub fn surface(&self) -> &dyn DrawableSurface {
        self.surface.as_ref()
    }

    fn enter(&mut self, state: FrameStage, frame: FrameIndex) {
        self.state = state;
        tracing::debug!(frame = frame.0, stage = %state, "frame stage");
    }

    /// Camera at `frame`, conformed to the output aspect ratio.
    pub fn camera_for_frame(&self, frame: FrameIndex) -> StagecastResult<SceneCamera> {
        let mut camera = SceneCamera::at(&self.stage, self.camera, frame.as_time())?;
        camera.conform(self.config.conform, self.resolution.aspect());
        Ok(camera)
    }

    /// Draw `frame` and read back its color buffer (rows bottom-to-top).
    #[tracing::instrument(skip(self), fields(frame = frame.0))]
    pub fn render_frame(&mut self, frame: FrameIndex) -> StagecastResult<RgbFrame> {
        self.enter(FrameStage::ComputeCamera, frame);
        let camera = self
            .camera_for_frame(frame)
            .map_err(|e| e.at_frame(frame, FrameStage::ComputeCamera))?;
        let frustum = camera.frustum();

        self.enter(FrameStage::ConfigureRenderer, frame);
        self.backend.set_camera_state(CameraState {
            view: frustum.view_matrix(),
            projection: frustum.projection_matrix(),
            viewport: [0, 0, self.resolution.width, self.resolution.height],
        });
        self.params.frame = frame;
        self.params.force_refresh = true;
        self.params.clip_planes = camera.clip_planes().to_vec();
        self.backend
            .set_lighting(Some(HeadLight::at(frustum.position())));

        self.enter(FrameStage::Render, frame);
        self.surface.clear(self.params.clear_color, 1.0);
        self.backend
            .render(&self.stage, self.root, &self.params, self.surface.as_mut())
            .map_err(|e| e.at_frame(frame, FrameStage::Render))?;

        self.enter(FrameStage::ReadBack, frame);
        self.surface
            .flush()
            .and_then(|()| self.surface.read_pixels_rgb_f32())
            .map_err(|e| e.at_frame(frame, FrameStage::ReadBack))
    }

    /// Render every configured frame in order, handing each to `sink`.
    ///
    /// The first failure ends the run; later frames are not attempted.
    pub fn render_range(&mut self, sink: &mut dyn FrameSink) -> StagecastResult<RenderStats> {
        let range = self.config.frame_range();
        let mut stats = RenderStats {
            frames_total: range.len_frames(),
            ..RenderStats::default()
        };
        if range.is_empty() {
            tracing::warn!(
                first = range.first.0,
                last = range.last.0,
                "first frame is after last frame; nothing to render"
            );
        }

        sink.begin(SinkConfig {
            resolution: self.resolution,
            range,
        })?;
        for frame in range.frames() {
            let readback = self.render_frame(frame)?;

            self.enter(FrameStage::Export, frame);
            let image = flip_vertical(readback);
            let fingerprint = fingerprint_rgb_f32(image.width, image.height, &image.data);
            sink.push_frame(frame, &image)
                .map_err(|e| e.at_frame(frame, FrameStage::Export))?;
            stats.reports.push(FrameReport {
                frame,
                path: sink.target(frame),
                fingerprint,
            });

            self.enter(FrameStage::SwapBuffers, frame);
            self.surface
                .swap_buffers()
                .map_err(|e| e.at_frame(frame, FrameStage::SwapBuffers))?;
            stats.frames_rendered += 1;
        }
        sink.end()?;

        self.state = FrameStage::Done;
        tracing::info!(
            frames = stats.frames_rendered,
            total = stats.frames_total,
            "render finished"
        );
        Ok(stats)
    }
}

/// Render `config`'s frame range of `stage` to image files on a headless surface.
pub fn render_sequence(config: RenderConfig, stage: Stage) -> StagecastResult<RenderStats> {
    let template = config.output_template()?;
    let mut session = RenderSession::new(config, stage, &HeadlessProvider)?;
    let mut sink = ImageSequenceSink::new(template);
    session.render_range(&mut sink)
}

#[cfg(test)]
#[path = "../../tests/unit/session/frame_loop.rs"]
mod tests;
