use crate::camera::conform::ConformPolicy;
use crate::encode::image_out::output_format;
use crate::encode::template::OutputTemplate;
use crate::foundation::core::{FrameIndex, FrameRange, Resolution};
use crate::foundation::error::{StagecastError, StagecastResult};
use crate::render::backend::RendererKind;
use crate::render::params::{CullStyle, DrawMode, RenderParams};
use crate::scene::path::ScenePath;

/// Lowest accepted complexity.
pub const MIN_COMPLEXITY: f64 = 1.0;
/// Highest accepted complexity.
pub const MAX_COMPLEXITY: f64 = 2.0;

/// Settings for one batch render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Per-frame output path template.
    pub output: String,
    /// First frame, inclusive.
    pub first_frame: i64,
    /// Last frame, inclusive.
    pub last_frame: i64,
    /// Worker-thread hint: `0` uses every core, `n < 0` leaves `|n|` cores free.
    pub threads: i32,
    /// Render-root prim path.
    pub select: String,
    /// Camera prim path.
    pub camera: String,
    /// Tessellation complexity in `[1.0, 2.0]`.
    pub complexity: f64,
    /// Renderer backend.
    pub renderer: RendererKind,
    /// Draw mode.
    pub draw_mode: DrawMode,
    /// Cull style.
    pub cull_style: CullStyle,
    /// How the camera window is fitted to the output aspect.
    pub conform: ConformPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            output: "output_%04d.png".to_string(),
            first_frame: 1,
            last_frame: 1,
            threads: 0,
            select: "/".to_string(),
            camera: String::new(),
            complexity: MIN_COMPLEXITY,
            renderer: RendererKind::Opt,
            draw_mode: DrawMode::ShadedSmooth,
            cull_style: CullStyle::BackUnlessDoubleSided,
            conform: ConformPolicy::MatchVertically,
        }
    }
}

impl RenderConfig {
    /// Check every field; the first problem is reported as a configuration error.
    pub fn validate(&self) -> StagecastResult<()> {
        self.resolution()?;
        if !(MIN_COMPLEXITY..=MAX_COMPLEXITY).contains(&self.complexity) {
            return Err(StagecastError::config(format!(
                "complexity must be in [{MIN_COMPLEXITY}, {MAX_COMPLEXITY}] (got {})",
                self.complexity
            )));
        }
        self.camera_path()?;
        self.select_path()?;
        self.output_template()?;
        Ok(())
    }

    /// Output resolution.
    pub fn resolution(&self) -> StagecastResult<Resolution> {
        Resolution::new(self.width, self.height)
    }

    /// Frames to render; empty when `first_frame > last_frame`.
    pub fn frame_range(&self) -> FrameRange {
        FrameRange::new(FrameIndex(self.first_frame), FrameIndex(self.last_frame))
    }

    /// Parsed camera path.
    pub fn camera_path(&self) -> StagecastResult<ScenePath> {
        if self.camera.is_empty() {
            return Err(StagecastError::config("camera path is required"));
        }
        ScenePath::parse(&self.camera)
    }

    /// Parsed render-root path.
    pub fn select_path(&self) -> StagecastResult<ScenePath> {
        ScenePath::parse(&self.select)
    }

    /// Parsed output template; its extension must name a supported image format.
    pub fn output_template(&self) -> StagecastResult<OutputTemplate> {
        let template = OutputTemplate::parse(&self.output)?;
        output_format(&template.path_for(FrameIndex(0)))?;
        Ok(template)
    }

    /// Renderer parameters shared by every frame of the run.
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            frame: FrameIndex(self.first_frame),
            complexity: self.complexity,
            draw_mode: self.draw_mode,
            cull_style: self.cull_style,
            ..RenderParams::default()
        }
    }
}

/// Number of worker threads for a thread hint on a machine with `cores` logical cores.
pub fn resolve_thread_count(hint: i32, cores: usize) -> usize {
    let cores = cores.max(1);
    match hint {
        0 => cores,
        n if n > 0 => n as usize,
        n => cores.saturating_sub(n.unsigned_abs() as usize).max(1),
    }
}

/// Build the run's worker pool from a thread hint.
pub fn build_thread_pool(hint: i32) -> StagecastResult<rayon::ThreadPool> {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    let threads = resolve_thread_count(hint, cores);
    tracing::debug!(hint, threads, "building worker pool");
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("stagecast-worker-{i}"))
        .build()
        .map_err(|e| StagecastError::provisioning(format!("failed to build thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
