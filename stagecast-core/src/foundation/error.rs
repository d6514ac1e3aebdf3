use crate::foundation::core::FrameIndex;
use crate::session::frame_loop::FrameStage;

/// Convenience result type used across stagecast.
pub type StagecastResult<T> = Result<T, StagecastError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is fatal to a run: nothing in the engine retries or skips.
#[derive(thiserror::Error, Debug)]
pub enum StagecastError {
    /// Drawable surface (window/context analogue) could not be created.
    #[error("provisioning error: {0}")]
    Provisioning(String),

    /// Invalid user-provided configuration (flags, prim paths, output template).
    #[error("configuration error: {0}")]
    Config(String),

    /// Scene description could not be loaded, resolved, or evaluated.
    #[error("scene error: {0}")]
    Scene(String),

    /// Renderer failure while drawing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Output target could not be created, opened, or encoded.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A per-frame failure, tagged with the frame and the loop stage that failed.
    #[error("frame {frame} failed during {stage}")]
    Frame {
        /// Frame being processed.
        frame: FrameIndex,
        /// Loop stage that raised `source`.
        stage: FrameStage,
        /// Underlying error.
        #[source]
        source: Box<StagecastError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StagecastError {
    /// Build a [`StagecastError::Provisioning`] value.
    pub fn provisioning(msg: impl Into<String>) -> Self {
        Self::Provisioning(msg.into())
    }

    /// Build a [`StagecastError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`StagecastError::Scene`] value.
    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }

    /// Build a [`StagecastError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StagecastError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`StagecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Wrap `self` as a failure of `stage` while processing `frame`.
    pub fn at_frame(self, frame: FrameIndex, stage: FrameStage) -> Self {
        Self::Frame {
            frame,
            stage,
            source: Box::new(self),
        }
    }

    /// Return the innermost non-[`StagecastError::Frame`] error.
    pub fn root(&self) -> &Self {
        match self {
            Self::Frame { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
