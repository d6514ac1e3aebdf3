use std::path::PathBuf;

use crate::encode::image_out::{FrameImage, write_image};
use crate::encode::template::OutputTemplate;
use crate::foundation::core::{FrameIndex, FrameRange, Resolution};
use crate::foundation::error::StagecastResult;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame size.
    pub resolution: Resolution,
    /// Frames that will be pushed.
    pub range: FrameRange,
}

/// Consumer of exported frames.
///
/// `push_frame` is called in strictly increasing frame order with top-down images. A failing
/// `push_frame` ends the run; `end` is not called afterwards.
pub trait FrameSink {
    /// Prepare for a run.
    fn begin(&mut self, cfg: SinkConfig) -> StagecastResult<()>;
    /// Consume one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameImage) -> StagecastResult<()>;
    /// Finish the run.
    fn end(&mut self) -> StagecastResult<()>;
    /// Where frame `idx` ends up, if the sink writes files.
    fn target(&self, _idx: FrameIndex) -> Option<PathBuf> {
        None
    }
}

/// Writes one image file per frame.
#[derive(Clone, Debug)]
pub struct ImageSequenceSink {
    template: OutputTemplate,
    written: usize,
}

impl ImageSequenceSink {
    /// Sink writing to paths produced by `template`.
    pub fn new(template: OutputTemplate) -> Self {
        Self {
            template,
            written: 0,
        }
    }

    /// Files written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for ImageSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> StagecastResult<()> {
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameImage) -> StagecastResult<()> {
        let path = self.template.path_for(idx);
        write_image(&path, frame)?;
        self.written += 1;
        tracing::info!(frame = idx.0, path = %path.display(), "wrote frame");
        Ok(())
    }

    fn end(&mut self) -> StagecastResult<()> {
        Ok(())
    }

    fn target(&self, idx: FrameIndex) -> Option<PathBuf> {
        Some(self.template.path_for(idx))
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    ended: bool,
    /// Frames in push order.
    pub frames: Vec<(FrameIndex, FrameImage)>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from the last `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Whether `end` was called after the last `begin`.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StagecastResult<()> {
        self.cfg = Some(cfg);
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameImage) -> StagecastResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StagecastResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
