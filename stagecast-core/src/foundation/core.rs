use crate::foundation::error::{StagecastError, StagecastResult};

/// Frame number. Frames double as stage time codes (`time = frame`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub i64);

impl FrameIndex {
    /// Stage time code at which this frame is evaluated.
    pub fn as_time(self) -> f64 {
        self.0 as f64
    }
}

impl std::fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive frame range `[first, last]`.
///
/// A range with `first > last` is valid and empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First frame, inclusive.
    pub first: FrameIndex,
    /// Last frame, inclusive.
    pub last: FrameIndex,
}

impl FrameRange {
    /// Build an inclusive range.
    pub fn new(first: FrameIndex, last: FrameIndex) -> Self {
        Self { first, last }
    }

    /// Number of frames visited by [`FrameRange::frames`], saturating at `u64::MAX` for the
    /// full `i64` span.
    pub fn len_frames(self) -> u64 {
        if self.first.0 > self.last.0 {
            0
        } else {
            self.last.0.abs_diff(self.first.0).saturating_add(1)
        }
    }

    /// Whether the range visits no frame.
    pub fn is_empty(self) -> bool {
        self.first.0 > self.last.0
    }

    /// Frames in strictly increasing order, each exactly once.
    pub fn frames(self) -> impl Iterator<Item = FrameIndex> {
        (self.first.0..=self.last.0).map(FrameIndex)
    }
}

/// Output resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Build a resolution, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> StagecastResult<Self> {
        if width == 0 || height == 0 {
            return Err(StagecastError::config(format!(
                "resolution must be > 0 in both dimensions (got {width}x{height})"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Total pixel count.
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Linear RGB color, components nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// Fallback display color for geometry without one.
    pub const FALLBACK_GRAY: Self = Self::new(0.5, 0.5, 0.5);

    /// Build a color from components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Clamp every component to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// Components as an array.
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
