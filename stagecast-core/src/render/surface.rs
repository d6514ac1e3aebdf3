use crate::encode::image_out::RgbFrame;
use crate::foundation::core::{Resolution, Rgb};
use crate::foundation::error::{StagecastError, StagecastResult};

/// Largest accepted surface width or height.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;
/// Largest accepted surface pixel count.
pub const MAX_SURFACE_PIXELS: u64 = 8_192 * 8_192;

/// Color and depth planes of a surface.
///
/// Rows are stored bottom-to-top (row 0 is the bottom of the image), the same order a
/// framebuffer readback produces.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    resolution: Resolution,
    color: Vec<f32>,
    depth: Vec<f32>,
}

impl Framebuffer {
    /// Black framebuffer with depth cleared to 1.
    pub fn new(resolution: Resolution) -> Self {
        let n = resolution.pixel_count();
        Self {
            resolution,
            color: vec![0.0; n * 3],
            depth: vec![1.0; n],
        }
    }

    /// Size in pixels.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Fill both planes.
    pub fn clear(&mut self, color: Rgb, depth: f32) {
        let c = color.to_array();
        for px in self.color.chunks_exact_mut(3) {
            px.copy_from_slice(&c);
        }
        self.depth.fill(depth);
    }

    /// RGB samples, three per pixel.
    pub fn color(&self) -> &[f32] {
        &self.color
    }

    /// Window-space depth per pixel in `[0, 1]`.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Both planes for writing.
    pub fn planes_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.color, &mut self.depth)
    }

    /// Color at `(x, y)` with `y` counted from the bottom.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let i = (y as usize * self.resolution.width as usize + x as usize) * 3;
        [self.color[i], self.color[i + 1], self.color[i + 2]]
    }
}

/// A render target owned by the frame loop.
pub trait DrawableSurface: Send {
    /// Size in pixels.
    fn resolution(&self) -> Resolution {
        self.framebuffer().resolution()
    }

    /// Current buffers.
    fn framebuffer(&self) -> &Framebuffer;

    /// Current buffers, for drawing.
    fn framebuffer_mut(&mut self) -> &mut Framebuffer;

    /// Fill color and depth.
    fn clear(&mut self, color: Rgb, depth: f32) {
        self.framebuffer_mut().clear(color, depth);
    }

    /// Complete pending drawing.
    fn flush(&mut self) -> StagecastResult<()>;

    /// Copy the color plane for the full viewport, rows bottom-to-top.
    fn read_pixels_rgb_f32(&self) -> StagecastResult<RgbFrame>;

    /// Present the drawn frame.
    fn swap_buffers(&mut self) -> StagecastResult<()>;
}

/// Creates drawable surfaces.
pub trait SurfaceProvider {
    /// Create a surface of `resolution`.
    fn create_surface(&self, resolution: Resolution) -> StagecastResult<Box<dyn DrawableSurface>>;
}

/// Provider of in-memory surfaces.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessProvider;

impl SurfaceProvider for HeadlessProvider {
    fn create_surface(&self, resolution: Resolution) -> StagecastResult<Box<dyn DrawableSurface>> {
        Ok(Box::new(HeadlessSurface::new(resolution)?))
    }
}

/// CPU-memory surface; presenting only counts frames.
#[derive(Debug)]
pub struct HeadlessSurface {
    fb: Framebuffer,
    presented: u64,
}

impl HeadlessSurface {
    /// Allocate a surface.
    pub fn new(resolution: Resolution) -> StagecastResult<Self> {
        let Resolution { width, height } = resolution;
        if width == 0 || height == 0 {
            return Err(StagecastError::provisioning(format!(
                "cannot create a {resolution} surface"
            )));
        }
        if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
            return Err(StagecastError::provisioning(format!(
                "surface {resolution} exceeds the maximum dimension {MAX_SURFACE_DIMENSION}"
            )));
        }
        if u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
            return Err(StagecastError::provisioning(format!(
                "surface {resolution} exceeds the maximum of {MAX_SURFACE_PIXELS} pixels"
            )));
        }
        tracing::debug!(%resolution, "headless surface created");
        Ok(Self {
            fb: Framebuffer::new(resolution),
            presented: 0,
        })
    }

    /// Frames presented so far.
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }
}

impl DrawableSurface for HeadlessSurface {
    fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    fn flush(&mut self) -> StagecastResult<()> {
        Ok(())
    }

    fn read_pixels_rgb_f32(&self) -> StagecastResult<RgbFrame> {
        let res = self.fb.resolution();
        Ok(RgbFrame {
            width: res.width,
            height: res.height,
            data: self.fb.color().to_vec(),
        })
    }

    fn swap_buffers(&mut self) -> StagecastResult<()> {
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
