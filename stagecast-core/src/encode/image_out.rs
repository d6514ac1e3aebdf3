use std::io::{Cursor, Write};
use std::path::Path;

use image::ImageFormat;

use crate::foundation::error::{StagecastError, StagecastResult};

/// Color buffer as read back from a surface: RGB `f32` triplets, rows bottom-to-top.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` samples; row 0 is the bottom row.
    pub data: Vec<f32>,
}

/// Image ready for export: RGB `f32` triplets, rows top-to-bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` samples; row 0 is the top row.
    pub data: Vec<f32>,
}

impl FrameImage {
    /// Pixel at column `x`, row `y` (from the top).
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    fn to_rgb8(&self) -> StagecastResult<image::RgbImage> {
        let bytes = self
            .data
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        image::RgbImage::from_raw(self.width, self.height, bytes)
            .ok_or_else(|| StagecastError::export("pixel buffer does not match image size"))
    }

    fn to_rgb32f(&self) -> StagecastResult<image::Rgb32FImage> {
        image::Rgb32FImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| StagecastError::export("pixel buffer does not match image size"))
    }
}

/// Reverse the row order of a read-back buffer.
pub fn flip_vertical(frame: RgbFrame) -> FrameImage {
    let row = frame.width as usize * 3;
    let mut data = Vec::with_capacity(frame.data.len());
    if row > 0 {
        for r in frame.data.chunks_exact(row).rev() {
            data.extend_from_slice(r);
        }
    }
    FrameImage {
        width: frame.width,
        height: frame.height,
        data,
    }
}

/// Sample type written to disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelEncoding {
    /// 8-bit per channel, clamped and rounded.
    Rgb8,
    /// 32-bit float per channel.
    Rgb32F,
}

/// Image format and pixel encoding implied by `path`'s extension.
pub fn output_format(path: &Path) -> StagecastResult<(ImageFormat, PixelEncoding)> {
    let format = ImageFormat::from_path(path).map_err(|_| {
        StagecastError::config(format!(
            "cannot infer an image format from output path '{}'",
            path.display()
        ))
    })?;
    let encoding = match format {
        ImageFormat::OpenExr | ImageFormat::Hdr => PixelEncoding::Rgb32F,
        ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::Bmp
        | ImageFormat::Tiff
        | ImageFormat::Tga
        | ImageFormat::Pnm
        | ImageFormat::WebP
        | ImageFormat::Qoi => PixelEncoding::Rgb8,
        other => {
            return Err(StagecastError::config(format!(
                "output format {other:?} is not supported for RGB frames"
            )));
        }
    };
    Ok((format, encoding))
}

/// Encode `img` to `path`; the format follows the extension.
///
/// The image is encoded in memory first, so a failed encode leaves nothing at `path`. The
/// parent directory must already exist.
pub fn write_image(path: &Path, img: &FrameImage) -> StagecastResult<()> {
    let (format, encoding) = output_format(path)?;
    let mut buf = Cursor::new(Vec::new());
    let encoded = match encoding {
        PixelEncoding::Rgb8 => img.to_rgb8()?.write_to(&mut buf, format),
        PixelEncoding::Rgb32F => img.to_rgb32f()?.write_to(&mut buf, format),
    };
    encoded.map_err(|e| {
        StagecastError::export(format!("failed to encode '{}': {e}", path.display()))
    })?;

    let mut file = std::fs::File::create(path).map_err(|e| {
        StagecastError::export(format!("cannot open '{}' for writing: {e}", path.display()))
    })?;
    file.write_all(buf.get_ref())
        .map_err(|e| StagecastError::export(format!("failed to write '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/image_out.rs"]
mod tests;
