//! Raw image payloads.
//!
//! An image is carried as an opaque byte buffer whose length is fixed by its
//! width, height, mipmap count and pixel format. Nothing here decodes pixels.

use std::fmt;

use crate::error::ErrorKind;

/// Pixel storage formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageFormat {
    #[default]
    Grayscale,
    Intensity,
    GrayscaleAlpha,
    Rgb,
    Rgba,
    Indexed,
    IndexedAlpha,
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Pvrtc2,
    Pvrtc2Alpha,
    Pvrtc4,
    Pvrtc4Alpha,
    Etc,
    Atc,
    AtcAlphaExplicit,
    AtcAlphaInterpolated,
}

const FORMAT_NAMES: &[(ImageFormat, &str)] = &[
    (ImageFormat::Grayscale, "GRAYSCALE"),
    (ImageFormat::Intensity, "INTENSITY"),
    (ImageFormat::GrayscaleAlpha, "GRAYSCALE_ALPHA"),
    (ImageFormat::Rgb, "RGB"),
    (ImageFormat::Rgba, "RGBA"),
    (ImageFormat::Indexed, "INDEXED"),
    (ImageFormat::IndexedAlpha, "INDEXED_ALPHA"),
    (ImageFormat::Bc1, "BC1"),
    (ImageFormat::Bc2, "BC2"),
    (ImageFormat::Bc3, "BC3"),
    (ImageFormat::Bc4, "BC4"),
    (ImageFormat::Bc5, "BC5"),
    (ImageFormat::Pvrtc2, "PVRTC2"),
    (ImageFormat::Pvrtc2Alpha, "PVRTC2_ALPHA"),
    (ImageFormat::Pvrtc4, "PVRTC4"),
    (ImageFormat::Pvrtc4Alpha, "PVRTC4_ALPHA"),
    (ImageFormat::Etc, "ETC"),
    (ImageFormat::Atc, "ATC"),
    (ImageFormat::AtcAlphaExplicit, "ATC_ALPHA_EXPLICIT"),
    (ImageFormat::AtcAlphaInterpolated, "ATC_ALPHA_INTERPOLATED"),
];

impl ImageFormat {
    /// The identifier used in text.
    pub fn name(self) -> &'static str {
        FORMAT_NAMES
            .iter()
            .find(|(f, _)| *f == self)
            .map(|(_, n)| *n)
            .unwrap_or("GRAYSCALE")
    }

    /// Look up a format by its text identifier (case-sensitive).
    pub fn from_name(name: &str) -> Option<ImageFormat> {
        FORMAT_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(f, _)| *f)
    }

    /// Bytes per pixel before the bit-rate shift.
    fn pixel_size(self) -> usize {
        match self {
            ImageFormat::GrayscaleAlpha => 2,
            ImageFormat::Rgb => 3,
            ImageFormat::Rgba => 4,
            _ => 1,
        }
    }

    /// Right shift applied to the byte count of compressed formats.
    fn pixel_rshift(self) -> u32 {
        match self {
            ImageFormat::Bc1 | ImageFormat::Bc4 => 1,
            ImageFormat::Pvrtc2 | ImageFormat::Pvrtc2Alpha => 2,
            ImageFormat::Pvrtc4 | ImageFormat::Pvrtc4Alpha => 1,
            ImageFormat::Etc | ImageFormat::Atc => 1,
            _ => 0,
        }
    }

    /// Smallest block a mip level occupies.
    fn min_block(self) -> (usize, usize) {
        match self {
            ImageFormat::Bc1
            | ImageFormat::Bc2
            | ImageFormat::Bc3
            | ImageFormat::Bc4
            | ImageFormat::Bc5
            | ImageFormat::Etc
            | ImageFormat::Atc
            | ImageFormat::AtcAlphaExplicit
            | ImageFormat::AtcAlphaInterpolated => (4, 4),
            ImageFormat::Pvrtc2 | ImageFormat::Pvrtc2Alpha => (16, 8),
            ImageFormat::Pvrtc4 | ImageFormat::Pvrtc4Alpha => (8, 8),
            _ => (1, 1),
        }
    }

    /// Size of the palette stored ahead of indexed pixel data.
    fn palette_size(self) -> usize {
        match self {
            ImageFormat::Indexed => 256 * 3,
            ImageFormat::IndexedAlpha => 256 * 4,
            _ => 0,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn round_up(n: usize, block: usize) -> Option<usize> {
    Some(n.max(1).checked_add(block - 1)? / block * block)
}

/// The byte length of an image with the given shape, or `None` on overflow.
///
/// Each of the `mipmaps + 1` levels is rounded up to the format's block and
/// the level dimensions halve between levels.
pub fn data_size(width: u32, height: u32, mipmaps: u32, format: ImageFormat) -> Option<usize> {
    let (min_w, min_h) = format.min_block();
    let level_size = |w: usize, h: usize| -> Option<usize> {
        let w = round_up(w, min_w)?;
        let h = round_up(h, min_h)?;
        Some(w.checked_mul(h)?.checked_mul(format.pixel_size())? >> format.pixel_rshift())
    };

    let mut w = usize::try_from(width).ok()?;
    let mut h = usize::try_from(height).ok()?;
    let mut size = format.palette_size();
    let mut level: u32 = 0;
    loop {
        let s = level_size(w, h)?;
        if w <= min_w && h <= min_h {
            // Every remaining level is the same minimal block.
            let remaining = usize::try_from(mipmaps - level).ok()?.checked_add(1)?;
            return size.checked_add(s.checked_mul(remaining)?);
        }
        size = size.checked_add(s)?;
        if level == mipmaps {
            return Some(size);
        }
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        level += 1;
    }
}

/// A raw image.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Image {
    width: u32,
    height: u32,
    mipmaps: u32,
    format: ImageFormat,
    data: Vec<u8>,
}

impl Image {
    /// Build an image, checking the buffer length against its shape.
    pub fn new(
        width: u32,
        height: u32,
        mipmaps: u32,
        format: ImageFormat,
        data: Vec<u8>,
    ) -> Result<Image, ErrorKind> {
        if width == 0 || height == 0 {
            if !data.is_empty() {
                return Err(ErrorKind::ImageDataSize {
                    expected: 0,
                    found: data.len(),
                });
            }
            return Ok(Image::default());
        }
        let expected = data_size(width, height, mipmaps, format).ok_or(ErrorKind::ImageTooLarge)?;
        if data.len() != expected {
            return Err(ErrorKind::ImageDataSize {
                expected,
                found: data.len(),
            });
        }
        Ok(Image {
            width,
            height,
            mipmaps,
            format,
            data,
        })
    }

    /// The empty image, written as `Image()`.
    pub fn empty() -> Image {
        Image::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mipmaps(&self) -> u32 {
        self.mipmaps
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
