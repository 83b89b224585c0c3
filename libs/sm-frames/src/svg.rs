use std::{fmt, path::Path, str::FromStr};

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use tracing::*;

use crate::{FrameSourceError, ParseBackgroundError};

/// Raster size used when a document has no usable width or height.
pub const DEFAULT_RASTER_SIZE: u32 = 800;

/// Largest width or height a document may rasterize to.
pub const MAX_RASTER_SIZE: u32 = 16_384;

/// Solid colour an SVG frame is composited onto, straight (not
/// premultiplied) RGBA.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Background(pub [u8; 4]);

impl Default for Background {
    fn default() -> Self {
        Background([0x55, 0x55, 0x66, 0xff])
    }
}

impl FromStr for Background {
    type Err = ParseBackgroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let invalid = || ParseBackgroundError(s.to_string());

        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }

        let mut rgba = [0xff; 4];
        for (i, channel) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
            *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }

        Ok(Background(rgba))
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

pub struct RasterizedSvg {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

fn raster_size(tree: &usvg::Tree) -> (u32, u32) {
    fn to_px(v: f32) -> Option<u32> {
        (v.is_finite() && v >= 1.0).then(|| v.ceil() as u32)
    }

    let size = tree.size();
    match (to_px(size.width()), to_px(size.height())) {
        (Some(w), Some(h)) => (w, h),
        _ => (DEFAULT_RASTER_SIZE, DEFAULT_RASTER_SIZE),
    }
}

/// Renders an SVG document over `background` and encodes the result as PNG.
pub fn rasterize_svg(
    path: &Path,
    data: &[u8],
    background: Background,
) -> Result<RasterizedSvg, FrameSourceError> {
    let fail = |reason: String| FrameSourceError::Rasterize {
        path: path.to_path_buf(),
        reason,
    };

    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| fail(e.to_string()))?;

    let (width, height) = raster_size(&tree);
    if width > MAX_RASTER_SIZE || height > MAX_RASTER_SIZE {
        return Err(fail(format!(
            "raster size {width}x{height} exceeds {MAX_RASTER_SIZE}x{MAX_RASTER_SIZE}"
        )));
    }

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| fail(format!("cannot allocate a {width}x{height} pixmap")))?;

    let [r, g, b, a] = background.0;
    pixmap.fill(Color::from_rgba8(r, g, b, a));

    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(&tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());

    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let c = pixel.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&rgba, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| fail(e.to_string()))?;

    debug!(path = %path.display(), width, height, bytes = png.len(), "rasterized svg");

    Ok(RasterizedSvg { png, width, height })
}
