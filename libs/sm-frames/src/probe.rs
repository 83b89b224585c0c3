use std::{io::Cursor, path::Path};

use image::{ImageFormat, ImageReader};

use crate::FrameSourceError;

/// Reads the pixel dimensions from a PNG header without decoding the image.
pub fn png_dimensions(path: &Path, data: &[u8]) -> Result<(u32, u32), FrameSourceError> {
    ImageReader::with_format(Cursor::new(data), ImageFormat::Png)
        .into_dimensions()
        .map_err(|source| FrameSourceError::Decode {
            path: path.to_path_buf(),
            source,
        })
}
