use std::path::Path;

use tracing::*;

use sm_mp4::Frame;

mod error;
mod listing;
mod probe;
mod svg;

pub use error::*;
pub use listing::*;
pub use probe::*;
pub use svg::*;

#[derive(Clone, Debug, Default)]
pub struct FrameOptions {
    pub background: Background,
}

/// Loads every frame in `dir` in playback order.
///
/// PNG files are passed through untouched. SVG files are rasterized to PNG.
/// Any frame that cannot be read, decoded or rendered fails the whole load,
/// so the returned sequence never has gaps.
pub fn load_frames(dir: &Path, options: &FrameOptions) -> Result<Vec<Frame>, FrameSourceError> {
    let files = list_frame_files(dir)?;
    debug!(dir = %dir.display(), count = files.len(), "found frame files");

    let mut frames = Vec::with_capacity(files.len());

    for file in files {
        let data = std::fs::read(&file.path).map_err(|source| FrameSourceError::Read {
            path: file.path.clone(),
            source,
        })?;

        let index = frames.len() as u32;

        let frame = match file.kind {
            FrameKind::Png => {
                let (width, height) = png_dimensions(&file.path, &data)?;
                Frame::new(index, data, width, height)
            }
            FrameKind::Svg => {
                let svg = rasterize_svg(&file.path, &data, options.background)?;
                Frame::new(index, svg.png, svg.width, svg.height)
            }
        };

        debug!(
            index,
            path = %file.path.display(),
            width = frame.width,
            height = frame.height,
            bytes = frame.byte_length(),
            "loaded frame"
        );

        frames.push(frame);
    }

    if frames.is_empty() {
        return Err(FrameSourceError::NoFramesFound(dir.to_path_buf()));
    }

    info!(count = frames.len(), "loaded frames");

    Ok(frames)
}
