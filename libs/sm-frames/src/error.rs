use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FrameSourceError {
    #[error("frames directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to rasterize {}: {reason}", path.display())]
    Rasterize { path: PathBuf, reason: String },

    #[error("no .png or .svg frames found in {}", .0.display())]
    NoFramesFound(PathBuf),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("expected a hex colour as RRGGBB or RRGGBBAA, got '{0}'")]
pub struct ParseBackgroundError(pub String);
