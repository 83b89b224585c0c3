use std::io;

use crate::{fourcc_lossy, Mp4BoxError};

/// The frames handed to the muxer cannot be represented as a single track.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("frame source is empty")]
    EmptyFrameSource,

    #[error("frame rate must be a positive integer, got {0}")]
    InvalidFrameRate(u32),

    #[error("frame {index} is {width}x{height}, track dimensions must be within 1..=65535")]
    InvalidDimensions { index: u32, width: u32, height: u32 },

    #[error(
        "frame {index} is {width}x{height} but the track was sized {expected_width}x{expected_height} by the first frame"
    )]
    DimensionMismatch {
        index: u32,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
}

/// The box tree or sample table would be internally inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("box '{name}' needs {size} bytes, more than a 32-bit size field can hold")]
    SizeOverflow { name: String, size: u64 },

    #[error("{field} declares {found} samples, expected {expected}")]
    SampleCountMismatch {
        field: &'static str,
        expected: u64,
        found: u64,
    },

    #[error("frame {index} is {found} bytes but the sample table recorded {expected}")]
    SampleSizeMismatch { index: u32, expected: u32, found: usize },

    #[error("sample {index} would be written at offset {found}, the sample table expects {expected}")]
    OffsetMismatch {
        index: usize,
        expected: u64,
        found: u64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("failed to write container: {0}")]
    Io(#[from] io::Error),
}

impl From<Mp4BoxError> for MuxError {
    fn from(err: Mp4BoxError) -> Self {
        match err {
            Mp4BoxError::IoError(err) => MuxError::Io(err),
            Mp4BoxError::SizeOverflow { name, size } => FormatError::SizeOverflow {
                name: fourcc_lossy(&name).into_owned(),
                size,
            }
            .into(),
        }
    }
}
