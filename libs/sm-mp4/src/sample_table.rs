use tracing::*;

use crate::constants::{BOX_HEADER_SIZE, SAMPLE_DURATION};
use crate::{mdat_payload_offset, FormatError, Frame, InputError, MediaDataBox, MuxError};

/// Per-sample sizes and offsets of a single track, one sample per chunk.
///
/// Offsets are absolute positions in the output file. They are computed
/// before anything is written, from the frame lengths and the fixed size of
/// everything that precedes the `mdat` payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleTable {
    sample_sizes: Vec<u32>,
    chunk_offsets: Vec<u32>,
    timescale: u32,
    sample_duration: u32,
    width: u16,
    height: u16,
}

impl SampleTable {
    /// Builds the table for the layout produced by [`crate::Mp4Writer`].
    pub fn for_container(frames: &[Frame], fps: u32) -> Result<Self, MuxError> {
        Self::build(frames, fps, mdat_payload_offset())
    }

    /// Builds the table with the first sample placed at `payload_offset`.
    pub fn build(frames: &[Frame], fps: u32, payload_offset: u64) -> Result<Self, MuxError> {
        if fps == 0 {
            return Err(InputError::InvalidFrameRate(fps).into());
        }

        let first = frames.first().ok_or(InputError::EmptyFrameSource)?;
        let (width, height) = track_dimensions(first)?;

        let mut sample_sizes = Vec::with_capacity(frames.len());
        let mut chunk_offsets = Vec::with_capacity(frames.len());
        let mut running_offset = payload_offset;

        for frame in frames {
            if frame.dimensions() != first.dimensions() {
                return Err(InputError::DimensionMismatch {
                    index: frame.index,
                    expected_width: first.width,
                    expected_height: first.height,
                    width: frame.width,
                    height: frame.height,
                }
                .into());
            }

            let offset = u32::try_from(running_offset)
                .map_err(|_| mdat_overflow(running_offset - payload_offset))?;
            let size = u32::try_from(frame.byte_length())
                .map_err(|_| mdat_overflow(frame.byte_length() as u64))?;

            trace!(index = frame.index, offset, size, "sample");

            sample_sizes.push(size);
            chunk_offsets.push(offset);
            running_offset += size as u64;
        }

        let payload_len = running_offset - payload_offset;
        if BOX_HEADER_SIZE + payload_len > u32::MAX as u64 {
            return Err(mdat_overflow(payload_len).into());
        }

        let table = SampleTable {
            sample_sizes,
            chunk_offsets,
            timescale: fps,
            sample_duration: SAMPLE_DURATION,
            width,
            height,
        };

        debug!(
            samples = table.sample_count(),
            payload_len,
            timescale = table.timescale,
            "built sample table"
        );

        Ok(table)
    }

    /// Re-checks the cross-field invariants of the table.
    pub fn verify(&self) -> Result<(), FormatError> {
        if self.chunk_offsets.len() != self.sample_sizes.len() {
            return Err(FormatError::SampleCountMismatch {
                field: "stco",
                expected: self.sample_sizes.len() as u64,
                found: self.chunk_offsets.len() as u64,
            });
        }

        for (index, pair) in self.chunk_offsets.windows(2).enumerate() {
            let expected = pair[0] as u64 + self.sample_sizes[index] as u64;
            if pair[1] as u64 != expected {
                return Err(FormatError::OffsetMismatch {
                    index: index + 1,
                    expected,
                    found: pair[1] as u64,
                });
            }
        }

        Ok(())
    }

    pub fn sample_sizes(&self) -> &[u32] {
        &self.sample_sizes
    }

    pub fn chunk_offsets(&self) -> &[u32] {
        &self.chunk_offsets
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_sizes.len() as u32
    }

    pub fn timescale(&self) -> u32 {
        self.timescale
    }

    pub fn sample_duration(&self) -> u32 {
        self.sample_duration
    }

    /// Track duration in timescale units.
    pub fn duration(&self) -> u64 {
        self.sample_count() as u64 * self.sample_duration as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration() as f64 / self.timescale as f64
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// File offset of the first sample, i.e. the start of the `mdat` payload.
    pub fn payload_offset(&self) -> u64 {
        self.chunk_offsets.first().copied().unwrap_or_default() as u64
    }

    pub fn payload_len(&self) -> u64 {
        self.sample_sizes.iter().map(|&s| s as u64).sum()
    }
}

fn track_dimensions(frame: &Frame) -> Result<(u16, u16), InputError> {
    let invalid = || InputError::InvalidDimensions {
        index: frame.index,
        width: frame.width,
        height: frame.height,
    };

    let width = u16::try_from(frame.width).map_err(|_| invalid())?;
    let height = u16::try_from(frame.height).map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}

fn mdat_overflow(payload_len: u64) -> FormatError {
    FormatError::SizeOverflow {
        name: String::from_utf8_lossy(&MediaDataBox::NAME.0).into_owned(),
        size: BOX_HEADER_SIZE + payload_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(sizes: &[usize]) -> Vec<Frame> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &len)| Frame::new(i as u32, vec![i as u8; len], 64, 48))
            .collect()
    }

    #[test]
    fn three_frames_at_sixteen_fps() {
        let table = SampleTable::build(&frames(&[100, 250, 80]), 16, 32).unwrap();

        assert_eq!(table.sample_sizes(), &[100, 250, 80]);
        assert_eq!(table.chunk_offsets(), &[32, 132, 382]);
        assert_eq!(table.sample_count(), 3);
        assert_eq!(table.timescale(), 16);
        assert_eq!(table.sample_duration(), 1);
        assert_eq!(table.duration(), 3);
        assert_eq!(table.duration_secs(), 0.1875);
        assert_eq!(table.payload_len(), 430);
        table.verify().unwrap();
    }

    #[test]
    fn container_layout_starts_after_ftyp_and_mdat_header() {
        let table = SampleTable::for_container(&frames(&[10]), 16).unwrap();

        // ftyp is 24 bytes, the mdat header 8
        assert_eq!(table.payload_offset(), 32);
        assert_eq!(table.chunk_offsets(), &[32]);
    }

    #[test]
    fn single_frame_lasts_one_tick() {
        let table = SampleTable::build(&frames(&[7]), 25, 0).unwrap();

        assert_eq!(table.sample_count(), 1);
        assert_eq!(table.duration(), 1);
        assert_eq!(table.duration_secs(), 1.0 / 25.0);
    }

    #[test]
    fn empty_frames_are_rejected() {
        let err = SampleTable::build(&[], 16, 32).unwrap_err();
        assert!(matches!(err, MuxError::Input(InputError::EmptyFrameSource)));
    }

    #[test]
    fn zero_fps_is_rejected_before_anything_else() {
        let err = SampleTable::build(&[], 0, 32).unwrap_err();
        assert!(matches!(err, MuxError::Input(InputError::InvalidFrameRate(0))));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mut input = frames(&[10, 10, 10]);
        input[2].width = 65;

        let err = SampleTable::build(&input, 16, 32).unwrap_err();
        match err {
            MuxError::Input(InputError::DimensionMismatch {
                index,
                expected_width,
                width,
                ..
            }) => {
                assert_eq!(index, 2);
                assert_eq!(expected_width, 64);
                assert_eq!(width, 65);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dimensions_must_fit_sixteen_bits() {
        let input = vec![Frame::new(0, vec![0u8; 4], 70_000, 10)];
        let err = SampleTable::build(&input, 16, 32).unwrap_err();
        assert!(matches!(
            err,
            MuxError::Input(InputError::InvalidDimensions { width: 70_000, .. })
        ));

        let input = vec![Frame::new(0, vec![0u8; 4], 10, 0)];
        assert!(SampleTable::build(&input, 16, 32).is_err());
    }

    #[test]
    fn offsets_past_u32_overflow() {
        let err = SampleTable::build(&frames(&[16]), 16, u32::MAX as u64 + 1).unwrap_err();
        assert!(matches!(
            err,
            MuxError::Format(FormatError::SizeOverflow { .. })
        ));
    }

    #[test]
    fn verify_catches_broken_contiguity() {
        let mut table = SampleTable::build(&frames(&[100, 250, 80]), 16, 32).unwrap();
        table.chunk_offsets[2] += 1;

        match table.verify().unwrap_err() {
            FormatError::OffsetMismatch {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 2);
                assert_eq!(expected, 382);
                assert_eq!(found, 383);
            }
            other => panic!("unexpected error: {other}"),
        }

        table.chunk_offsets.pop();
        assert!(matches!(
            table.verify().unwrap_err(),
            FormatError::SampleCountMismatch { field: "stco", .. }
        ));
    }
}
