//! The per-sample tables of `stbl`. Each is a full box holding an entry
//! count followed by fixed-width big-endian entries.

use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::constants::SAMPLE_DESCRIPTION_INDEX;
use crate::{FullBoxHeader, Mp4Box, Mp4BoxError};

const COUNT_SIZE: u64 = 4;

fn table_size(entries: usize, entry_size: u64) -> u64 {
    COUNT_SIZE + entries as u64 * entry_size
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeToSampleEntry {
    pub count: u32,
    pub delta: u32,
}

/// `stts`: run-length encoded sample durations.
pub struct TimeToSampleBox {
    pub entries: Vec<TimeToSampleEntry>,
}

impl TimeToSampleBox {
    /// A single run of `count` samples that all last `delta` ticks.
    pub fn uniform(count: u32, delta: u32) -> Self {
        TimeToSampleBox {
            entries: vec![TimeToSampleEntry { count, delta }],
        }
    }
}

impl Mp4Box for TimeToSampleBox {
    const NAME: FourCC = FourCC(*b"stts");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        table_size(self.entries.len(), 8)
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_u32(self.entries.len() as u32);
        for entry in &self.entries {
            writer.put_u32(entry.count);
            writer.put_u32(entry.delta);
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SampleToChunkEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_index: u32,
}

/// `stsc`: how many samples each run of chunks holds.
pub struct SampleToChunkBox {
    pub entries: Vec<SampleToChunkEntry>,
}

impl SampleToChunkBox {
    /// Every chunk, starting from the first, holds exactly one sample.
    pub fn one_sample_per_chunk() -> Self {
        SampleToChunkBox {
            entries: vec![SampleToChunkEntry {
                first_chunk: 1,
                samples_per_chunk: 1,
                sample_description_index: SAMPLE_DESCRIPTION_INDEX,
            }],
        }
    }
}

impl Mp4Box for SampleToChunkBox {
    const NAME: FourCC = FourCC(*b"stsc");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        table_size(self.entries.len(), 12)
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_u32(self.entries.len() as u32);
        for entry in &self.entries {
            writer.put_u32(entry.first_chunk);
            writer.put_u32(entry.samples_per_chunk);
            writer.put_u32(entry.sample_description_index);
        }

        Ok(())
    }
}

/// `stsz`: the byte length of every sample.
pub struct SampleSizeBox {
    pub sample_sizes: Vec<u32>,
}

impl Mp4Box for SampleSizeBox {
    const NAME: FourCC = FourCC(*b"stsz");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        // shared sample_size precedes the count
        4 + table_size(self.sample_sizes.len(), 4)
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        // sizes differ per frame, so the shared sample_size stays zero
        writer.put_u32(0);
        writer.put_u32(self.sample_sizes.len() as u32);
        for &size in &self.sample_sizes {
            writer.put_u32(size);
        }

        Ok(())
    }
}

/// `stco`: absolute file offsets of every chunk, 32-bit only.
pub struct ChunkOffsetBox {
    pub chunk_offsets: Vec<u32>,
}

impl Mp4Box for ChunkOffsetBox {
    const NAME: FourCC = FourCC(*b"stco");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        table_size(self.chunk_offsets.len(), 4)
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_u32(self.chunk_offsets.len() as u32);
        for &offset in &self.chunk_offsets {
            writer.put_u32(offset);
        }

        Ok(())
    }
}
