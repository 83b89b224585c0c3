use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::constants::{DATA_REFERENCE_INDEX, DEPTH_24_BIT, RESOLUTION_72_DPI};
use crate::{FullBoxHeader, Mp4Box, Mp4BoxError};

/// Visual sample entry for samples that are whole PNG images. Carries no
/// decoder configuration, only the geometry of the track.
pub struct PngSampleEntryBox {
    pub width: u16,
    pub height: u16,
    pub depth: u16,
}

impl PngSampleEntryBox {
    pub fn new(width: u16, height: u16) -> Self {
        PngSampleEntryBox {
            width,
            height,
            depth: DEPTH_24_BIT,
        }
    }
}

impl Mp4Box for PngSampleEntryBox {
    const NAME: FourCC = FourCC(*b"png ");

    fn content_size(&self) -> u64 {
        8 // reserved, data_reference_index
            + 16 // pre_defined, reserved
            + 4 // width, height
            + 8 // horizresolution, vertresolution
            + 4 // reserved
            + 2 // frame_count
            + 32 // compressorname
            + 4 // depth, pre_defined
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_bytes(0, 6);
        writer.put_u16(DATA_REFERENCE_INDEX);
        writer.put_bytes(0, 16);
        writer.put_u16(self.width);
        writer.put_u16(self.height);
        writer.put_u32(RESOLUTION_72_DPI);
        writer.put_u32(RESOLUTION_72_DPI);
        writer.put_u32(0);
        // one frame per sample
        writer.put_u16(1);
        writer.put_bytes(0, 32);
        writer.put_u16(self.depth);
        writer.put_i16(-1);

        Ok(())
    }
}

pub enum SampleEntry {
    Png(PngSampleEntryBox),
}

impl SampleEntry {
    fn size(&self) -> u64 {
        match self {
            SampleEntry::Png(png) => png.size(),
        }
    }

    fn write(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        match self {
            SampleEntry::Png(png) => png.write(writer),
        }
    }
}

/// `stsd`: the coding of every sample, referenced from `stsc` by 1-based
/// index.
pub struct SampleDescriptionBox {
    pub entries: Vec<SampleEntry>,
}

impl Mp4Box for SampleDescriptionBox {
    const NAME: FourCC = FourCC(*b"stsd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        4 + self.entries.iter().map(SampleEntry::size).sum::<u64>()
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_u32(self.entries.len() as u32);
        for entry in &self.entries {
            entry.write(writer)?;
        }

        Ok(())
    }
}
