//! Boxes describing how the track's media is handled and where it lives.

use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::{FullBoxHeader, Mp4Box, Mp4BoxError};

pub struct HandlerBox {
    pub handler_type: FourCC,
    /// Human readable, written NUL-terminated.
    pub name: String,
}

impl HandlerBox {
    pub fn new(handler_type: FourCC, name: impl Into<String>) -> Self {
        HandlerBox {
            handler_type,
            name: name.into(),
        }
    }
}

impl Mp4Box for HandlerBox {
    const NAME: FourCC = FourCC(*b"hdlr");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        // pre_defined, handler_type, reserved[3], name
        20 + self.name.len() as u64 + 1
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_u32(0);
        writer.put_slice(&self.handler_type.0);
        writer.put_bytes(0, 12);
        writer.put_slice(self.name.as_bytes());
        writer.put_u8(0);

        Ok(())
    }
}

/// `vmhd`, always flagged 1.
#[derive(Default)]
pub struct VideoMediaHeaderBox {
    /// 0 is copy, the only mode a still image track needs.
    pub graphics_mode: u16,
    pub opcolor: [u16; 3],
}

impl Mp4Box for VideoMediaHeaderBox {
    const NAME: FourCC = FourCC(*b"vmhd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 1))
    }

    fn content_size(&self) -> u64 {
        8
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_u16(self.graphics_mode);
        for channel in self.opcolor {
            writer.put_u16(channel);
        }

        Ok(())
    }
}

const SELF_CONTAINED: u32 = 0x000001;

/// `url ` entry flagged self-contained: the media data lives in this file,
/// so the box has no payload.
pub struct DataEntryUrlBox;

impl DataEntryUrlBox {
    pub fn self_contained() -> Self {
        DataEntryUrlBox
    }
}

impl Mp4Box for DataEntryUrlBox {
    const NAME: FourCC = FourCC(*b"url ");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, SELF_CONTAINED))
    }

    fn content_size(&self) -> u64 {
        0
    }

    fn write_box_contents(&self, _writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        Ok(())
    }
}

pub struct DataReferenceBox {
    pub entries: Vec<DataEntryUrlBox>,
}

impl DataReferenceBox {
    /// A single entry pointing at this file.
    pub fn self_contained() -> Self {
        DataReferenceBox {
            entries: vec![DataEntryUrlBox::self_contained()],
        }
    }
}

impl Mp4Box for DataReferenceBox {
    const NAME: FourCC = FourCC(*b"dref");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        4 + self.entries.iter().map(|e| e.size()).sum::<u64>()
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_u32(self.entries.len() as u32);
        for entry in &self.entries {
            entry.write(writer)?;
        }

        Ok(())
    }
}
