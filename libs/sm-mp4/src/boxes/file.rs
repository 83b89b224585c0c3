use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::constants::BOX_HEADER_SIZE;
use crate::{write_box_header, Frame, Mp4Box, Mp4BoxError};

pub struct FileTypeBox {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

impl FileTypeBox {
    pub fn new(major_brand: FourCC, minor_version: u32, compatible_brands: Vec<FourCC>) -> Self {
        FileTypeBox {
            major_brand,
            minor_version,
            compatible_brands,
        }
    }
}

impl Mp4Box for FileTypeBox {
    const NAME: FourCC = FourCC(*b"ftyp");

    fn content_size(&self) -> u64 {
        8 + 4 * self.compatible_brands.len() as u64
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_slice(&self.major_brand.0);
        writer.put_u32(self.minor_version);
        for brand in &self.compatible_brands {
            writer.put_slice(&brand.0);
        }

        Ok(())
    }
}

/// Header of the media data box. The payload is streamed by the writer
/// directly after it, so only its length is needed up front.
pub struct MediaDataBox {
    pub payload_len: u64,
}

impl MediaDataBox {
    pub const NAME: FourCC = FourCC(*b"mdat");

    pub fn for_frames(frames: &[Frame]) -> Self {
        MediaDataBox {
            payload_len: frames.iter().map(|f| f.byte_length() as u64).sum(),
        }
    }

    pub fn size(&self) -> u64 {
        BOX_HEADER_SIZE + self.payload_len
    }

    pub fn write_header(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        write_box_header(writer, Self::NAME, self.size(), None)
    }
}
