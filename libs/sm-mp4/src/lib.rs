//! Minimal ISO-BMFF writer for sequences of still-image frames.
//!
//! Frames are stored verbatim as samples of a single video track: `ftyp`,
//! then `mdat` with the concatenated frame bytes, then `moov` whose sample
//! table indexes every frame by size and absolute file offset.

use std::borrow::Cow;
use std::io;

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};
pub use four_cc::FourCC;

mod boxes;
pub mod constants;
mod container;
mod error;
mod frame;
mod node;
mod sample_table;

pub use boxes::*;
pub use container::{file_type_box, mdat_payload_offset, movie_box, mux_to_vec, Mp4Writer};
pub use error::{FormatError, InputError, MuxError};
pub use frame::Frame;
pub use node::{BoxNode, ContainerBox, ContainerKind};
pub use sample_table::SampleTable;

use constants::BOX_HEADER_SIZE;

fn get_total_box_size<B: Mp4Box + ?Sized>(boks: &B) -> u64 {
    let size = boks.content_size();

    if boks.get_full_box_header().is_some() {
        size + FullBoxHeader::SIZE + BOX_HEADER_SIZE
    } else {
        size + BOX_HEADER_SIZE
    }
}

/// Writes the size/type header of a box, followed by the version/flags word
/// for full boxes. `size` is the total size of the box including the header.
pub fn write_box_header(
    writer: &mut BytesMut,
    name: FourCC,
    size: u64,
    full_box_header: Option<FullBoxHeader>,
) -> Result<(), Mp4BoxError> {
    let Ok(size32) = u32::try_from(size) else {
        return Err(Mp4BoxError::SizeOverflow { name, size });
    };

    let mut header = [0u8; 12];

    BigEndian::write_u32(&mut header[..], size32);
    header[4..8].copy_from_slice(&name.0);

    let mut len = 8;
    if let Some(box_header) = full_box_header {
        len += write_full_box_header(&mut header[len..], box_header);
    }

    writer.put_slice(&header[..len]);

    Ok(())
}

fn write_full_box_header(header: &mut [u8], box_header: FullBoxHeader) -> usize {
    header[0] = box_header.version;
    BigEndian::write_u24(&mut header[1..], box_header.flags);

    4
}

pub(crate) fn fourcc_lossy(name: &FourCC) -> Cow<'_, str> {
    String::from_utf8_lossy(&name.0)
}

#[derive(Copy, Clone, Debug)]
pub struct FullBoxHeader {
    version: u8,
    flags: u32,
}

impl FullBoxHeader {
    pub const SIZE: u64 = 4;

    pub fn new(version: u8, flags: u32) -> Self {
        FullBoxHeader { version, flags }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Mp4BoxError {
    #[error("Failed to write box: {0}")]
    IoError(#[from] io::Error),

    #[error("box '{}' needs {size} bytes, more than a 32-bit size field can hold", fourcc_lossy(.name))]
    SizeOverflow { name: FourCC, size: u64 },
}

/// A trait interface for a MP4 box.
pub trait Mp4Box {
    const NAME: FourCC;

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        None
    }

    /// The size of the contents of the box.
    fn content_size(&self) -> u64;

    fn size(&self) -> u64 {
        get_total_box_size::<Self>(self)
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError>;

    fn write(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        write_box_header(writer, Self::NAME, self.size(), self.get_full_box_header())?;

        self.write_box_contents(writer)?;

        Ok(())
    }
}
