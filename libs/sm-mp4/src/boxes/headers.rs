//! Movie, track and media headers. All three are written as version 1 so
//! that times and durations are 64-bit.

use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::constants::{
    LANGUAGE_UNDETERMINED, NEXT_TRACK_ID, UNITY_MATRIX, UNITY_RATE, UNITY_VOLUME,
};
use crate::{FullBoxHeader, Mp4Box, Mp4BoxError};

/// Timestamps are seconds since 1904-01-01. Zero keeps the output
/// byte-for-byte reproducible.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timestamps {
    pub creation_time: u64,
    pub modification_time: u64,
}

impl Timestamps {
    const SIZE: u64 = 16;

    fn put(&self, writer: &mut BytesMut) {
        writer.put_u64(self.creation_time);
        writer.put_u64(self.modification_time);
    }
}

fn put_matrix(writer: &mut BytesMut) {
    for value in UNITY_MATRIX {
        writer.put_i32(value);
    }
}

pub struct MovieHeaderBox {
    pub times: Timestamps,
    pub timescale: u32,
    pub duration: u64,
    pub next_track_id: u32,
}

impl MovieHeaderBox {
    pub fn new(timescale: u32, duration: u64) -> Self {
        MovieHeaderBox {
            times: Timestamps::default(),
            timescale,
            duration,
            next_track_id: NEXT_TRACK_ID,
        }
    }
}

impl Mp4Box for MovieHeaderBox {
    const NAME: FourCC = FourCC(*b"mvhd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, 0))
    }

    fn content_size(&self) -> u64 {
        Timestamps::SIZE
            + 4 // timescale
            + 8 // duration
            + 4 // rate
            + 2 // volume
            + 10 // reserved
            + 36 // matrix
            + 24 // pre_defined
            + 4 // next_track_ID
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        self.times.put(writer);
        writer.put_u32(self.timescale);
        writer.put_u64(self.duration);
        writer.put_i32(UNITY_RATE);
        writer.put_i16(UNITY_VOLUME);
        writer.put_bytes(0, 10);
        put_matrix(writer);
        writer.put_bytes(0, 24);
        writer.put_u32(self.next_track_id);

        Ok(())
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TrackHeaderFlags: u32 {
        const ENABLED = 0x000001;
        const IN_MOVIE = 0x000002;
    }
}

pub struct TrackHeaderBox {
    pub times: Timestamps,
    pub flags: TrackHeaderFlags,
    pub track_id: u32,
    /// In movie timescale units.
    pub duration: u64,
    /// Presentation size in pixels, written as 16.16 fixed point.
    pub width: u16,
    pub height: u16,
}

impl TrackHeaderBox {
    pub fn new(track_id: u32, duration: u64, width: u16, height: u16) -> Self {
        TrackHeaderBox {
            times: Timestamps::default(),
            flags: TrackHeaderFlags::ENABLED | TrackHeaderFlags::IN_MOVIE,
            track_id,
            duration,
            width,
            height,
        }
    }
}

impl Mp4Box for TrackHeaderBox {
    const NAME: FourCC = FourCC(*b"tkhd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, self.flags.bits()))
    }

    fn content_size(&self) -> u64 {
        Timestamps::SIZE
            + 4 // track_ID
            + 4 // reserved
            + 8 // duration
            + 8 // reserved
            + 8 // layer, alternate_group, volume, reserved
            + 36 // matrix
            + 8 // width, height
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        self.times.put(writer);
        writer.put_u32(self.track_id);
        writer.put_u32(0);
        writer.put_u64(self.duration);
        // layer, alternate_group and volume stay zero for a video track
        writer.put_bytes(0, 16);
        put_matrix(writer);
        writer.put_u32((self.width as u32) << 16);
        writer.put_u32((self.height as u32) << 16);

        Ok(())
    }
}

pub struct MediaHeaderBox {
    pub times: Timestamps,
    pub timescale: u32,
    pub duration: u64,
    /// Packed ISO-639-2/T code, three 5-bit letters.
    pub language: u16,
}

impl MediaHeaderBox {
    pub fn new(timescale: u32, duration: u64) -> Self {
        MediaHeaderBox {
            times: Timestamps::default(),
            timescale,
            duration,
            language: LANGUAGE_UNDETERMINED,
        }
    }
}

impl Mp4Box for MediaHeaderBox {
    const NAME: FourCC = FourCC(*b"mdhd");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(1, 0))
    }

    fn content_size(&self) -> u64 {
        Timestamps::SIZE
            + 4 // timescale
            + 8 // duration
            + 2 // pad + language
            + 2 // pre_defined
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        self.times.put(writer);
        writer.put_u32(self.timescale);
        writer.put_u64(self.duration);
        writer.put_u16(self.language & 0x7fff);
        writer.put_u16(0);

        Ok(())
    }
}
