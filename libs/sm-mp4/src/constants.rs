//! Fixed field values shared by the box writers.

use four_cc::FourCC;

/// 32-bit size followed by the 4-byte type.
pub const BOX_HEADER_SIZE: u64 = 8;

pub const MAJOR_BRAND: FourCC = FourCC(*b"mp41");
pub const MINOR_VERSION: u32 = 0;
pub const COMPATIBLE_BRANDS: [FourCC; 2] = [FourCC(*b"isom"), FourCC(*b"mp41")];

/// 1.0 as 16.16 fixed point.
pub const UNITY_RATE: i32 = 0x0001_0000;

/// 1.0 as 8.8 fixed point.
pub const UNITY_VOLUME: i16 = 0x0100;

/// Identity transform. The last column is 2.30 fixed point, the rest 16.16.
pub const UNITY_MATRIX: [i32; 9] = [0x0001_0000, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000];

pub const VIDEO_TRACK_ID: u32 = 1;
pub const NEXT_TRACK_ID: u32 = 2;

/// Every frame lasts exactly one tick of a timescale equal to the frame rate.
pub const SAMPLE_DURATION: u32 = 1;

/// ISO-639-2/T "und", packed as three 5-bit letters offset by 0x60.
pub const LANGUAGE_UNDETERMINED: u16 = 0x55c4;

pub const HANDLER_TYPE_VIDEO: FourCC = FourCC(*b"vide");
pub const VIDEO_HANDLER_NAME: &str = "VideoHandler";

/// 72 dpi as 16.16 fixed point.
pub const RESOLUTION_72_DPI: u32 = 0x0048_0000;
pub const DEPTH_24_BIT: u16 = 0x0018;

pub const DATA_REFERENCE_INDEX: u16 = 1;
pub const SAMPLE_DESCRIPTION_INDEX: u32 = 1;
