//! Re-parses written containers straight from the raw bytes.

use std::convert::TryInto;

/// Boxes whose payload is only child boxes.
const CONTAINERS: [&[u8; 4]; 6] = [b"moov", b"trak", b"mdia", b"minf", b"dinf", b"stbl"];

/// Full boxes whose payload is an entry count followed by child boxes.
const ENTRY_LISTS: [&[u8; 4]; 2] = [b"stsd", b"dref"];

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct ParsedBox {
    pub typ: [u8; 4],
    pub offset: usize,
    pub size: usize,
}

#[allow(dead_code)]
impl ParsedBox {
    pub fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.offset + 8..self.offset + self.size]
    }

    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

pub fn be_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(data[at..at + 4].try_into().unwrap())
}

#[allow(dead_code)]
pub fn be_u64(data: &[u8], at: usize) -> u64 {
    u64::from_be_bytes(data[at..at + 8].try_into().unwrap())
}

/// Parses the boxes laid out back-to-back in `data[start..end]`, panicking
/// if a declared size does not tile the range exactly.
pub fn parse_range(data: &[u8], start: usize, end: usize) -> Vec<ParsedBox> {
    let mut boxes = Vec::new();
    let mut cursor = start;

    while cursor < end {
        assert!(cursor + 8 <= end, "truncated box header at {cursor}");
        let size = be_u32(data, cursor) as usize;
        assert!(size >= 8, "box at {cursor} declares size {size}");
        assert!(cursor + size <= end, "box at {cursor} overruns its parent");

        boxes.push(ParsedBox {
            typ: data[cursor + 4..cursor + 8].try_into().unwrap(),
            offset: cursor,
            size,
        });
        cursor += size;
    }

    assert_eq!(cursor, end, "children do not fill their parent");
    boxes
}

pub fn parse_top_level(data: &[u8]) -> Vec<ParsedBox> {
    parse_range(data, 0, data.len())
}

pub fn children(data: &[u8], parent: &ParsedBox) -> Vec<ParsedBox> {
    if CONTAINERS.contains(&&parent.typ) {
        parse_range(data, parent.offset + 8, parent.end())
    } else if ENTRY_LISTS.contains(&&parent.typ) {
        let entries = parse_range(data, parent.offset + 16, parent.end());
        assert_eq!(
            be_u32(data, parent.offset + 12) as usize,
            entries.len(),
            "entry count of {:?}",
            String::from_utf8_lossy(&parent.typ)
        );
        entries
    } else {
        Vec::new()
    }
}

/// Walks the whole tree, checking that every declared size is consistent
/// with the bytes that follow it. Returns every box visited.
#[allow(dead_code)]
pub fn walk(data: &[u8]) -> Vec<ParsedBox> {
    fn visit(data: &[u8], node: ParsedBox, out: &mut Vec<ParsedBox>) {
        out.push(node);
        for child in children(data, &node) {
            visit(data, child, out);
        }
    }

    let mut out = Vec::new();
    for node in parse_top_level(data) {
        visit(data, node, &mut out);
    }
    out
}

/// Follows a path of box types from the top level down.
pub fn find(data: &[u8], path: &[&[u8; 4]]) -> ParsedBox {
    let mut level = parse_top_level(data);
    let mut found = None;

    for typ in path {
        let node = *level
            .iter()
            .find(|b| &b.typ == *typ)
            .unwrap_or_else(|| panic!("missing box {:?}", String::from_utf8_lossy(*typ)));
        level = children(data, &node);
        found = Some(node);
    }

    found.expect("empty path")
}

const STBL: [&[u8; 4]; 5] = [b"moov", b"trak", b"mdia", b"minf", b"stbl"];

fn stbl_child(data: &[u8], typ: &'static [u8; 4]) -> ParsedBox {
    let mut path = STBL.to_vec();
    path.push(typ);
    find(data, &path)
}

/// `(sample_size, sample_count, entries)` of `stsz`.
#[allow(dead_code)]
pub fn stsz(data: &[u8]) -> (u32, u32, Vec<u32>) {
    let b = stbl_child(data, b"stsz");
    let base = b.offset + 12;
    let count = be_u32(data, base + 4);
    let entries = (0..count as usize)
        .map(|i| be_u32(data, base + 8 + i * 4))
        .collect();
    (be_u32(data, base), count, entries)
}

#[allow(dead_code)]
pub fn stco(data: &[u8]) -> Vec<u32> {
    let b = stbl_child(data, b"stco");
    let base = b.offset + 12;
    let count = be_u32(data, base) as usize;
    (0..count).map(|i| be_u32(data, base + 4 + i * 4)).collect()
}

/// `(sample_count, sample_delta)` runs of `stts`.
#[allow(dead_code)]
pub fn stts(data: &[u8]) -> Vec<(u32, u32)> {
    let b = stbl_child(data, b"stts");
    let base = b.offset + 12;
    let count = be_u32(data, base) as usize;
    (0..count)
        .map(|i| {
            let at = base + 4 + i * 8;
            (be_u32(data, at), be_u32(data, at + 4))
        })
        .collect()
}

/// `(first_chunk, samples_per_chunk, sample_description_index)` of `stsc`.
#[allow(dead_code)]
pub fn stsc(data: &[u8]) -> Vec<(u32, u32, u32)> {
    let b = stbl_child(data, b"stsc");
    let base = b.offset + 12;
    let count = be_u32(data, base) as usize;
    (0..count)
        .map(|i| {
            let at = base + 4 + i * 12;
            (
                be_u32(data, at),
                be_u32(data, at + 4),
                be_u32(data, at + 8),
            )
        })
        .collect()
}

/// `(timescale, duration)` from a version 1 `mvhd` or `mdhd`.
#[allow(dead_code)]
pub fn header_timing(data: &[u8], path: &[&[u8; 4]]) -> (u32, u64) {
    let b = find(data, path);
    assert_eq!(data[b.offset + 8], 1, "expected a version 1 header");
    let base = b.offset + 12;
    (be_u32(data, base + 16), be_u64(data, base + 20))
}

#[allow(dead_code)]
pub fn tkhd_duration(data: &[u8]) -> u64 {
    let b = find(data, &[b"moov", b"trak", b"tkhd"]);
    be_u64(data, b.offset + 12 + 24)
}
