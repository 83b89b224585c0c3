use bytes::{Bytes, BytesMut};
use four_cc::FourCC;

use crate::constants::BOX_HEADER_SIZE;
use crate::{
    write_box_header, ChunkOffsetBox, DataReferenceBox, FileTypeBox, HandlerBox, MediaHeaderBox,
    MovieHeaderBox, Mp4Box, Mp4BoxError, SampleDescriptionBox, SampleSizeBox, SampleToChunkBox,
    TimeToSampleBox, TrackHeaderBox, VideoMediaHeaderBox,
};

/// Boxes whose payload is nothing but their children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Moov,
    Trak,
    Mdia,
    Minf,
    Dinf,
    Stbl,
}

impl ContainerKind {
    pub fn name(self) -> FourCC {
        match self {
            ContainerKind::Moov => FourCC(*b"moov"),
            ContainerKind::Trak => FourCC(*b"trak"),
            ContainerKind::Mdia => FourCC(*b"mdia"),
            ContainerKind::Minf => FourCC(*b"minf"),
            ContainerKind::Dinf => FourCC(*b"dinf"),
            ContainerKind::Stbl => FourCC(*b"stbl"),
        }
    }
}

pub struct ContainerBox {
    pub kind: ContainerKind,
    pub children: Vec<BoxNode>,
}

impl ContainerBox {
    pub fn new(kind: ContainerKind, children: Vec<BoxNode>) -> Self {
        ContainerBox { kind, children }
    }

    pub fn content_size(&self) -> u64 {
        self.children.iter().map(BoxNode::size).sum()
    }
}

/// A node of the box tree. Leaves carry their own fields, containers carry
/// an ordered list of children that is serialized in order.
pub enum BoxNode {
    Ftyp(FileTypeBox),
    Mvhd(MovieHeaderBox),
    Tkhd(TrackHeaderBox),
    Mdhd(MediaHeaderBox),
    Hdlr(HandlerBox),
    Vmhd(VideoMediaHeaderBox),
    Dref(DataReferenceBox),
    Stsd(SampleDescriptionBox),
    Stts(TimeToSampleBox),
    Stsc(SampleToChunkBox),
    Stsz(SampleSizeBox),
    Stco(ChunkOffsetBox),
    Container(ContainerBox),
}

macro_rules! dispatch {
    ($node:expr, $leaf:ident => $on_leaf:expr, $container:ident => $on_container:expr) => {
        match $node {
            BoxNode::Ftyp($leaf) => $on_leaf,
            BoxNode::Mvhd($leaf) => $on_leaf,
            BoxNode::Tkhd($leaf) => $on_leaf,
            BoxNode::Mdhd($leaf) => $on_leaf,
            BoxNode::Hdlr($leaf) => $on_leaf,
            BoxNode::Vmhd($leaf) => $on_leaf,
            BoxNode::Dref($leaf) => $on_leaf,
            BoxNode::Stsd($leaf) => $on_leaf,
            BoxNode::Stts($leaf) => $on_leaf,
            BoxNode::Stsc($leaf) => $on_leaf,
            BoxNode::Stsz($leaf) => $on_leaf,
            BoxNode::Stco($leaf) => $on_leaf,
            BoxNode::Container($container) => $on_container,
        }
    };
}

fn name_of<B: Mp4Box>(_: &B) -> FourCC {
    B::NAME
}

impl BoxNode {
    pub fn container(kind: ContainerKind, children: Vec<BoxNode>) -> Self {
        BoxNode::Container(ContainerBox::new(kind, children))
    }

    pub fn name(&self) -> FourCC {
        dispatch!(self, leaf => name_of(leaf), container => container.kind.name())
    }

    /// Total serialized size including the header. Children are summed
    /// before their parent.
    pub fn size(&self) -> u64 {
        dispatch!(
            self,
            leaf => leaf.size(),
            container => BOX_HEADER_SIZE + container.content_size()
        )
    }

    pub fn children(&self) -> &[BoxNode] {
        match self {
            BoxNode::Container(container) => &container.children,
            _ => &[],
        }
    }

    pub fn write(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        dispatch!(
            self,
            leaf => leaf.write(writer),
            container => {
                write_box_header(writer, container.kind.name(), self.size(), None)?;

                for child in &container.children {
                    child.write(writer)?;
                }

                Ok(())
            }
        )
    }

    /// Serializes the whole subtree. Fails before allocating when the tree
    /// cannot be described with 32-bit size fields.
    pub fn serialize(&self) -> Result<Bytes, Mp4BoxError> {
        let size = self.size();
        if size > u32::MAX as u64 {
            return Err(Mp4BoxError::SizeOverflow {
                name: self.name(),
                size,
            });
        }

        let mut buffer = BytesMut::with_capacity(size as usize);
        self.write(&mut buffer)?;

        debug_assert_eq!(buffer.len() as u64, size);

        Ok(buffer.freeze())
    }
}
