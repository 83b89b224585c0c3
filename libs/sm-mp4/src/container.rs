use std::io::Write;

use bytes::BytesMut;
use tracing::*;

use crate::constants::{
    BOX_HEADER_SIZE, COMPATIBLE_BRANDS, HANDLER_TYPE_VIDEO, MAJOR_BRAND, MINOR_VERSION,
    VIDEO_HANDLER_NAME, VIDEO_TRACK_ID,
};
use crate::{
    BoxNode, ChunkOffsetBox, ContainerKind, DataReferenceBox, FileTypeBox, FormatError, Frame,
    HandlerBox, MediaDataBox, MediaHeaderBox, MovieHeaderBox, Mp4Box, MuxError,
    PngSampleEntryBox, SampleDescriptionBox, SampleEntry, SampleSizeBox, SampleTable,
    SampleToChunkBox, TimeToSampleBox, TrackHeaderBox, VideoMediaHeaderBox,
};

pub fn file_type_box() -> FileTypeBox {
    FileTypeBox::new(MAJOR_BRAND, MINOR_VERSION, COMPATIBLE_BRANDS.to_vec())
}

/// Where the first sample lands: nothing but `ftyp` and the `mdat` header
/// precede it.
pub fn mdat_payload_offset() -> u64 {
    file_type_box().size() + BOX_HEADER_SIZE
}

/// `moov` with a single video track whose sample table mirrors `table`.
pub fn movie_box(table: &SampleTable) -> BoxNode {
    BoxNode::container(
        ContainerKind::Moov,
        vec![
            BoxNode::Mvhd(MovieHeaderBox::new(table.timescale(), table.duration())),
            track_box(table),
        ],
    )
}

fn track_box(table: &SampleTable) -> BoxNode {
    BoxNode::container(
        ContainerKind::Trak,
        vec![
            BoxNode::Tkhd(TrackHeaderBox::new(
                VIDEO_TRACK_ID,
                table.duration(),
                table.width(),
                table.height(),
            )),
            BoxNode::container(
                ContainerKind::Mdia,
                vec![
                    BoxNode::Mdhd(MediaHeaderBox::new(table.timescale(), table.duration())),
                    BoxNode::Hdlr(HandlerBox::new(HANDLER_TYPE_VIDEO, VIDEO_HANDLER_NAME)),
                    media_information_box(table),
                ],
            ),
        ],
    )
}

fn media_information_box(table: &SampleTable) -> BoxNode {
    BoxNode::container(
        ContainerKind::Minf,
        vec![
            BoxNode::Vmhd(VideoMediaHeaderBox::default()),
            BoxNode::container(
                ContainerKind::Dinf,
                vec![BoxNode::Dref(DataReferenceBox::self_contained())],
            ),
            sample_table_box(table),
        ],
    )
}

fn sample_table_box(table: &SampleTable) -> BoxNode {
    BoxNode::container(
        ContainerKind::Stbl,
        vec![
            BoxNode::Stsd(SampleDescriptionBox {
                entries: vec![SampleEntry::Png(PngSampleEntryBox::new(
                    table.width(),
                    table.height(),
                ))],
            }),
            BoxNode::Stts(TimeToSampleBox::uniform(
                table.sample_count(),
                table.sample_duration(),
            )),
            BoxNode::Stsc(SampleToChunkBox::one_sample_per_chunk()),
            BoxNode::Stsz(SampleSizeBox {
                sample_sizes: table.sample_sizes().to_vec(),
            }),
            BoxNode::Stco(ChunkOffsetBox {
                chunk_offsets: table.chunk_offsets().to_vec(),
            }),
        ],
    )
}

/// Writes `ftyp`, `mdat` and `moov` to a sink, tracking how many bytes have
/// gone out so that sample offsets can be checked as they are written.
///
/// The sink must be positioned at the start of the file.
pub struct Mp4Writer<W> {
    inner: W,
    position: u64,
}

impl<W: Write> Mp4Writer<W> {
    pub fn new(inner: W) -> Self {
        Mp4Writer { inner, position: 0 }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes the complete container and returns the number of bytes
    /// written. Any error leaves the sink holding a truncated file.
    pub fn write(&mut self, frames: &[Frame], table: &SampleTable) -> Result<u64, MuxError> {
        let start = self.position;

        table.verify()?;
        if frames.len() as u64 != table.sample_count() as u64 {
            return Err(FormatError::SampleCountMismatch {
                field: "frames",
                expected: table.sample_count() as u64,
                found: frames.len() as u64,
            }
            .into());
        }

        for (frame, &size) in frames.iter().zip(table.sample_sizes()) {
            if frame.byte_length() != size as usize {
                return Err(FormatError::SampleSizeMismatch {
                    index: frame.index,
                    expected: size,
                    found: frame.byte_length(),
                }
                .into());
            }
        }

        let ftyp = BoxNode::Ftyp(file_type_box()).serialize()?;
        self.put(&ftyp)?;

        self.write_media_data(frames, table)?;

        let moov = movie_box(table).serialize()?;
        debug!(size = moov.len(), "writing moov");
        self.put(&moov)?;

        self.inner.flush()?;

        Ok(self.position - start)
    }

    fn write_media_data(&mut self, frames: &[Frame], table: &SampleTable) -> Result<(), MuxError> {
        let mdat = MediaDataBox::for_frames(frames);

        let mut header = BytesMut::with_capacity(BOX_HEADER_SIZE as usize);
        mdat.write_header(&mut header)?;
        self.put(&header)?;

        debug!(
            offset = self.position,
            payload_len = mdat.payload_len,
            "writing mdat"
        );

        let samples = table.sample_sizes().iter().zip(table.chunk_offsets());
        for (i, (frame, (&size, &offset))) in frames.iter().zip(samples).enumerate() {
            if self.position != offset as u64 {
                return Err(FormatError::OffsetMismatch {
                    index: i,
                    expected: offset as u64,
                    found: self.position,
                }
                .into());
            }

            self.put(&frame.data)?;

            trace!(index = frame.index, offset, size, "wrote sample");
        }

        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), MuxError> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;

        Ok(())
    }
}

/// Builds the sample table for `frames` and writes the container to memory.
pub fn mux_to_vec(frames: &[Frame], fps: u32) -> Result<Vec<u8>, MuxError> {
    let table = SampleTable::for_container(frames, fps)?;

    let capacity = mdat_payload_offset() + table.payload_len() + movie_box(&table).size();
    let mut writer = Mp4Writer::new(Vec::with_capacity(capacity as usize));
    writer.write(frames, &table)?;

    Ok(writer.into_inner())
}
