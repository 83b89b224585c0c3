use bytes::Bytes;

/// One encoded still image, stored verbatim as a single sample.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Position in the final sequence, 0-based.
    pub index: u32,
    pub data: Bytes,
    /// Decoded pixel dimensions of `data`.
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(index: u32, data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Frame {
            index,
            data: data.into(),
            width,
            height,
        }
    }

    pub fn byte_length(&self) -> usize {
        self.data.len()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
