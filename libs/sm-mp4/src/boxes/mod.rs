mod file;
mod headers;
mod media;
mod sample_entry;
mod sample_tables;

pub use self::{file::*, headers::*, media::*, sample_entry::*, sample_tables::*};
