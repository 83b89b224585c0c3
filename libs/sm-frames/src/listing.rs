use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use tracing::*;

use crate::FrameSourceError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Png,
    Svg,
}

impl FrameKind {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(OsStr::to_str)?;

        if ext.eq_ignore_ascii_case("png") {
            Some(FrameKind::Png)
        } else if ext.eq_ignore_ascii_case("svg") {
            Some(FrameKind::Svg)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFile {
    pub path: PathBuf,
    pub kind: FrameKind,
    /// Trailing digits of the file stem, `7` for `frame_7.svg`.
    pub key: Option<u64>,
}

impl FrameFile {
    fn new(path: PathBuf) -> Option<Self> {
        let kind = FrameKind::from_path(&path)?;
        let key = path
            .file_stem()
            .and_then(OsStr::to_str)
            .and_then(numeric_key);

        Some(FrameFile { path, kind, key })
    }
}

pub fn numeric_key(stem: &str) -> Option<u64> {
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }

    stem[stem.len() - digits..].parse().ok()
}

/// Lists the `.png` and `.svg` files directly inside `dir`, in playback
/// order.
pub fn list_frame_files(dir: &Path) -> Result<Vec<FrameFile>, FrameSourceError> {
    if !dir.is_dir() {
        return Err(FrameSourceError::MissingDirectory(dir.to_path_buf()));
    }

    let read_err = |source: std::io::Error| FrameSourceError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        match FrameFile::new(path) {
            Some(file) => files.push(file),
            None => trace!(path = %entry.path().display(), "skipping non-frame file"),
        }
    }

    Ok(order_frame_files(files))
}

/// Orders by numeric key. A file without one takes its position among the
/// name-sorted files as its key. Ties are broken by file name.
pub fn order_frame_files(mut files: Vec<FrameFile>) -> Vec<FrameFile> {
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut keyed: Vec<(u64, FrameFile)> = files
        .into_iter()
        .enumerate()
        .map(|(position, file)| {
            let key = file.key.unwrap_or_else(|| {
                warn!(
                    path = %file.path.display(),
                    position,
                    "frame name does not end in a number, using its position"
                );
                position as u64
            });
            (key, file)
        })
        .collect();

    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, file)| file).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<FrameFile> {
        names
            .iter()
            .filter_map(|name| FrameFile::new(PathBuf::from(name)))
            .collect()
    }

    fn names(files: &[FrameFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn trailing_digits_become_the_key() {
        assert_eq!(numeric_key("frame_0007"), Some(7));
        assert_eq!(numeric_key("42"), Some(42));
        assert_eq!(numeric_key("v2_frame"), None);
        assert_eq!(numeric_key(""), None);
        assert_eq!(numeric_key("frame_99999999999999999999999"), None);
    }

    #[test]
    fn numbers_order_numerically() {
        let ordered = order_frame_files(files(&["frame_10.svg", "frame_7.svg", "frame_9.png"]));
        assert_eq!(names(&ordered), ["frame_7.svg", "frame_9.png", "frame_10.svg"]);
    }

    #[test]
    fn equal_keys_fall_back_to_names() {
        let ordered = order_frame_files(files(&["b_1.png", "a_01.png", "a_0.png"]));
        assert_eq!(names(&ordered), ["a_0.png", "a_01.png", "b_1.png"]);
    }

    #[test]
    fn unnumbered_names_take_their_position() {
        // sorted by name: frame_1, frame_10, frame_2, title; title sits at 3
        let ordered = order_frame_files(files(&[
            "title.png",
            "frame_10.png",
            "frame_2.png",
            "frame_1.png",
        ]));
        assert_eq!(
            names(&ordered),
            ["frame_1.png", "frame_2.png", "title.png", "frame_10.png"]
        );
    }

    #[test]
    fn numbered_frames_keep_numeric_order_beside_unnumbered_ones() {
        let ordered = order_frame_files(files(&["intro.png", "frame_10.png", "frame_2.png"]));
        let numbered: Vec<_> = names(&ordered)
            .into_iter()
            .filter(|name| name.starts_with("frame_"))
            .collect();
        assert_eq!(numbered, ["frame_2.png", "frame_10.png"]);
    }

    #[test]
    fn only_images_are_frames() {
        let found = files(&["a.PNG", "b.svg", "c.txt", "d"]);
        assert_eq!(
            found.iter().map(|f| f.kind).collect::<Vec<_>>(),
            [FrameKind::Png, FrameKind::Svg]
        );
    }
}
