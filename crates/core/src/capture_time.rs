use crate::error::MetadataError;
use crate::exif_reader::JpegExifReader;
use crate::metadata::ContainerKind;
use crate::raw_reader::TiffRawReader;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, trace, warn};

/// Upper bound on how much of a file is read while looking for metadata.
/// JPEG APP1 segments and the EXIF IFDs of NEF files sit well inside it.
pub const METADATA_READ_LIMIT: u64 = 4 * 1024 * 1024;

pub trait CaptureTimeReader {
    fn container(&self) -> ContainerKind;

    fn read_capture_time(&self, bytes: &[u8]) -> Result<NaiveDateTime, MetadataError>;
}

pub fn reader_for(kind: ContainerKind) -> &'static dyn CaptureTimeReader {
    match kind {
        ContainerKind::Jpeg => &JpegExifReader,
        ContainerKind::TiffRaw => &TiffRawReader,
    }
}

pub fn capture_time_from_bytes(bytes: &[u8]) -> Result<NaiveDateTime, MetadataError> {
    let kind = ContainerKind::sniff(bytes).ok_or(MetadataError::UnsupportedContainer)?;
    reader_for(kind).read_capture_time(bytes)
}

pub fn read_capture_time(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let bytes = read_prefix(path).map_err(|source| MetadataError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    capture_time_from_bytes(&bytes)
}

pub fn extract_capture_time(path: &Path) -> Option<NaiveDateTime> {
    match read_capture_time(path) {
        Ok(time) => {
            trace!(path = %path.display(), %time, "撮影日時を取得しました");
            Some(time)
        }
        Err(err) if err.is_io() => {
            warn!(path = %path.display(), error = %err, "メタデータ読み込みに失敗しました");
            None
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "撮影日時がないため対象外にします");
            None
        }
    }
}

fn read_prefix(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut bytes = Vec::new();
    file.take(METADATA_READ_LIMIT).read_to_end(&mut bytes)?;
    Ok(bytes)
}
