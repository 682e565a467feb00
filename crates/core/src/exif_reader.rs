use crate::capture_time::CaptureTimeReader;
use crate::error::MetadataError;
use crate::metadata::ContainerKind;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default)]
pub struct JpegExifReader;

impl CaptureTimeReader for JpegExifReader {
    fn container(&self) -> ContainerKind {
        ContainerKind::Jpeg
    }

    fn read_capture_time(&self, bytes: &[u8]) -> Result<NaiveDateTime, MetadataError> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new()
            .read_from_container(&mut cursor)
            .map_err(|err| match err {
                exif::Error::NotFound(_) => MetadataError::TagMissing,
                other => MetadataError::CorruptContainer(other.to_string()),
            })?;

        let field = exif
            .get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .ok_or(MetadataError::TagMissing)?;

        match &field.value {
            Value::Ascii(values) => {
                let raw = values.first().ok_or(MetadataError::TagMissing)?;
                parse_exif_datetime(&String::from_utf8_lossy(raw))
            }
            other => Err(MetadataError::Malformed(format!("{other:?}"))),
        }
    }
}

pub(crate) fn parse_exif_datetime(input: &str) -> Result<NaiveDateTime, MetadataError> {
    let normalized = input.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(normalized, EXIF_DATETIME_FORMAT)
        .map_err(|_| MetadataError::Malformed(normalized.to_string()))
}
