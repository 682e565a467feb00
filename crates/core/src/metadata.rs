use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "nef"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Jpeg,
    TiffRaw,
}

impl ContainerKind {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(Self::TiffRaw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub original_name: String,
    pub extension: String,
    pub capture_time: Option<NaiveDateTime>,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, capture_time: Option<NaiveDateTime>) -> Self {
        let path = path.into();
        let original_name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = lower_extension(&path).unwrap_or_default();
        Self {
            path,
            original_name,
            extension,
            capture_time,
        }
    }

    pub fn extension_with_dot(&self) -> String {
        if self.extension.is_empty() {
            String::new()
        } else {
            format!(".{}", self.extension)
        }
    }
}

pub fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn is_supported_extension(path: &Path) -> bool {
    lower_extension(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
