use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("ファイルを読めませんでした: {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("対応していないコンテナ形式です")]
    UnsupportedContainer,
    #[error("メタデータを解析できませんでした: {0}")]
    CorruptContainer(String),
    #[error("DateTimeOriginalタグがありません")]
    TagMissing,
    #[error("撮影日時の形式が不正です: {0:?}")]
    Malformed(String),
}

impl MetadataError {
    /// True when the file itself could not be read, as opposed to being read
    /// without yielding a usable capture time.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Unreadable { .. })
    }
}
