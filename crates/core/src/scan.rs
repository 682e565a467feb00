use crate::capture_time::extract_capture_time;
use crate::metadata::{is_supported_extension, MediaFile};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub scanned_files: usize,
    pub eligible_files: usize,
    pub skipped_unsupported: usize,
    pub skipped_hidden: usize,
    pub missing_capture_time: usize,
}

#[derive(Debug, Clone)]
pub struct FolderScan {
    pub files: Vec<MediaFile>,
    pub stats: ScanStats,
}

/// Lists the eligible photos directly inside `folder` (no recursion) and reads
/// each one's capture time. Only problems with the folder itself are errors;
/// per-file metadata problems leave `capture_time` empty.
pub fn scan_folder(folder: &Path, options: &ScanOptions) -> Result<FolderScan> {
    if !folder.exists() {
        bail!("フォルダが存在しません: {}", folder.display());
    }
    if !folder.is_dir() {
        bail!("フォルダではありません: {}", folder.display());
    }

    let mut stats = ScanStats::default();
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| format!("フォルダ走査に失敗しました: {}", folder.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        stats.scanned_files += 1;

        if is_hidden(path) && !options.include_hidden {
            stats.skipped_hidden += 1;
            continue;
        }
        if !is_supported_extension(path) {
            stats.skipped_unsupported += 1;
            continue;
        }
        stats.eligible_files += 1;

        let capture_time = extract_capture_time(path);
        if capture_time.is_none() {
            stats.missing_capture_time += 1;
        }
        debug!(path = %path.display(), ?capture_time, "候補ファイル");
        files.push(MediaFile::new(path, capture_time));
    }

    info!(
        folder = %folder.display(),
        scanned = stats.scanned_files,
        eligible = stats.eligible_files,
        missing_date = stats.missing_capture_time,
        "フォルダを走査しました"
    );

    Ok(FolderScan { files, stats })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
