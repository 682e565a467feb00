use crate::metadata::{MediaFile, SUPPORTED_EXTENSIONS};
use crate::sanitize::normalize_topic;
use crate::scan::{scan_folder, ScanOptions};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NamingPolicy {
    /// `YYYY-MM-DD_NNN.ext`, numbered per capture date.
    #[default]
    DayCounter,
    /// `YYYY-MM-DD-HHMMSS.ext`
    FullTimestamp,
    /// `YYYY-MM-DD-HHMMSS_topic.ext`
    FullTimestampWithTopic,
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub folder: PathBuf,
    pub topic: String,
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenamePlanEntry {
    pub source: PathBuf,
    pub original_name: String,
    pub capture_time: NaiveDateTime,
    pub target_name: String,
    pub target_path: PathBuf,
    pub sequence: Option<u32>,
}

impl RenamePlanEntry {
    pub fn keeps_name(&self) -> bool {
        self.original_name == self.target_name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RenameStats {
    pub scanned_files: usize,
    pub skipped_unsupported: usize,
    pub skipped_hidden: usize,
    pub eligible_files: usize,
    pub missing_capture_time: usize,
    pub planned: usize,
    pub already_named: usize,
    pub duplicate_targets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenamePlan {
    pub folder: PathBuf,
    pub policy: NamingPolicy,
    pub topic: Option<String>,
    pub entries: Vec<RenamePlanEntry>,
    pub stats: RenameStats,
}

impl RenamePlan {
    /// Nothing to rename: no eligible file carried a capture time.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scans `options.folder` and plans the renames. Touches the filesystem only
/// to read; nothing is renamed here.
pub fn generate_plan(policy: NamingPolicy, options: &PlanOptions) -> Result<RenamePlan> {
    let scan = scan_folder(
        &options.folder,
        &ScanOptions {
            include_hidden: options.include_hidden,
        },
    )?;

    let mut plan = build_plan(&scan.files, policy, options);
    plan.stats.scanned_files = scan.stats.scanned_files;
    plan.stats.skipped_unsupported += scan.stats.skipped_unsupported;
    plan.stats.skipped_hidden = scan.stats.skipped_hidden;

    info!(
        folder = %plan.folder.display(),
        ?policy,
        planned = plan.stats.planned,
        already_named = plan.stats.already_named,
        duplicate_targets = plan.stats.duplicate_targets,
        "リネーム計画を作成しました"
    );
    Ok(plan)
}

/// Pure planning step. Files with an unsupported extension or without a
/// capture time are dropped, the rest are ordered by
/// `(capture_time, original_name)` and named by `policy`.
pub fn build_plan(
    entries: &[MediaFile],
    policy: NamingPolicy,
    options: &PlanOptions,
) -> RenamePlan {
    let topic = match policy {
        NamingPolicy::FullTimestampWithTopic => normalize_topic(&options.topic),
        NamingPolicy::DayCounter | NamingPolicy::FullTimestamp => None,
    };

    let eligible: Vec<&MediaFile> = entries
        .iter()
        .filter(|file| SUPPORTED_EXTENSIONS.contains(&file.extension.as_str()))
        .collect();
    let mut dated: Vec<(NaiveDateTime, &MediaFile)> = eligible
        .iter()
        .filter_map(|file| file.capture_time.map(|time| (time, *file)))
        .collect();
    dated.sort_by(|(a_time, a), (b_time, b)| {
        a_time
            .cmp(b_time)
            .then_with(|| a.original_name.cmp(&b.original_name))
            .then_with(|| a.path.cmp(&b.path))
    });

    let planned: Vec<RenamePlanEntry> = dated
        .into_iter()
        .scan(None, |day: &mut Option<(NaiveDate, u32)>, (time, file)| {
            let (date, seq) = advance_day(*day, time.date());
            *day = Some((date, seq));

            let target_name = render_target_name(
                policy,
                &time,
                &file.extension_with_dot(),
                topic.as_deref(),
                seq,
            );
            let target_path = folder_of(&file.path, &options.folder).join(&target_name);
            Some(RenamePlanEntry {
                source: file.path.clone(),
                original_name: file.original_name.clone(),
                capture_time: time,
                target_name,
                target_path,
                sequence: (policy == NamingPolicy::DayCounter).then_some(seq),
            })
        })
        .collect();

    let mut seen_targets = HashSet::<&Path>::new();
    let duplicate_targets = planned
        .iter()
        .filter(|entry| !seen_targets.insert(entry.target_path.as_path()))
        .count();

    let stats = RenameStats {
        eligible_files: eligible.len(),
        skipped_unsupported: entries.len() - eligible.len(),
        missing_capture_time: eligible.len() - planned.len(),
        planned: planned.len(),
        already_named: planned.iter().filter(|e| e.keeps_name()).count(),
        duplicate_targets,
        ..RenameStats::default()
    };

    RenamePlan {
        folder: options.folder.clone(),
        policy,
        topic,
        entries: planned,
        stats,
    }
}

pub fn render_target_name(
    policy: NamingPolicy,
    capture_time: &NaiveDateTime,
    extension_with_dot: &str,
    topic: Option<&str>,
    sequence: u32,
) -> String {
    match policy {
        NamingPolicy::DayCounter => format!(
            "{}_{:03}{}",
            capture_time.format("%Y-%m-%d"),
            sequence,
            extension_with_dot
        ),
        NamingPolicy::FullTimestamp => format!(
            "{}{}",
            capture_time.format("%Y-%m-%d-%H%M%S"),
            extension_with_dot
        ),
        NamingPolicy::FullTimestampWithTopic => match topic {
            Some(topic) => format!(
                "{}_{}{}",
                capture_time.format("%Y-%m-%d-%H%M%S"),
                topic,
                extension_with_dot
            ),
            None => render_target_name(
                NamingPolicy::FullTimestamp,
                capture_time,
                extension_with_dot,
                None,
                sequence,
            ),
        },
    }
}

fn advance_day(current: Option<(NaiveDate, u32)>, date: NaiveDate) -> (NaiveDate, u32) {
    match current {
        Some((day, seq)) if day == date => (day, seq + 1),
        _ => (date, 1),
    }
}

fn folder_of<'a>(path: &'a Path, fallback: &'a Path) -> &'a Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(fallback)
}
