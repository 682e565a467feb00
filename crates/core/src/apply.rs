use crate::planner::{RenamePlan, RenamePlanEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The file already carries its target name.
    Unchanged,
    Renamed,
    /// Something else already occupies the target path; the source was left alone.
    Conflict,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub outcome: Outcome,
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = display_name(&self.source);
        let target = display_name(&self.target);
        match &self.outcome {
            Outcome::Unchanged => write!(f, "変更なし: {source} (既に正しい名前です)"),
            Outcome::Renamed => write!(f, "リネーム: {source} -> {target}"),
            Outcome::Conflict => {
                write!(f, "競合: {target} は既に存在します。{source} はスキップしました")
            }
            Outcome::Failed { reason } => {
                write!(f, "失敗: {source} -> {target} ({reason})")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub outcomes: Vec<EntryOutcome>,
    pub renamed: usize,
    pub unchanged: usize,
    pub conflicts: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl ApplyReport {
    fn record(&mut self, entry: EntryOutcome) {
        match entry.outcome {
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Renamed => self.renamed += 1,
            Outcome::Conflict => self.conflicts += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(entry);
    }
}

pub fn apply_plan(plan: &RenamePlan) -> ApplyReport {
    apply_plan_with(plan, || false, |_| {})
}

/// Applies `plan` entry by entry, in order. `is_cancelled` is polled before
/// each entry; once it returns true no further entries are touched.
/// Existing files are never overwritten.
pub fn apply_plan_with<FCancel, FOutcome>(
    plan: &RenamePlan,
    is_cancelled: FCancel,
    mut on_outcome: FOutcome,
) -> ApplyReport
where
    FCancel: Fn() -> bool,
    FOutcome: FnMut(&EntryOutcome),
{
    let mut report = ApplyReport::default();

    for entry in &plan.entries {
        if is_cancelled() {
            report.cancelled = true;
            info!(
                processed = report.outcomes.len(),
                total = plan.entries.len(),
                "キャンセルされました"
            );
            break;
        }

        let result = EntryOutcome {
            source: entry.source.clone(),
            target: entry.target_path.clone(),
            outcome: apply_entry(entry),
        };
        match result.outcome {
            Outcome::Failed { .. } => warn!("{result}"),
            _ => debug!("{result}"),
        }
        on_outcome(&result);
        report.record(result);
    }

    report
}

fn apply_entry(entry: &RenamePlanEntry) -> Outcome {
    if is_same_file(&entry.source, &entry.target_path) {
        return Outcome::Unchanged;
    }
    if fs::symlink_metadata(&entry.target_path).is_ok() {
        return Outcome::Conflict;
    }
    match fs::rename(&entry.source, &entry.target_path) {
        Ok(()) => Outcome::Renamed,
        Err(err) => Outcome::Failed {
            reason: err.to_string(),
        },
    }
}

fn is_same_file(source: &Path, target: &Path) -> bool {
    if source == target {
        return true;
    }
    match (fs::canonicalize(source), fs::canonicalize(target)) {
        (Ok(source), Ok(target)) => source == target,
        _ => false,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
