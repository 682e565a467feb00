use crate::metadata::is_supported_extension;
use crate::planner::RenamePlan;
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn save_plan(plan: &RenamePlan, path: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(plan).context("計画のシリアライズに失敗しました")?;
    fs::write(path, body)
        .with_context(|| format!("計画ファイルを書き込めませんでした: {}", path.display()))?;
    Ok(())
}

/// Loads a plan saved by [`save_plan`] and rejects entries that would move a
/// file out of its folder or that disagree with their own target name.
pub fn load_plan(path: &Path) -> Result<RenamePlan> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("計画ファイルを読めませんでした: {}", path.display()))?;
    let plan = serde_json::from_str::<RenamePlan>(&raw).context("計画ファイルが壊れています")?;
    validate_plan(&plan)?;
    Ok(plan)
}

pub fn validate_plan(plan: &RenamePlan) -> Result<()> {
    let mut seen_sources = HashSet::<&Path>::new();

    for entry in &plan.entries {
        if !seen_sources.insert(entry.source.as_path()) {
            bail!(
                "重複した元ファイルが含まれています: {}",
                entry.source.display()
            );
        }

        if !is_supported_extension(&entry.source) || !is_supported_extension(&entry.target_path) {
            bail!(
                "対象外の拡張子のファイルは適用できません: {}",
                entry.source.display()
            );
        }

        let file_name = entry.target_path.file_name().with_context(|| {
            format!(
                "リネーム先ファイル名が不正です: {}",
                entry.target_path.display()
            )
        })?;
        if file_name.to_string_lossy() != entry.target_name {
            bail!(
                "リネーム先ファイル名が計画と一致しません: {}",
                entry.target_path.display()
            );
        }

        if entry.target_path.parent() != entry.source.parent() {
            bail!(
                "元ファイルと別のフォルダへのリネームは適用できません: {}",
                entry.target_path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_plan, save_plan, validate_plan};
    use crate::metadata::MediaFile;
    use crate::planner::{build_plan, NamingPolicy, PlanOptions};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn sample_plan(folder: &std::path::Path) -> crate::planner::RenamePlan {
        let time = NaiveDate::from_ymd_opt(2023, 5, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid date");
        build_plan(
            &[MediaFile::new(folder.join("a.jpg"), Some(time))],
            NamingPolicy::FullTimestampWithTopic,
            &PlanOptions {
                folder: folder.to_path_buf(),
                topic: "beach trip".to_string(),
                include_hidden: false,
            },
        )
    }

    #[test]
    fn saved_plan_loads_back_identically() {
        let temp = tempdir().expect("tempdir");
        let plan = sample_plan(temp.path());
        let path = temp.path().join("plan.json");
        save_plan(&plan, &path).expect("save");

        let loaded = load_plan(&path).expect("load");
        assert_eq!(loaded, plan);
    }

    #[test]
    fn target_outside_source_folder_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let mut plan = sample_plan(temp.path());
        plan.entries[0].target_path = temp
            .path()
            .join("elsewhere")
            .join(&plan.entries[0].target_name);

        let err = validate_plan(&plan).expect_err("must be rejected");
        assert!(err
            .to_string()
            .contains("元ファイルと別のフォルダへのリネームは適用できません"));
    }

    #[test]
    fn mismatched_target_name_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let mut plan = sample_plan(temp.path());
        plan.entries[0].target_name = "other.jpg".to_string();
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let mut plan = sample_plan(temp.path());
        plan.entries[0].source = temp.path().join("notes.txt");
        plan.entries[0].original_name = "notes.txt".to_string();

        let err = validate_plan(&plan).expect_err("must be rejected");
        assert!(err.to_string().contains("対象外の拡張子"));

        let mut plan = sample_plan(temp.path());
        plan.entries[0].target_name = "2023-05-01-100000_beach_trip.txt".to_string();
        plan.entries[0].target_path = temp.path().join(&plan.entries[0].target_name);
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn broken_plan_file_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("plan.json");
        fs::write(&path, "{ not json").expect("write");
        let err = load_plan(&path).expect_err("must fail");
        assert!(err.to_string().contains("計画ファイルが壊れています"));
    }
}
