use anyhow::{Context, Result};
use directories::ProjectDirs;
use photo_date_renamer_core::NamingPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    pub policy: NamingPolicy,
    pub topic: String,
    pub include_hidden: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            policy: NamingPolicy::DayCounter,
            topic: String::new(),
            include_hidden: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "photo-date-renamer", "photo-date-renamer")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("設定ファイルを読めませんでした: {}", path.display()))?;
    parse_config(&raw)
}

fn parse_config(raw: &str) -> Result<CliConfig> {
    toml::from_str::<CliConfig>(raw).context("設定ファイルのパースに失敗しました")
}
