mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{config_path, load_config};
use photo_date_renamer_core::{
    apply_plan_with, generate_plan, load_plan, normalize_topic, save_plan, ApplyReport,
    NamingPolicy, PlanOptions, RenamePlan,
};
use std::path::PathBuf;
use tracing::{warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "photo-date-renamer-cli")]
#[command(about = "写真を撮影日時に基づいて一括リネームします")]
struct Cli {
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Apply(ApplyArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[arg(long)]
    folder: String,
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
    #[arg(long)]
    topic: Option<String>,
    #[arg(long, default_value_t = false, overrides_with = "no_include_hidden")]
    include_hidden: bool,
    /// 設定ファイルの include_hidden = true を打ち消します
    #[arg(long, default_value_t = false, overrides_with = "include_hidden")]
    no_include_hidden: bool,
    #[arg(long, default_value_t = false)]
    apply: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long)]
    save_plan: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ApplyArgs {
    #[arg(long)]
    plan: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    DayCounter,
    FullTimestamp,
    FullTimestampWithTopic,
}

impl RenameArgs {
    fn include_hidden_or(&self, configured: bool) -> bool {
        if self.include_hidden {
            true
        } else if self.no_include_hidden {
            false
        } else {
            configured
        }
    }
}

impl From<PolicyArg> for NamingPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::DayCounter => NamingPolicy::DayCounter,
            PolicyArg::FullTimestamp => NamingPolicy::FullTimestamp,
            PolicyArg::FullTimestampWithTopic => NamingPolicy::FullTimestampWithTopic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Apply(args) => cmd_apply(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;
    let policy = args.policy.map(NamingPolicy::from).unwrap_or(config.policy);
    let include_hidden = args.include_hidden_or(config.include_hidden);
    let topic = args.topic.unwrap_or(config.topic);

    if policy == NamingPolicy::FullTimestampWithTopic && normalize_topic(&topic).is_none() {
        warn!("トピックが空のため、トピックなしのファイル名になります");
    }

    let options = PlanOptions {
        folder: args.folder.into(),
        topic,
        include_hidden,
    };

    let plan = generate_plan(policy, &options)?;

    match args.output {
        OutputFormat::Json => {
            if !args.apply {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            }
        }
        OutputFormat::Table => print_table(&plan),
    }

    if let Some(path) = &args.save_plan {
        save_plan(&plan, path)?;
        eprintln!("計画を保存しました: {}", path.display());
    }

    if plan.is_empty() {
        eprintln!("対象ファイルがありません。撮影日時を持つ写真が見つかりませんでした。");
        return Ok(());
    }

    if args.apply {
        run_apply(&plan, args.output)?;
    } else {
        eprintln!("dry-runモード: 実ファイルは変更していません。適用するには --apply を指定してください。");
    }

    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> Result<()> {
    let plan = load_plan(&args.plan)?;
    if plan.is_empty() {
        eprintln!("対象ファイルがありません。");
        return Ok(());
    }
    run_apply(&plan, args.output)
}

fn run_apply(plan: &RenamePlan, output: OutputFormat) -> Result<()> {
    let report = apply_plan_with(
        plan,
        || false,
        |outcome| {
            if output == OutputFormat::Table {
                println!("{outcome}");
            }
        },
    );

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    print_summary(&report);
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("設定ファイル: {}", config_path()?.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_table(plan: &RenamePlan) {
    println!("元ファイル -> 新ファイル (撮影日時)");
    for entry in &plan.entries {
        let marker = if entry.keeps_name() { " [変更なし]" } else { "" };
        println!(
            "{} -> {} ({}){}",
            entry.original_name, entry.target_name, entry.capture_time, marker
        );
    }

    println!(
        "\n集計: scanned={} unsupported_skip={} hidden_skip={} no_date={} planned={} unchanged={} duplicate_targets={}",
        plan.stats.scanned_files,
        plan.stats.skipped_unsupported,
        plan.stats.skipped_hidden,
        plan.stats.missing_capture_time,
        plan.stats.planned,
        plan.stats.already_named,
        plan.stats.duplicate_targets
    );
    if plan.stats.duplicate_targets > 0 {
        eprintln!(
            "注意: 同じ秒に撮影された写真があります。適用時に{}件が競合としてスキップされます。",
            plan.stats.duplicate_targets
        );
    }
}

fn print_summary(report: &ApplyReport) {
    eprintln!(
        "適用完了: リネーム {}件 / 変更なし {}件 / 競合 {}件 / 失敗 {}件",
        report.renamed, report.unchanged, report.conflicts, report.failed
    );
}
