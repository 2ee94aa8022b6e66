mod logging;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use imagerenamer_core::{
    app_paths, load_config, load_config_from, rename_images_with_progress, save_config,
    save_config_to, validate_template, AppConfig, RenameEvent, RenameOptions, RunStatistics,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "imagerenamer", version, disable_version_flag = true)]
#[command(about = "Rename image files after the date they were taken")]
struct Cli {
    /// Folder containing the images to rename
    #[arg(required_unless_present_any = ["show_config", "save_config"])]
    folder: Option<PathBuf>,
    /// Copy originals into <folder>/backup before renaming
    #[arg(short, long, default_value_t = false)]
    backup: bool,
    /// strftime-style pattern for the new name [default: %Y-%m-%d_%H-%M-%S]
    #[arg(short, long)]
    format: Option<String>,
    /// Read settings from this file instead of the per-user config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,
    /// Store the effective settings, including -b and -f, as the config file and exit
    #[arg(long, default_value_t = false)]
    save_config: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long, default_value_t = false)]
    verbose: bool,
    #[arg(long, default_value_t = false)]
    json_logs: bool,
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);
    run(&cli).map(ExitCode::from)
}

fn run(cli: &Cli) -> Result<u8> {
    let config = match cli.config.as_deref() {
        Some(path) if cli.save_config && !path.exists() => AppConfig::default(),
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if cli.show_config {
        cmd_show_config(cli, &config)?;
        return Ok(0);
    }
    if cli.save_config {
        cmd_save_config(cli, &config)?;
        return Ok(0);
    }

    let folder = cli
        .folder
        .as_deref()
        .context("a folder argument is required")?;
    let options = resolve_options(cli, &config)?;

    let json = cli.output == OutputFormat::Json;
    let stats = rename_images_with_progress(folder, &options, &mut |event: &RenameEvent| {
        if json {
            eprintln!("{event}");
        } else {
            println!("{event}");
        }
    })?;

    match cli.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => print_summary(&stats),
    }

    Ok(exit_status(&stats))
}

fn resolve_options(cli: &Cli, config: &AppConfig) -> Result<RenameOptions> {
    let mut options = config.rename_options();
    if cli.backup {
        options.create_backup = true;
    }
    if let Some(format) = cli.format.as_ref() {
        options.format = format.clone();
    }
    validate_template(&options.format)
        .with_context(|| format!("--format {:?} is not usable", options.format))?;
    Ok(options)
}

fn exit_status(stats: &RunStatistics) -> u8 {
    if stats.has_error() {
        1
    } else {
        0
    }
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match cli.config.clone() {
        Some(path) => Ok(path),
        None => Ok(app_paths()?.config_path),
    }
}

fn cmd_show_config(cli: &Cli, config: &AppConfig) -> Result<()> {
    println!("config file: {}", config_path(cli)?.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn cmd_save_config(cli: &Cli, config: &AppConfig) -> Result<()> {
    let options = resolve_options(cli, config)?;
    let updated = AppConfig {
        format: options.format,
        backup: options.create_backup,
        ..config.clone()
    };
    match cli.config.as_deref() {
        Some(path) => save_config_to(&updated, path)?,
        None => save_config(&updated)?,
    }
    println!("saved config: {}", config_path(cli)?.display());
    Ok(())
}

fn print_summary(stats: &RunStatistics) {
    println!("\n--- Summary ---");
    println!("Total image files: {}", stats.total);
    println!("Files renamed: {}", stats.renamed);
    println!("Files skipped: {}", stats.skipped);

    if let Some(error) = stats.error.as_deref() {
        println!("\nError: {error}");
    } else if stats.renamed > 0 {
        println!("\nRenaming completed successfully!");
    } else {
        println!("\nNo files were renamed.");
    }
}
