//! `reqview` command-line tool.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use reqview_cli::config::{AppConfig, Role};
use reqview_cli::logging::{LogConfig, LogFormat, init_logging};
use reqview_ingest::IngestError;
use reqview_persistence::{Backend, PersistenceError};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod render;

use crate::cli::{BackendArg, Cli, Command, LogFormatArg, LogLevelArg, RoleArg, ScreenshotCommand};
use crate::commands::{
    Session, find_report, run_delete, run_delete_all, run_export, run_list, run_rename,
    run_screenshot_add, run_screenshot_delete, run_screenshot_list, run_upload,
};
use crate::render::{report_list_table, report_table, screenshot_table};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            if let Some(hint) = hint_for(&error) {
                eprintln!("hint: {hint}");
            }
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let (mut config, _) = AppConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    let session = Session::open(config)?;

    match cli.command {
        Command::Upload(args) => {
            let report = run_upload(&session, &args).await?;
            println!(
                "Saved report {} \"{}\" ({} records)",
                report.id(),
                report.name(),
                report.record_count()
            );
        }
        Command::List => {
            let reports = run_list(&session).await?;
            if reports.is_empty() {
                println!("No reports stored.");
            } else {
                println!("{}", report_list_table(&reports));
            }
        }
        Command::Show(args) => {
            let report = find_report(&session, args.id).await?;
            println!(
                "{} ({} records, created {})",
                report.name(),
                report.record_count(),
                report.created_at().format("%Y-%m-%d %H:%M")
            );
            let template = (!args.no_links).then_some(session.config.link_template.as_str());
            println!("{}", report_table(&report, template));
        }
        Command::Rename(args) => {
            let report = run_rename(&session, &args).await?;
            println!("Renamed report {} to \"{}\"", report.id(), report.name());
        }
        Command::Delete(args) => {
            run_delete(&session, args.id).await?;
            println!("Deleted report {}", args.id);
        }
        Command::DeleteAll(args) => {
            run_delete_all(&session, &args).await?;
            println!("Deleted all reports");
        }
        Command::Export(args) => {
            let path = run_export(&session, &args).await?;
            println!("Exported {}", path.display());
        }
        Command::Screenshot(ScreenshotCommand::Add(args)) => {
            let id = run_screenshot_add(&session, &args).await?;
            println!("Saved screenshot {id} for {}", args.requisition.trim());
        }
        Command::Screenshot(ScreenshotCommand::List(args)) => {
            let (shots, written) = run_screenshot_list(&session, &args).await?;
            if shots.is_empty() {
                println!("No screenshots for {}.", args.requisition.trim());
            } else {
                println!("{}", screenshot_table(&shots));
            }
            for path in written {
                println!("Wrote {}", path.display());
            }
        }
        Command::Screenshot(ScreenshotCommand::Delete(args)) => {
            run_screenshot_delete(&session, args.id).await?;
            println!("Deleted screenshot {}", args.id);
        }
    }
    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(backend) = cli.backend {
        config.backend = match backend {
            BackendArg::File => Backend::File,
            BackendArg::Local => Backend::Local,
            BackendArg::Remote => Backend::Remote,
        };
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(role) = cli.role {
        config.role = match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Viewer => Role::Viewer,
        };
    }
}

fn hint_for(error: &anyhow::Error) -> Option<String> {
    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<PersistenceError>() {
            return err.suggestion();
        }
        if let Some(IngestError::NoMatchingRows { .. }) = cause.downcast_ref::<IngestError>() {
            return Some("pass --allow-empty to store an empty report instead".to_string());
        }
    }
    None
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
