// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use log::LevelFilter;
use rolodex_app::AppState;
use runtime::CacheRuntime;
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `rolodex --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let client = if options.demo {
        None
    } else {
        Some(
            rolodex_api::Client::new(config.source_url(), config.source_timeout()?).with_context(
                || {
                    format!(
                        "invalid [source] config in {}; fix url/timeout values",
                        options.config_path.display()
                    )
                },
            )?,
        )
    };
    if options.check_only {
        return Ok(());
    }

    init_logging(config.log_level(), &config.log_path()?)?;
    log::info!(
        "starting rolodex with config {}",
        options.config_path.display()
    );

    let mut runtime = match client {
        Some(client) => CacheRuntime::new(client),
        None => CacheRuntime::demo(),
    };
    let mut state = AppState::default();
    rolodex_tui::run_app(&mut state, &mut runtime)
}

fn init_logging(level: LevelFilter, path: &Path) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    simplelog::WriteLogger::init(level, simplelog::Config::default(), file)
        .context("initialize logger")?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("rolodex");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with built-in demo users (no network)");
    println!("  --check                  Validate config and the user source, then exit");
    println!("  --help                   Show this help");
}
