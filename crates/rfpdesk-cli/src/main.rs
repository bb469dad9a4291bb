// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use logging::LogTarget;
use rfpdesk_app::AppState;
use rfpdesk_report::{ExportKind, Exporter};
use runtime::{CliRuntime, RfpSource};
use std::env;
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
            "load config {}; run `rfpdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let headless = options.check_only || options.export.is_some();
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.log_file()?)
    };
    let _log_guard = logging::init(&config.log_level(), &target)?;

    let exporter = Exporter::new(config.export_dir(), config.open_html() && !headless);
    let chat_timing = config.chat_timing()?;

    if let Some(kind) = options.export {
        let runtime = CliRuntime::new(RfpSource::Demo, exporter, chat_timing);
        let receipt = runtime.export(kind)?;
        println!("{}", receipt.path.display());
        return Ok(());
    }

    let source = if options.demo {
        RfpSource::Demo
    } else {
        RfpSource::Remote(remote_client(&config, &options.config_path)?)
    };
    if options.check_only {
        tracing::info!(demo = options.demo, "configuration ok");
        return Ok(());
    }

    tracing::info!(
        demo = options.demo,
        export_dir = %exporter.dir().display(),
        "starting rfpdesk"
    );
    let mut state = AppState::default();
    let mut runtime = CliRuntime::new(source, exporter, chat_timing);
    rfpdesk_tui::run_app(&mut state, &mut runtime)
}

fn remote_client(config: &Config, config_path: &Path) -> Result<rfpdesk_remote::Client> {
    let url = config.remote_url().unwrap_or_default();
    let anon_key = config.remote_anon_key().unwrap_or_default();
    rfpdesk_remote::Client::new(&url, &anon_key, config.remote_timeout()?).with_context(|| {
        format!(
            "invalid [remote] config in {}; set url/anon_key or run with --demo",
            config_path.display()
        )
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    export: Option<ExportKind>,
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
        print_example: false,
        demo: false,
        check_only: false,
        export: None,
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
            "--export" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--export requires a kind: draft, html, or final")
                })?;
                options.export = Some(ExportKind::parse(value.as_ref())?);
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
    println!("rfpdesk: agentic RFP optimizer dashboard");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with built-in RFPs instead of the remote table");
    println!("  --check                  Validate config and remote settings, then exit");
    println!("  --export <kind>          Write the sample report (draft, html, final) and print its path");
    println!("  --help                   Show this help");
}
