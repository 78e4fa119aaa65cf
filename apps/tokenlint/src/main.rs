//! tokenlint CLI binary entry point.
//! Resolves configuration, runs the pipeline, prints and writes reports.

use anyhow::Context;
use clap::Parser;
use tokenlint::cli::{Cli, Commands};
use tokenlint::config::{self, OutputMode, Overrides};
use tokenlint::registry::Registry;
use tokenlint::utils::{error_prefix, info_prefix, note_prefix};
use tokenlint::{lint, output};
use tracing_subscriber::EnvFilter;

const EXIT_DIAGNOSTIC_ERRORS: i32 = 1;
const EXIT_FATAL: i32 = 2;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tokenlint=debug")
    } else {
        EnvFilter::try_from_env("TOKENLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", error_prefix(), e);
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Rules { repo_root } => {
            init_tracing(false);
            let eff = config::resolve_effective(&Overrides {
                repo_root,
                ..Overrides::default()
            })?;
            let mut registry = Registry::builtin();
            for custom in &eff.custom_rules {
                let rule = tokenlint::ai::custom::load_custom_rule(&eff.repo_root, custom)?;
                registry.register(rule)?;
            }
            for rule in registry.rules() {
                let severity = rule
                    .severity()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "config".to_string());
                println!(
                    "{:<22} {:<6} {:<6} {}",
                    rule.id(),
                    rule.kind(),
                    severity,
                    rule.description()
                );
            }
            Ok(0)
        }
        Commands::Lint {
            repo_root,
            tokens,
            files,
            output,
            report_json,
            report_md,
            no_ai,
            provider,
            model,
            api_key,
            verbose,
        } => {
            init_tracing(verbose);
            let eff = config::resolve_effective(&Overrides {
                repo_root,
                tokens,
                files,
                output,
                report_json,
                report_markdown: report_md,
                no_ai,
                provider,
                model,
                api_key,
            })?;
            if eff.output == OutputMode::Human {
                if !eff.config_found {
                    eprintln!("{} No tokenlint.toml found; using defaults.", note_prefix());
                }
                if eff.files.is_empty() {
                    eprintln!(
                        "{} No code file patterns configured; raw-color and raw-pixel have nothing to scan.",
                        info_prefix()
                    );
                }
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            let report = runtime.block_on(lint::run_lint(&eff))?;

            output::print_report(&report, eff.output);
            if let Some(path) = &eff.report_json {
                output::write_report(&eff.repo_root.join(path), &output::render_json(&report))?;
            }
            if let Some(path) = &eff.report_markdown {
                output::write_report(
                    &eff.repo_root.join(path),
                    &output::render_markdown(&report),
                )?;
            }
            Ok(if report.has_errors() {
                EXIT_DIAGNOSTIC_ERRORS
            } else {
                0
            })
        }
    }
}
