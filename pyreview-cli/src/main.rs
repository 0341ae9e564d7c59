//! pyreview CLI entry point
//!
//! `analyze` prints or writes the Markdown (or JSON) report for one source,
//! `serve` starts the browser surface and `tools` reports which analyzers
//! are installed.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use config::AppConfig;
use pyreview_analysis::{AnalysisExporter, ReviewPipeline};
use pyreview_core::{Error, SourceCode, ToolManager};

#[derive(Parser)]
#[command(name = "pyreview")]
#[command(about = "Python code review assistant: style (flake8), formatting (black) and complexity (radon) in one report")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short = 'c', long, global = true, env = "PYREVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one Python source and print the report
    Analyze {
        /// Python file to analyze; `-` or nothing reads stdin
        file: Option<PathBuf>,

        /// Analyze this code instead of a file
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Emit the full report as JSON instead of Markdown
        #[arg(long)]
        json: bool,

        /// Run the tools one after another
        #[arg(long)]
        sequential: bool,

        /// Per-tool timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Serve the browser interface
    Serve {
        /// Address to listen on
        #[arg(short = 'b', long)]
        bind: Option<String>,
    },

    /// Show whether flake8, black and radon are installed
    Tools,
}

impl Cli {
    /// Flag values layered over the config file
    fn overrides(&self) -> serde_json::Value {
        let mut overrides = json!({});
        if self.debug {
            overrides["logging"]["level"] = json!("debug");
        }

        match &self.command {
            Commands::Analyze {
                sequential,
                timeout,
                ..
            } => {
                if *sequential {
                    overrides["review"]["parallel_execution"] = json!(false);
                }
                if let Some(timeout) = timeout {
                    overrides["review"]["timeout_secs"] = json!(timeout);
                }
            }
            Commands::Serve { bind: Some(bind) } => {
                overrides["server"]["bind"] = json!(bind);
            }
            Commands::Serve { bind: None } | Commands::Tools => {}
        }

        overrides
    }
}

fn read_source(file: Option<&Path>, code: Option<String>) -> Result<SourceCode> {
    if let Some(code) = code {
        return Ok(SourceCode::new(code));
    }

    match file {
        Some(path) if path != Path::new("-") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let origin = path.file_name().map_or_else(
                || path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
            Ok(SourceCode::new(text).with_origin(origin))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read source from stdin")?;
            Ok(SourceCode::new(text).with_origin("stdin"))
        }
    }
}

async fn run_analyze(
    config: &AppConfig,
    source: SourceCode,
    output: Option<PathBuf>,
    as_json: bool,
) -> Result<ExitCode> {
    let pipeline = ReviewPipeline::new(&config.review);

    let report = match pipeline.analyze(source).await {
        Ok(report) => report,
        Err(Error::Validation(message)) => {
            eprintln!("❌ {message}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let rendered = if as_json {
        AnalysisExporter::to_json(&report)?
    } else {
        AnalysisExporter::to_markdown(&report).to_string()
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("💾 Report saved to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if report.degraded_sections() > 0 {
        eprintln!(
            "⚠️  {} of 3 tools failed; see the report for details",
            report.degraded_sections()
        );
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_tools(config: &AppConfig) -> Result<()> {
    let manager = ToolManager::new(&config.review);

    for status in manager.check_tool_availability().await {
        match (&status.version, &status.error) {
            (Some(version), _) => {
                let location = status
                    .resolved_path
                    .as_ref()
                    .map_or_else(|| status.program.clone(), |path| path.display().to_string());
                println!("✅ {}: {} ({})", status.tool, version, location);
            }
            (None, error) => println!(
                "❌ {}: not available ({})",
                status.tool,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref(), cli.overrides())?;
    pyreview_utils::init_logging(&config.logging)?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Commands::Analyze {
            file,
            code,
            output,
            json,
            ..
        } => {
            let source = read_source(file.as_deref(), code)?;
            run_analyze(&config, source, output, json).await
        }

        Commands::Serve { .. } => {
            pyreview_web::serve(config.server.clone(), &config.review).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Tools => {
            run_tools(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
