use anyhow::Result;
use clap::Parser;

use smell_sight::cli::{Cli, Commands, OutputFormat};
use smell_sight::config::{Config, ConfigService};
use smell_sight::doctor;
use smell_sight::error::SmellError;
use smell_sight::models::pairing::PairingsResult;
use smell_sight::service::{Pipeline, RunParams, locate_analyzer};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli) {
        let (code, message) = classify_error(&e);
        match format {
            OutputFormat::Json => {
                let error = serde_json::json!({
                    "error": { "code": code, "message": message }
                });
                println!("{error}");
            }
            OutputFormat::Text => eprintln!("error[{code}]: {message}"),
        }
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn classify_error(e: &anyhow::Error) -> (String, String) {
    if let Some(se) = e.downcast_ref::<SmellError>() {
        (se.code.to_string(), se.message.clone())
    } else {
        ("IO_ERROR".to_string(), format!("{e:#}"))
    }
}

struct Output {
    format: OutputFormat,
    pretty: bool,
}

impl Output {
    /// Print `value` as JSON, or its text rendering.
    fn emit<T: serde::Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json if self.pretty => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
            OutputFormat::Text => println!("{}", text()),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<()> {
    let config = ConfigService::load(cli.config.as_deref())?;
    let _log_guard = smell_sight::logger::init(&config, cli.debug || config.debug)?;

    let out = Output {
        format: cli.format,
        pretty: cli.pretty,
    };

    match cli.command {
        Commands::Init { path } => {
            let config_path = if let Some(p) = path {
                ConfigService::generate_at(&p)?;
                p
            } else {
                ConfigService::generate_default()?;
                ConfigService::default_path()
            };
            eprintln!("Configuration file created at: {}", config_path.display());
            Ok(())
        }
        Commands::Detect {
            dirs,
            analyzer,
            report_dir,
        } => {
            let name = analyzer.unwrap_or_else(|| config.analyzer.clone());
            let analyzer = locate_analyzer(&name, &dirs.project_dir)?;
            let pipeline = Pipeline::new(&config)?;
            let outcome = pipeline.run(&RunParams {
                test_root: &dirs.test_root(),
                production_root: &dirs.production_root(),
                analyzer: &analyzer,
                report_dir: &dirs.project_dir.join(report_dir),
            })?;
            out.emit(&outcome, || outcome.to_string())
        }
        Commands::Pairs { dirs } => {
            let pipeline = Pipeline::new(&config)?;
            let set = pipeline.pairings(&dirs.test_root(), &dirs.production_root())?;
            let result = PairingsResult::from(&set);
            out.emit(&result, || render_pairs(&result))
        }
        Commands::Summarize { path } => {
            let report = Pipeline::new(&config)?.summarize(&path)?;
            out.emit(&report, || report.to_string())
        }
        Commands::Doctor {
            project_dir,
            analyzer,
        } => cmd_doctor(&config, &out, analyzer, &project_dir),
    }
}

fn cmd_doctor(
    config: &Config,
    out: &Output,
    analyzer: Option<String>,
    project_dir: &std::path::Path,
) -> Result<()> {
    let name = analyzer.unwrap_or_else(|| config.analyzer.clone());
    let report = doctor::run_doctor(config, &name, project_dir);
    out.emit(&report, || {
        let analyzer = match &report.analyzer.path {
            Some(p) => format!("found at {}", p.display()),
            None => "not found".to_string(),
        };
        let java = if report.java.available {
            "available"
        } else {
            "not available"
        };
        format!(
            "smell-sight {}\nanalyzer {}: {analyzer}\njava ({}): {java}",
            report.version, report.analyzer.name, report.java.command
        )
    })
}

fn render_pairs(result: &PairingsResult) -> String {
    let mut lines: Vec<String> = result
        .pairings
        .iter()
        .map(|p| match &p.production {
            Some(prod) => format!("{} -> {}", p.test.display(), prod.display()),
            None => format!("{} -> (no match)", p.test.display()),
        })
        .collect();
    lines.push(format!(
        "{} test files, {} matched",
        result.total, result.matched
    ));
    lines.join("\n")
}
