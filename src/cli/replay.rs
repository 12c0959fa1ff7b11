use crate::backend::ClassicalBackend;
use crate::config::{LeakPolicy, RuntimeConfig};
use crate::error::{Error, Result};
use crate::script::{self, ReplayReport, Script};
use std::path::{Path, PathBuf};

/// Report rendering for the replay subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

pub struct ReplayArgs {
    pub script_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub format: ReportFormat,
}

/// Run the replay subcommand
pub fn replay(args: &ReplayArgs) -> Result<()> {
    let config = match &args.config_path {
        Some(path) => RuntimeConfig::load_from_file(path)?,
        None => RuntimeConfig::default(),
    };
    let script = load_script(&args.script_path)?;

    let report = script::replay(
        &script,
        Box::new(ClassicalBackend::new()),
        config.context_options(),
    )?;

    let rendered = render(&report, args.format)?;
    super::utils::write_output(&rendered, args.output_path.as_ref())?;

    check_leaks(&report, config.leak_policy)
}

/// Render a replay report in the requested format
pub fn render(report: &ReplayReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).map_err(|e| Error::Serialization {
                message: e.to_string(),
            })
        }
        ReportFormat::Text => Ok(render_text(report)),
    }
}

fn load_script(path: &Path) -> Result<Script> {
    if !path.exists() {
        return Err(Error::Io(format!("Failed to read file: {}", path.display())));
    }
    Script::load_from_file(path)
}

fn check_leaks(report: &ReplayReport, policy: LeakPolicy) -> Result<()> {
    if !report.teardown.has_leaks() {
        return Ok(());
    }
    let leaked = report.teardown.leaked_results.len();
    match policy {
        LeakPolicy::Ignore => Ok(()),
        LeakPolicy::Warn => {
            log::warn!("{} result(s) still referenced at teardown", leaked);
            Ok(())
        }
        LeakPolicy::Fail => Err(Error::Leaks { count: leaked }),
    }
}

/// Render a replay report as plain text
pub fn render_text(report: &ReplayReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("Backend: {}\n", report.teardown.backend));
    output.push_str(&format!("Steps: {}\n", report.steps));
    output.push_str(&format!("Results released: {}\n", report.releases));
    for line in &report.output {
        output.push_str(&format!("  {}\n", line));
    }
    if report.teardown.has_leaks() {
        output.push_str("Leaked results:\n");
        for (handle, count) in &report.teardown.leaked_results {
            output.push_str(&format!("  {} (count {})\n", handle, count));
        }
    }
    output
}
