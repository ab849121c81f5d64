use std::path::Path;

use {
    anyhow::Result,
    nurph_config::{Diagnostic, Severity, validate::validate},
    nurph_twilio::TwilioConfig,
    nurph_webhook::WebhookConfig,
};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// `nurph check`: report config problems, exit 1 on errors.
pub fn run(path: Option<&Path>, verbose: bool) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(nurph_config::find_config_file);
    let config = match &path {
        Some(path) => {
            eprintln!("Checking {}\n", path.display());
            nurph_config::read_config(path)?
        },
        None => {
            eprintln!("No config file found; checking defaults.\n");
            nurph_config::NurphConfig::default()
        },
    };

    let mut diagnostics = validate(&config).diagnostics;
    diagnostics.extend(adapter_diagnostics(&config));

    let mut shown = 0;
    for d in &diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }
        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => CYAN,
        };
        eprintln!("  {BOLD}{color}{}{RESET} {}: {}", d.severity, d.path, d.message);
        shown += 1;
    }

    let errors = count(&diagnostics, Severity::Error);
    let warnings = count(&diagnostics, Severity::Warning);
    if shown > 0 {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}

/// Run each adapter's own config parser over its section.
fn adapter_diagnostics(config: &nurph_config::NurphConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if let Some(section) = &config.adapters.twilio
        && let Err(e) = TwilioConfig::from_value(section.clone())
    {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path: "adapters.twilio".into(),
            message: e.to_string(),
        });
    }
    if let Some(section) = &config.adapters.webhook
        && let Err(e) = WebhookConfig::from_value(section.clone())
    {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            path: "adapters.webhook".into(),
            message: e.to_string(),
        });
    }
    diagnostics
}
