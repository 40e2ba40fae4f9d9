//! Run summary rendering.
//!
//! JSON output is a single envelope on stdout:
//!
//! ```json
//! { "ok": true, "data": { "sections": 2, "contacts": [...], "sessionRepairs": 0 }, "timings": { "durationMs": 5120 } }
//! ```
//!
//! On failure `data` is replaced by `error` with a message and exit code.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use rollcall::{Outcome, RunReport};
use serde::Serialize;

use crate::error::CliError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable summary
	#[default]
	Text,
	/// JSON envelope
	Json,
}

const OUTCOMES: [Outcome; 4] = [
	Outcome::MessageSent,
	Outcome::Removed,
	Outcome::SkippedByPolicy,
	Outcome::SkippedUnresolvable,
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
	ok: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	data: Option<&'a RunReport>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<ErrorBody>,
	timings: Timing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
	message: String,
	exit_code: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Timing {
	duration_ms: u64,
}

fn timing(elapsed: Duration) -> Timing {
	Timing {
		duration_ms: elapsed.as_millis().try_into().unwrap_or(u64::MAX),
	}
}

pub fn render_json(report: &RunReport, elapsed: Duration) -> serde_json::Result<String> {
	serde_json::to_string_pretty(&Envelope {
		ok: true,
		data: Some(report),
		error: None,
		timings: timing(elapsed),
	})
}

pub fn render_text(report: &RunReport, elapsed: Duration) -> String {
	let mut out = String::new();
	let _ = writeln!(
		out,
		"{} {} sections, {} contacts in {:.1}s",
		"rollcall".green().bold(),
		report.sections,
		report.contacts.len(),
		elapsed.as_secs_f64()
	);
	for outcome in OUTCOMES {
		let _ = writeln!(out, "  {:<24} {}", outcome.to_string(), report.count(outcome));
	}
	if report.session_repairs > 0 {
		let _ = writeln!(out, "  {:<24} {}", "session repairs".yellow(), report.session_repairs);
	}
	for record in &report.contacts {
		let name = record.name.as_deref().unwrap_or("<unreadable>");
		let outcome = match record.outcome {
			Outcome::MessageSent => record.outcome.to_string().green(),
			Outcome::Removed => record.outcome.to_string().cyan(),
			Outcome::SkippedByPolicy => record.outcome.to_string().dimmed(),
			Outcome::SkippedUnresolvable => record.outcome.to_string().red(),
		};
		let _ = writeln!(out, "  [{}:{}] {name} - {outcome}", record.section, record.index);
	}
	out
}

pub fn print_report(report: &RunReport, format: OutputFormat, elapsed: Duration) -> serde_json::Result<()> {
	let rendered = match format {
		OutputFormat::Text => render_text(report, elapsed),
		OutputFormat::Json => render_json(report, elapsed)?,
	};
	let mut stdout = io::stdout().lock();
	let _ = writeln!(stdout, "{}", rendered.trim_end());
	Ok(())
}

pub fn print_error(err: &CliError, format: OutputFormat, elapsed: Duration) {
	match format {
		OutputFormat::Text => eprintln!("{} {err}", "error:".red().bold()),
		OutputFormat::Json => {
			let envelope = Envelope {
				ok: false,
				data: None,
				error: Some(ErrorBody {
					message: err.to_string(),
					exit_code: err.exit_code(),
				}),
				timings: timing(elapsed),
			};
			match serde_json::to_string_pretty(&envelope) {
				Ok(json) => println!("{json}"),
				Err(_) => eprintln!("error: {err}"),
			}
		}
	}
}
