use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;

use crate::output::OutputFormat;

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(about = "Walk a mobile app's contact list and message or remove each contact")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Config file: JSON, or legacy key=value with a .properties extension
	#[arg(short, long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Automation server endpoint (overrides the config file)
	#[arg(long, value_name = "URL")]
	pub server: Option<String>,

	/// Never remove contacts, whatever the config says
	#[arg(long)]
	pub no_removal: bool,

	/// Start from the contact list instead of navigating there
	#[arg(long)]
	pub skip_bootstrap: bool,

	/// Summary format
	#[arg(short = 'f', long, value_enum, default_value = "text")]
	pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flags_parse() {
		let cli = Cli::try_parse_from([
			"rollcall",
			"-vv",
			"--config",
			"run.json",
			"--server",
			"http://10.0.0.2:4723/",
			"--no-removal",
			"-f",
			"json",
		])
		.unwrap();
		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.config, Some(PathBuf::from("run.json")));
		assert!(cli.no_removal);
		assert!(!cli.skip_bootstrap);
		assert_eq!(cli.format, OutputFormat::Json);
	}

	#[test]
	fn text_is_the_default_format() {
		let cli = Cli::try_parse_from(["rollcall"]).unwrap();
		assert_eq!(cli.format, OutputFormat::Text);
	}
}
