use std::time::Instant;

use clap::Parser;
use rollcall_cli::cli::Cli;
use rollcall_cli::config::Settings;
use rollcall_cli::error::CliError;
use rollcall_cli::{logging, output, run};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);
	let started = Instant::now();

	let result = async {
		let settings = Settings::resolve(&cli)?;
		let report = run::execute(settings).await?;
		output::print_report(&report, cli.format, started.elapsed())?;
		Ok::<_, CliError>(())
	}
	.await;

	if let Err(err) = result {
		error!(target = "rollcall", error = %err, "run failed");
		output::print_error(&err, cli.format, started.elapsed());
		std::process::exit(err.exit_code());
	}
}
