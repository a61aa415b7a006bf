mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Show layers, feature counts and the level of detail of a dataset
	Probe(tools::probe::Subcommand),

	/// Print every flattened feature of a dataset
	Dump(tools::dump::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
	match &cli.command {
		Commands::Probe(arguments) => tools::probe::run(arguments),
		Commands::Dump(arguments) => tools::dump::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use clap::Parser;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{cli:?}");
		run(&cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["featurelod"]).unwrap_err().to_string();
		assert!(err.starts_with("Ingests vector geodata into a flat stream of WGS84 features"));
		assert!(err.contains("\nUsage: featurelod [OPTIONS] <COMMAND>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["featurelod", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("featurelod "));
	}

	#[test]
	fn probe_subcommand() {
		let output = run_command(vec!["featurelod", "probe"]).unwrap_err().to_string();
		assert!(output.starts_with("Show layers, feature counts and the level of detail of a dataset"));
	}

	#[test]
	fn dump_subcommand() {
		let output = run_command(vec!["featurelod", "dump"]).unwrap_err().to_string();
		assert!(output.starts_with("Print every flattened feature of a dataset"));
	}

	#[test]
	fn unknown_encoding() {
		let err = run_command(vec!["featurelod", "dump", "a.csv", "--encoding", "gml"])
			.unwrap_err()
			.to_string();
		assert!(err.contains("unknown encoding 'gml'"));
	}
}
