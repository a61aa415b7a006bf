use anyhow::Result;
use featurelod::ingest::{Content, FeatureDefinition, FeatureEncoding};
use std::{fmt::Write as _, io::Write, path::PathBuf};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// dataset you want to dump
	#[arg(required = true)]
	filename: String,

	/// YAML configuration file
	#[arg(long, short, value_name = "FILE")]
	config: Option<PathBuf>,

	/// stop after this many features
	#[arg(long, short, value_name = "int")]
	limit: Option<usize>,

	/// geometry encoding: wkt, wkb, blob or geometry
	/// defaults to the encoding of the format driver
	#[arg(long, short, value_name = "ENCODING", value_parser = parse_encoding, verbatim_doc_comment)]
	encoding: Option<FeatureEncoding>,
}

fn parse_encoding(value: &str) -> Result<FeatureEncoding, String> {
	FeatureEncoding::parse_str(value).ok_or_else(|| format!("unknown encoding '{value}'"))
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("dump {:?}", arguments.filename);

	let mut content = super::open_content(&arguments.filename, arguments.config.as_deref())?;
	if let Some(encoding) = arguments.encoding {
		content.set_feature_encoding(encoding);
	}
	write_dump(&mut content, arguments.limit, &mut std::io::stdout().lock())
}

fn write_dump(content: &mut Content, limit: Option<usize>, out: &mut impl Write) -> Result<()> {
	let mut count = 0;
	while content.move_to_next_feature_set()? {
		let feature_set = content.feature_set_name()?.to_string();
		while content.move_to_next_feature()? {
			if limit.is_some_and(|limit| count >= limit) {
				return Ok(());
			}
			let feature = content.get()?;
			writeln!(
				out,
				"{feature_set}\t{}\t{}\t{}\t{}",
				feature.name(),
				feature.raw_style().unwrap_or("-"),
				format_geometry(feature),
				format_attributes(feature)
			)?;
			count += 1;
		}
	}
	log::debug!("dumped {count} features");
	Ok(())
}

fn format_geometry(feature: &FeatureDefinition) -> String {
	match (feature.geometry_encoding(), feature.raw_geometry()) {
		(FeatureEncoding::Wkt, Some(raw)) => String::from_utf8_lossy(raw).into_owned(),
		(_, Some(raw)) => raw.iter().fold(String::with_capacity(raw.len() * 2), |mut hex, byte| {
			let _ = write!(hex, "{byte:02x}");
			hex
		}),
		(_, None) => feature.geometry().to_wkt(),
	}
}

fn format_attributes(feature: &FeatureDefinition) -> String {
	feature
		.attributes()
		.iter()
		.map(|(key, value)| format!("{key}={value}"))
		.collect::<Vec<_>>()
		.join(", ")
}
