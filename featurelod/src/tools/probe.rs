use anyhow::Result;
use featurelod::ingest::Content;
use std::{io::Write, path::PathBuf};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// dataset you want to probe
	/// supported formats are: *.csv, *.tsv, and with GDAL *.shp, *.kml, *.gpx, *.geojson, ...
	#[arg(required = true, verbatim_doc_comment)]
	filename: String,

	/// YAML configuration file
	#[arg(long, short, value_name = "FILE")]
	config: Option<PathBuf>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.filename);

	let content = super::open_content(&arguments.filename, arguments.config.as_deref())?;
	write_probe(&content, &mut std::io::stdout().lock())
}

fn write_probe(content: &Content, out: &mut impl Write) -> Result<()> {
	let stats = content.statistics();
	writeln!(out, "driver: {}", content.driver_name())?;
	writeln!(out, "feature sets:")?;
	for (index, layer) in stats.layers.iter().enumerate() {
		let name = content.layer_feature_set_name(index).unwrap_or_else(|| layer.name.clone());
		if layer.skipped {
			writeln!(out, "  {name}: skipped")?;
			continue;
		}
		writeln!(
			out,
			"  {name}: {} features, {} points, level {} ({:.3} m/px)",
			layer.feature_count, layer.point_count, layer.level_of_detail.level, layer.level_of_detail.min_resolution
		)?;
	}
	if stats.truncated {
		writeln!(out, "pre-scan stopped early, counts are incomplete")?;
	}
	if let Some(envelope) = &stats.envelope {
		writeln!(out, "bbox: {envelope:?}")?;
	}
	writeln!(
		out,
		"level of detail: {} ({:.3} m/px)",
		stats.level_of_detail.level, stats.level_of_detail.min_resolution
	)?;
	Ok(())
}
