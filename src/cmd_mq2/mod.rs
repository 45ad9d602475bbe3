//! Subcommand modules for the `mq2` binary.

use clap::{Arg, ArgMatches};

use mq2::libs::analysis::Settings;
use mq2::libs::error::parse_threshold;

pub mod csv;
pub mod mapchart;
pub mod mapqtl;

pub fn arg_lod() -> Arg {
    Arg::new("lod")
        .long("lod")
        .num_args(1)
        .default_value("3")
        .help("LOD threshold a peak must exceed to be a significant QTL")
}

pub fn arg_unlinked() -> Arg {
    Arg::new("unlinked")
        .long("unlinked")
        .num_args(1)
        .default_value(mq2::libs::linkage::UNLINKED)
        .help("Linkage group of unlinked markers, left out of the MapChart report")
}

pub fn arg_outdir() -> Arg {
    Arg::new("outdir")
        .long("outdir")
        .short('o')
        .num_args(1)
        .default_value(".")
        .help("Output directory")
}

/// Threshold and unlinked group from the command line
pub fn settings(args: &ArgMatches) -> anyhow::Result<Settings> {
    let threshold = parse_threshold(args.get_one::<String>("lod").unwrap())?;
    let mut settings = Settings::new(threshold);
    settings.unlinked = args.get_one::<String>("unlinked").unwrap().to_string();
    Ok(settings)
}
