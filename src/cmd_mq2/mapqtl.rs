use clap::*;
use log::{debug, info};
use std::path::{Path, PathBuf};

use mq2::libs::analysis::{analyse_traits, session_id, trait_label};
use mq2::libs::table::Table;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("mapqtl")
        .about("QTLs from per-trait MapQTL LOD tables")
        .after_help(
            r###"
Consolidates one tab separated LOD table per trait into a marker-by-trait
matrix, finds one QTL peak per linkage group and trait above the LOD
threshold, and writes the peak list, the matrix, the genetic map and the
MapChart report.

Input tables have the columns:
    Nr  Group  Position  Locus  LOD  ...

The trait name is taken from the file name, `Session <id> (<method>)_<trait>.mqo`.
Files are processed in path order. All tables must share the same map;
nothing is written when one of them differs.

Examples:
1. All traits of session 2:
   mq2 mapqtl mqo/*.mqo --session 2 --lod 3 -o results

2. A single trait:
   mq2 mapqtl "Session 1 (IM)_height.mqo"

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Input MapQTL file(s) to process"),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .num_args(1)
                .help("Only process the files of this MapQTL session"),
        )
        .arg(super::arg_lod())
        .arg(super::arg_unlinked())
        .arg(super::arg_outdir())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let settings = super::settings(args)?;
    let outdir = args.get_one::<String>("outdir").unwrap();
    let session = args.get_one::<String>("session");

    let mut infiles: Vec<PathBuf> = args
        .get_many::<String>("infiles")
        .unwrap()
        .map(PathBuf::from)
        .collect();
    infiles.sort();

    if let Some(session) = session {
        infiles.retain(|p| session_id(p).as_deref() == Some(session.as_str()));
        if infiles.is_empty() {
            anyhow::bail!("No file corresponds to the session \"{}\"", session);
        }
    }

    //----------------------------
    // Operating
    //----------------------------
    let mut sources: Vec<(String, Table)> = vec![];
    for infile in &infiles {
        let label = trait_label(infile);
        debug!("Read {} as trait {}", infile.display(), label);

        let reader = mq2::reader(&infile.to_string_lossy())?;
        let table = Table::read(reader, b'\t', false, &label)?;
        sources.push((label, table));
    }
    info!("- {} MapQTL files read", sources.len());

    let analysis = analyse_traits(&sources, &settings)?;

    //----------------------------
    // Output
    //----------------------------
    analysis.write_to(Path::new(outdir))?;

    Ok(())
}
