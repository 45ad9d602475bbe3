use clap::*;
use std::path::Path;

use mq2::libs::analysis::analyse_wide;
use mq2::libs::table::Table;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("csv")
        .about("QTLs from a marker-by-trait LOD matrix")
        .after_help(
            r###"
Finds one QTL peak per linkage group and trait above the LOD threshold in a
comma separated matrix, and writes the peak list, the matrix with the number
of significant traits per marker, the genetic map and the MapChart report.

The matrix has the columns:
    Marker,Group,Position,trait1,trait2,...

Quoted cells may hold commas. R/qtl pseudo-markers (`c1.loc12`) are kept for
peak detection but left out of the genetic map.

Examples:
1. Default threshold of 3:
   mq2 csv scanone.csv -o results

2. Stricter threshold, unlinked markers in group `0`:
   mq2 csv scanone.csv --lod 4.5 --unlinked 0

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input matrix. [stdin] for screen"),
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
    let infile = args.get_one::<String>("infile").unwrap();
    let outdir = args.get_one::<String>("outdir").unwrap();

    //----------------------------
    // Operating
    //----------------------------
    let table = Table::read(mq2::reader(infile)?, b',', true, infile)?;
    let analysis = analyse_wide(&table, &settings)?;

    //----------------------------
    // Output
    //----------------------------
    analysis.write_to(Path::new(outdir))?;

    Ok(())
}
