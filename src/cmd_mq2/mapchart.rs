use clap::*;
use std::io::Write;

use mq2::libs::analysis::mapchart_of;
use mq2::libs::table::Table;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("mapchart")
        .about("MapChart report of a marker-by-trait LOD matrix")
        .after_help(
            r###"
Writes only the MapChart report of a comma separated matrix, such as the
`qtls_matrix.csv` of an earlier run. A trailing `# QTLs` column is ignored.

Support intervals extend from the peak as long as the LOD stays within 2 LOD
units of the peak value.

Examples:
1. mq2 mapchart results/qtls_matrix.csv --lod 3

2. mq2 mapchart results/qtls_matrix.csv -o MapChart.map

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
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let settings = super::settings(args)?;
    let infile = args.get_one::<String>("infile").unwrap();

    //----------------------------
    // Operating
    //----------------------------
    let table = Table::read(mq2::reader(infile)?, b',', true, infile)?;
    let report = mapchart_of(&table, &settings)?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = mq2::writer(args.get_one::<String>("outfile").unwrap())?;
    writer.write_all(report.as_bytes())?;
    writer.flush()?;

    Ok(())
}
