extern crate clap;
use clap::*;
use log::Level;

mod cmd_mq2;

fn main() -> anyhow::Result<()> {
    let app = Command::new("mq2")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`mq2` - QTL peaks, support intervals and MapChart reports from LOD tables")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Gives more info about what's going on"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Outputs debugging information"),
        )
        .subcommand(cmd_mq2::mapqtl::make_subcommand())
        .subcommand(cmd_mq2::csv::make_subcommand())
        .subcommand(cmd_mq2::mapchart::make_subcommand())
        .after_help(
            r###"Subcommands:

* mapqtl   - One LOD table per trait, as written by MapQTL
* csv      - One wide marker-by-trait LOD matrix
* mapchart - MapChart report of an existing matrix

Outputs of `mapqtl` and `csv`:
    qtls.csv, qtls_matrix.csv, map.csv,
    map_with_qtls.csv, qtls_with_mk.csv, MapChart.map

"###,
        );

    let matches = app.get_matches();

    let level = if matches.get_flag("debug") {
        Level::Debug
    } else if matches.get_flag("verbose") {
        Level::Info
    } else {
        Level::Warn
    };
    simple_logger::init_with_level(level)?;

    match matches.subcommand() {
        Some(("mapqtl", sub_matches)) => cmd_mq2::mapqtl::execute(sub_matches),
        Some(("csv", sub_matches)) => cmd_mq2::csv::execute(sub_matches),
        Some(("mapchart", sub_matches)) => cmd_mq2::mapchart::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
