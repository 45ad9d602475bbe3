//! End-to-end runs: from LOD tables to every output table and the MapChart
//! report, all built in memory before anything is written.

use anyhow::Context;
use log::{debug, info, warn};
use std::io::Write;
use std::path::Path;

use crate::libs::annotate::{closest_markers, map_with_qtls, qtls_with_markers};
use crate::libs::count::{annotate, strip_count_column};
use crate::libs::error::{Mq2Error, Result};
use crate::libs::interval::support_intervals;
use crate::libs::linkage::{GeneticMap, UNLINKED};
use crate::libs::mapchart::{build_reports, render};
use crate::libs::matrix::consolidate_all;
use crate::libs::peak::{detect_mapqtl, detect_wide, peaks_to_table, Peak, WIDE_FIRST_TRAIT};
use crate::libs::table::Table;

pub const QTLS_FILE: &str = "qtls.csv";
pub const MATRIX_FILE: &str = "qtls_matrix.csv";
pub const MAP_FILE: &str = "map.csv";
pub const MAP_QTLS_FILE: &str = "map_with_qtls.csv";
pub const QTLS_MK_FILE: &str = "qtls_with_mk.csv";
pub const MAPCHART_FILE: &str = "MapChart.map";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub threshold: f64,
    pub unlinked: String,
}

impl Settings {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            unlinked: UNLINKED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Peak list
    pub qtls: Table,
    /// Consolidated matrix with the `# QTLs` column
    pub matrix: Table,
    pub map: Table,
    pub map_with_qtls: Table,
    pub qtls_with_markers: Table,
    pub mapchart: String,
}

impl Analysis {
    /// Writes every output into `outdir`, creating it when needed.
    pub fn write_to(&self, outdir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(outdir)
            .with_context(|| format!("could not create {}", outdir.display()))?;

        let tables = [
            (QTLS_FILE, &self.qtls),
            (MATRIX_FILE, &self.matrix),
            (MAP_FILE, &self.map),
            (MAP_QTLS_FILE, &self.map_with_qtls),
            (QTLS_MK_FILE, &self.qtls_with_markers),
        ];
        for (name, table) in tables {
            let path = outdir.join(name);
            let mut writer = crate::writer(&path.to_string_lossy())?;
            table.write_csv(&mut writer)?;
            writer.flush()?;
            info!("Wrote {}", path.display());
        }

        let path = outdir.join(MAPCHART_FILE);
        let mut writer = crate::writer(&path.to_string_lossy())?;
        writer.write_all(self.mapchart.as_bytes())?;
        writer.flush()?;
        info!("Wrote {}", path.display());

        Ok(())
    }
}

/// Trait name of a MapQTL output file.
///
/// MapQTL names its files `Session <id> (<method>)_<trait>.mqo`; other names
/// fall back to the file stem.
///
/// ```
/// use std::path::Path;
/// use mq2::libs::analysis::trait_label;
/// assert_eq!(trait_label(Path::new("out/Session 2 (IM)_height.mqo")), "height");
/// assert_eq!(trait_label(Path::new("weight.v2.mqo")), "weight.v2");
/// ```
pub fn trait_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match name.split_once(")_") {
        Some((_, rest)) => rest.to_string(),
        None => name,
    };
    match name.strip_suffix(".mqo") {
        Some(stem) => stem.to_string(),
        None => Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(name),
    }
}

/// Session identifier of a MapQTL output file
pub fn session_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    if !name.starts_with("Session ") {
        return None;
    }
    name.split_whitespace().nth(1).map(|s| s.to_string())
}

/// Runs over single-trait tables, one `(label, table)` pair per trait.
///
/// The order of `sources` is the column order of the matrix and the order of
/// the peak list. Any inconsistent or non-LOD table fails the whole run.
pub fn analyse_traits(sources: &[(String, Table)], settings: &Settings) -> Result<Analysis> {
    if sources.is_empty() {
        return Err(Mq2Error::MalformedTable {
            label: "input".to_string(),
            reason: "no trait table given".to_string(),
        });
    }

    debug!("Consolidate {} trait tables", sources.len());
    let matrix = consolidate_all(sources.iter().map(|(l, t)| (l.as_str(), t)))?;
    info!("- {} traits consolidated", matrix.traits().len());

    // each source's LOD column lands at its own matrix column
    let mut peaks = vec![];
    for (col, (label, table)) in (WIDE_FIRST_TRAIT..).zip(sources) {
        let found = detect_mapqtl(table, label, settings.threshold)?;
        peaks.extend(found.into_iter().map(|peak| Peak { column: col, ..peak }));
    }

    finish(matrix.to_table(), peaks, settings)
}

/// Runs over one wide table `[marker, group, position, trait1, ...]`.
///
/// A trailing `# QTLs` column from an earlier run is ignored.
pub fn analyse_wide(table: &Table, settings: &Settings) -> Result<Analysis> {
    table.require_width(WIDE_FIRST_TRAIT, "matrix")?;
    let wide = strip_count_column(table);
    let peaks = detect_wide(&wide, settings.threshold)?;
    finish(wide, peaks, settings)
}

/// Only the MapChart report of a wide table.
pub fn mapchart_of(table: &Table, settings: &Settings) -> Result<String> {
    table.require_width(WIDE_FIRST_TRAIT, "matrix")?;
    let wide = strip_count_column(table);
    let peaks = detect_wide(&wide, settings.threshold)?;
    let qtls = support_intervals(&wide, &peaks)?;
    let map = GeneticMap::from_matrix(&wide);
    Ok(render(&build_reports(&map, &qtls, &settings.unlinked)?))
}

fn finish(wide: Table, peaks: Vec<Peak>, settings: &Settings) -> Result<Analysis> {
    if peaks.is_empty() {
        warn!("No QTL found above LOD {}", settings.threshold);
    } else {
        info!("- {} QTLs found above LOD {}", peaks.len(), settings.threshold);
    }

    debug!("Compute support intervals");
    let qtls = support_intervals(&wide, &peaks)?;

    debug!("Append the closest marker to the peaks");
    let map = GeneticMap::from_matrix(&wide);
    let closest = closest_markers(&peaks, &map)?;
    info!("- {} markers found in the map", map.markers.len());

    debug!("Generate the MapChart report");
    let reports = build_reports(&map, &qtls, &settings.unlinked)?;

    Ok(Analysis {
        qtls: peaks_to_table(&peaks),
        matrix: annotate(&wide, settings.threshold)?,
        map: map.to_table(),
        map_with_qtls: map_with_qtls(&map, &closest),
        qtls_with_markers: qtls_with_markers(&peaks, &closest, &qtls),
        mapchart: render(&reports),
    })
}
