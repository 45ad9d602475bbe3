//! Per linkage group, per trait peak detection.
//!
//! Rows are scanned in storage order. A linkage group ends when the group
//! label changes, so a group split into two runs is scanned as two groups.

use log::debug;

use crate::libs::error::{parse_lod, Result};
use crate::libs::matrix::{ensure_lod_table, LOD_COLUMN};
use crate::libs::table::Table;

/// Column indices of marker name, linkage group and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub marker: usize,
    pub group: usize,
    pub position: usize,
}

/// `[nr, group, position, locus, LOD]`
pub const MAPQTL_LAYOUT: Layout = Layout {
    marker: 3,
    group: 1,
    position: 2,
};

/// `[marker, group, position, trait1, trait2, ...]`
pub const WIDE_LAYOUT: Layout = Layout {
    marker: 0,
    group: 1,
    position: 2,
};

/// First trait column of a wide table
pub const WIDE_FIRST_TRAIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Peak {
    pub trait_name: String,
    pub group: String,
    pub marker: String,
    pub position: String,
    pub lod: f64,
    /// Data row index within the scanned table
    pub row: usize,
    /// LOD column index within the scanned table
    pub column: usize,
}

impl Peak {
    /// Same row content, regardless of where it was found
    fn same_row(&self, other: &Peak) -> bool {
        self.trait_name == other.trait_name
            && self.group == other.group
            && self.marker == other.marker
            && self.position == other.position
            && self.lod == other.lod
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenGroup<'a> {
    group: &'a str,
    max_lod: f64,
    peak_row: usize,
}

/// Scanning state: either no group is open, or one group is open with its
/// best row so far.
#[derive(Debug, Default)]
struct GroupScan<'a> {
    open: Option<OpenGroup<'a>>,
}

impl<'a> GroupScan<'a> {
    /// Feeds one row. Returns the group that just ended, if any.
    fn step(&mut self, row: usize, group: &'a str, lod: f64) -> Option<OpenGroup<'a>> {
        if let Some(open) = self.open.as_mut() {
            if open.group == group {
                // ties keep the first-seen row
                if lod > open.max_lod {
                    open.max_lod = lod;
                    open.peak_row = row;
                }
                return None;
            }
        }
        self.open.replace(OpenGroup {
            group,
            max_lod: lod,
            peak_row: row,
        })
    }

    fn finish(self) -> Option<OpenGroup<'a>> {
        self.open
    }
}

/// Finds the peaks of one LOD column.
///
/// At most one peak per linkage group is returned, and only when its LOD
/// strictly exceeds `threshold`. Blank LOD cells count as 0.
pub fn detect_column(
    table: &Table,
    layout: Layout,
    lod_col: usize,
    trait_name: &str,
    threshold: f64,
) -> Result<Vec<Peak>> {
    let mut peaks: Vec<Peak> = vec![];

    let emit = |closed: Option<OpenGroup<'_>>, peaks: &mut Vec<Peak>| {
        let Some(closed) = closed else {
            return;
        };
        if closed.max_lod <= threshold {
            return;
        }
        let row = &table.rows[closed.peak_row];
        let peak = Peak {
            trait_name: trait_name.to_string(),
            group: closed.group.to_string(),
            marker: row[layout.marker].clone(),
            position: row[layout.position].clone(),
            lod: closed.max_lod,
            row: closed.peak_row,
            column: lod_col,
        };
        if !peaks.iter().any(|p| p.same_row(&peak)) {
            peaks.push(peak);
        }
    };

    let mut scan = GroupScan::default();
    for (i, row) in table.rows.iter().enumerate() {
        let lod = parse_lod(trait_name, i + 1, &row[lod_col])?;
        let closed = scan.step(i, &row[layout.group], lod);
        emit(closed, &mut peaks);
    }
    emit(scan.finish(), &mut peaks);

    debug!("{}: {} peaks above {}", trait_name, peaks.len(), threshold);
    Ok(peaks)
}

/// Peaks of a single-trait MapQTL table, labelled with `label`.
pub fn detect_mapqtl(table: &Table, label: &str, threshold: f64) -> Result<Vec<Peak>> {
    ensure_lod_table(table, label)?;
    detect_column(table, MAPQTL_LAYOUT, LOD_COLUMN, label, threshold)
}

/// Peaks of every trait column of a wide table, trait by trait.
pub fn detect_wide(table: &Table, threshold: f64) -> Result<Vec<Peak>> {
    let mut peaks = vec![];
    for col in WIDE_FIRST_TRAIT..table.width() {
        let trait_name = table.header[col].trim();
        peaks.extend(detect_column(table, WIDE_LAYOUT, col, trait_name, threshold)?);
    }
    Ok(peaks)
}

/// Peak list as `[Trait, Group, Marker, LOD, Position]`.
pub fn peaks_to_table(peaks: &[Peak]) -> Table {
    let header = ["Trait", "Group", "Marker", "LOD", "Position"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = peaks
        .iter()
        .map(|p| {
            vec![
                p.trait_name.clone(),
                p.group.clone(),
                p.marker.clone(),
                p.lod.to_string(),
                p.position.clone(),
            ]
        })
        .collect();
    Table::new(header, rows)
}
