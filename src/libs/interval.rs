//! LOD-drop support intervals around detected peaks.

use indexmap::IndexMap;
use std::fmt;

use crate::libs::error::{parse_lod, parse_position, Result};
use crate::libs::peak::{Peak, WIDE_LAYOUT};
use crate::libs::table::Table;

/// LOD units below the peak still inside the support interval.
///
/// Independent of the significance threshold.
pub const LOD_DROP: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct QtlInterval {
    pub trait_name: String,
    pub group: String,
    pub start_marker: String,
    pub start_position: String,
    pub peak_marker: String,
    pub peak_position: String,
    pub stop_marker: String,
    pub stop_position: String,
}

impl QtlInterval {
    /// Start and stop markers, blank names reported as `NA`
    pub fn flanking_markers(&self) -> [&str; 2] {
        [or_na(&self.start_marker), or_na(&self.stop_marker)]
    }
}

fn or_na(name: &str) -> &str {
    if name.trim().is_empty() {
        "NA"
    } else {
        name
    }
}

/// The MapChart `qtls` line: `trait   start peak_start peak_stop stop`
impl fmt::Display for QtlInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}   {} {} {} {}",
            self.trait_name,
            self.start_position,
            self.peak_position,
            self.peak_position,
            self.stop_position
        )
    }
}

/// Rows of the peak's group run, ordered by position.
///
/// The run is the block of adjacent rows sharing the peak's group label.
/// Rows sharing a position keep their storage order.
fn group_run(matrix: &Table, peak: &Peak) -> Result<Vec<usize>> {
    let in_group = |i: &usize| matrix.rows[*i][WIDE_LAYOUT.group] == peak.group;
    let first = (0..peak.row)
        .rev()
        .take_while(in_group)
        .last()
        .unwrap_or(peak.row);
    let last = (peak.row + 1..matrix.len())
        .take_while(in_group)
        .last()
        .unwrap_or(peak.row);

    let mut keyed = (first..=last)
        .map(|i| {
            let cell = &matrix.rows[i][WIDE_LAYOUT.position];
            Ok((parse_position(&peak.trait_name, i + 1, cell)?, i))
        })
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, i)| i).collect())
}

/// Last row reached from `run[at]` stepping outward along `run` while the
/// LOD has not dropped by more than `drop`.
fn walk(
    matrix: &Table,
    run: &[usize],
    at: usize,
    peak: &Peak,
    drop: f64,
    backward: bool,
) -> Result<usize> {
    let floor = peak.lod - drop;
    let mut bound = at;
    loop {
        let next = if backward {
            match bound.checked_sub(1) {
                Some(n) => n,
                None => break,
            }
        } else {
            bound + 1
        };
        let Some(&row) = run.get(next) else {
            break;
        };
        let lod = parse_lod(&peak.trait_name, row + 1, &matrix.rows[row][peak.column])?;
        if lod < floor {
            break;
        }
        bound = next;
    }
    Ok(run[bound])
}

/// Widest contiguous run of markers around `peak` whose LOD stays within
/// `LOD_DROP` of the peak LOD.
///
/// `matrix` is a wide table; `peak.row` and `peak.column` index into it.
/// Markers are walked in position order within the peak's group. When no
/// neighbour qualifies on a side, that side collapses onto the peak row.
pub fn support_interval(matrix: &Table, peak: &Peak) -> Result<QtlInterval> {
    let run = group_run(matrix, peak)?;
    let at = run.iter().position(|&i| i == peak.row).unwrap_or_default();
    let start = walk(matrix, &run, at, peak, LOD_DROP, true)?;
    let stop = walk(matrix, &run, at, peak, LOD_DROP, false)?;

    let cell = |row: usize, idx: usize| matrix.rows[row][idx].clone();
    Ok(QtlInterval {
        trait_name: peak.trait_name.clone(),
        group: peak.group.clone(),
        start_marker: cell(start, WIDE_LAYOUT.marker),
        start_position: cell(start, WIDE_LAYOUT.position),
        peak_marker: cell(peak.row, WIDE_LAYOUT.marker),
        peak_position: cell(peak.row, WIDE_LAYOUT.position),
        stop_marker: cell(stop, WIDE_LAYOUT.marker),
        stop_position: cell(stop, WIDE_LAYOUT.position),
    })
}

/// Support intervals of all peaks, in peak order.
pub fn support_intervals(matrix: &Table, peaks: &[Peak]) -> Result<Vec<QtlInterval>> {
    peaks.iter().map(|p| support_interval(matrix, p)).collect()
}

/// Intervals keyed by linkage group in first-seen order.
pub fn by_group(qtls: &[QtlInterval]) -> IndexMap<&str, Vec<&QtlInterval>> {
    let mut groups: IndexMap<&str, Vec<&QtlInterval>> = IndexMap::new();
    for qtl in qtls {
        groups.entry(qtl.group.as_str()).or_default().push(qtl);
    }
    groups
}
