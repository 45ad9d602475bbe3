//! MapChart report: linkage groups, ordered markers and QTL intervals.
//!
//! ```text
//! group 1
//! m1  0.0
//! m2  5.0
//!
//! qtls
//! weight   0.0 5.0 5.0 5.0
//!
//! ```

use std::io::Write;

use crate::libs::error::Result;
use crate::libs::interval::{by_group, QtlInterval};
use crate::libs::linkage::{order_groups, GeneticMap};

#[derive(Debug, Clone, PartialEq)]
pub struct LinkageGroupReport {
    pub group: String,
    /// `(marker, position)` ordered by position
    pub markers: Vec<(String, String)>,
    pub qtls: Vec<QtlInterval>,
}

/// One report per map group, in report order, `unlinked` excluded.
pub fn build_reports(
    map: &GeneticMap,
    qtls: &[QtlInterval],
    unlinked: &str,
) -> Result<Vec<LinkageGroupReport>> {
    let intervals = by_group(qtls);

    let mut reports = vec![];
    for group in order_groups(&map.groups(), unlinked) {
        let markers: Vec<(String, String)> = map
            .group_markers(group)?
            .into_iter()
            .map(|m| (m.name.clone(), m.position.clone()))
            .collect();
        let qtls: Vec<QtlInterval> = intervals
            .get(group)
            .map(|v| v.iter().map(|q| (*q).clone()).collect())
            .unwrap_or_default();

        reports.push(LinkageGroupReport {
            group: group.to_string(),
            markers,
            qtls,
        });
    }

    Ok(reports)
}

pub fn write_mapchart<W: Write + ?Sized>(
    reports: &[LinkageGroupReport],
    writer: &mut W,
) -> std::io::Result<()> {
    for report in reports.iter().filter(|r| !r.markers.is_empty()) {
        writeln!(writer, "group {}", report.group)?;
        for (marker, position) in &report.markers {
            writeln!(writer, "{}  {}", marker, position)?;
        }
        if !report.qtls.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "qtls")?;
            for qtl in &report.qtls {
                writeln!(writer, "{}", qtl)?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn render(reports: &[LinkageGroupReport]) -> String {
    let mut out: Vec<u8> = vec![];
    // writing into a Vec never fails
    let _ = write_mapchart(reports, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
