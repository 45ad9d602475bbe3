//! Links detected QTLs back to the markers of the genetic map.

use log::info;

use crate::libs::count::COUNT_HEADER;
use crate::libs::error::{parse_position, Result};
use crate::libs::interval::QtlInterval;
use crate::libs::linkage::{GeneticMap, MapMarker};
use crate::libs::peak::Peak;
use crate::libs::table::Table;

/// The map marker of the peak's group nearest to the peak position.
///
/// On equal distance the marker met first in the map wins.
pub fn closest_marker<'a>(peak: &Peak, map: &'a GeneticMap) -> Result<Option<&'a MapMarker>> {
    let pos = parse_position(&peak.trait_name, peak.row + 1, &peak.position)?;

    let mut closest: Option<(f64, &MapMarker)> = None;
    for (i, marker) in map.markers.iter().enumerate() {
        if marker.group != peak.group {
            continue;
        }
        let diff = (pos - parse_position(&marker.name, i + 1, &marker.position)?).abs();
        if closest.map_or(true, |(best, _)| diff < best) {
            closest = Some((diff, marker));
        }
    }

    Ok(closest.map(|(_, m)| m))
}

/// Closest marker name of every peak, blank when the group has no marker
pub fn closest_markers(peaks: &[Peak], map: &GeneticMap) -> Result<Vec<String>> {
    peaks
        .iter()
        .map(|p| Ok(closest_marker(p, map)?.map(|m| m.name.clone()).unwrap_or_default()))
        .collect()
}

/// The map with, per marker, the number of QTLs whose closest marker it is.
pub fn map_with_qtls(map: &GeneticMap, closest: &[String]) -> Table {
    let mut table = map.to_table();
    table.header.push(COUNT_HEADER.to_string());

    let mut total = 0;
    for row in table.rows.iter_mut() {
        let cnt = closest.iter().filter(|c| **c == row[0]).count();
        total += cnt;
        row.push(cnt.to_string());
    }

    info!("- {} markers processed", table.len());
    info!("- {} QTLs located in the map", total);
    table
}

/// Peak list extended with closest and flanking markers.
///
/// `closest` and `qtls` are aligned with `peaks`.
pub fn qtls_with_markers(peaks: &[Peak], closest: &[String], qtls: &[QtlInterval]) -> Table {
    let header = [
        "Trait",
        "Group",
        "Marker",
        "LOD",
        "Position",
        "Closest marker",
        "Start marker",
        "Stop marker",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let rows = peaks
        .iter()
        .zip(closest)
        .zip(qtls)
        .map(|((p, c), q)| {
            let [start, stop] = q.flanking_markers();
            vec![
                p.trait_name.clone(),
                p.group.clone(),
                p.marker.clone(),
                p.lod.to_string(),
                p.position.clone(),
                c.clone(),
                start.to_string(),
                stop.to_string(),
            ]
        })
        .collect();

    Table::new(header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::interval::support_intervals;
    use crate::libs::peak::{detect_column, detect_wide, MAPQTL_LAYOUT};
    use crate::libs::table::table_from;

    // interpolated rows carry no locus name
    fn mqo() -> Table {
        table_from(
            &["Nr", "Group", "Position", "Locus", "LOD"],
            &[
                &["1", "1", "0.0", "m1", "0.5"],
                &["2", "1", "2.0", "", "1.5"],
                &["3", "1", "4.0", "", "3.5"],
                &["4", "1", "6.0", "m2", "3.0"],
                &["5", "1", "8.0", "m3", "0.2"],
            ],
        )
    }

    fn wide() -> Table {
        table_from(
            &["Locus", "Group", "Position", "T1"],
            &[
                &["m1", "1", "0.0", "0.5"],
                &["", "1", "2.0", "1.5"],
                &["", "1", "4.0", "3.5"],
                &["m2", "1", "6.0", "3.0"],
                &["m3", "1", "8.0", "0.2"],
            ],
        )
    }

    #[test]
    fn closest_marker_of_interpolated_peak() {
        let peaks = detect_column(&mqo(), MAPQTL_LAYOUT, 4, "T1", 3.0).unwrap();
        assert_eq!(peaks[0].marker, "");

        let map = GeneticMap::from_matrix(&wide());
        let closest = closest_markers(&peaks, &map).unwrap();
        assert_eq!(closest, vec!["m2"]);

        let counted = map_with_qtls(&map, &closest);
        assert_eq!(counted.header[3], "# QTLs");
        assert_eq!(counted.column(3).collect::<Vec<_>>(), vec!["0", "1", "0"]);
    }

    #[test]
    fn equal_distance_keeps_first() {
        let map = GeneticMap::from_matrix(&table_from(
            &["Locus", "Group", "Position", "T1"],
            &[&["a", "1", "0", "0"], &["b", "1", "4", "0"]],
        ));
        let peak = Peak {
            trait_name: "T1".to_string(),
            group: "1".to_string(),
            marker: "".to_string(),
            position: "2".to_string(),
            lod: 5.0,
            row: 0,
            column: 3,
        };
        assert_eq!(closest_marker(&peak, &map).unwrap().unwrap().name, "a");

        let other = Peak {
            group: "9".to_string(),
            ..peak
        };
        assert!(closest_marker(&other, &map).unwrap().is_none());
    }

    #[test]
    fn flanking_markers_added() {
        let matrix = wide();
        let peaks = detect_wide(&matrix, 3.0).unwrap();
        let qtls = support_intervals(&matrix, &peaks).unwrap();
        let map = GeneticMap::from_matrix(&matrix);
        let closest = closest_markers(&peaks, &map).unwrap();

        let table = qtls_with_markers(&peaks, &closest, &qtls);
        assert_eq!(table.header.len(), 8);
        assert_eq!(
            table.rows,
            vec![vec!["T1", "1", "", "3.5", "4.0", "m2", "NA", "m2"]]
        );
    }
}
