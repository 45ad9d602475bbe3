//! Genetic map extraction and linkage group ordering.

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::libs::error::{parse_position, Result};
use crate::libs::peak::WIDE_LAYOUT;
use crate::libs::table::Table;

/// Group label left out of every map report
pub const UNLINKED: &str = "U";

lazy_static! {
    // R/qtl pseudo-markers, e.g. `c1.loc12.5`
    static ref PSEUDO_MARKER: Regex = Regex::new(r"^c\d+\.loc[\d.]+").unwrap();
}

/// Whether a marker name denotes a real marker of the map
pub fn is_map_marker(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && !PSEUDO_MARKER.is_match(name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub name: String,
    pub group: String,
    pub position: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneticMap {
    pub markers: Vec<MapMarker>,
}

impl GeneticMap {
    /// The markers of a wide matrix, in storage order.
    ///
    /// Rows without a marker name (interpolated MapQTL positions) and R/qtl
    /// pseudo-markers are not part of the map.
    pub fn from_matrix(matrix: &Table) -> Self {
        let markers = matrix
            .rows
            .iter()
            .filter(|row| is_map_marker(&row[WIDE_LAYOUT.marker]))
            .map(|row| MapMarker {
                name: row[WIDE_LAYOUT.marker].clone(),
                group: row[WIDE_LAYOUT.group].clone(),
                position: row[WIDE_LAYOUT.position].clone(),
            })
            .collect();
        Self { markers }
    }

    pub fn to_table(&self) -> Table {
        Table::new(
            vec!["Locus".to_string(), "Group".to_string(), "Position".to_string()],
            self.markers
                .iter()
                .map(|m| vec![m.name.clone(), m.group.clone(), m.position.clone()])
                .collect(),
        )
    }

    /// Distinct group labels, first-seen order
    pub fn groups(&self) -> Vec<&str> {
        self.markers.iter().map(|m| m.group.as_str()).unique().collect()
    }

    /// Markers of one group, ordered by position
    pub fn group_markers(&self, group: &str) -> Result<Vec<&MapMarker>> {
        let markers: Vec<&MapMarker> = self.markers.iter().filter(|m| m.group == group).collect();
        order_markers(&markers)
    }
}

/// Sorts markers by numeric position.
///
/// Markers sharing a position keep their input order.
pub fn order_markers<'a>(markers: &[&'a MapMarker]) -> Result<Vec<&'a MapMarker>> {
    let mut keyed = markers
        .iter()
        .enumerate()
        .map(|(i, m)| Ok((parse_position(&m.name, i + 1, &m.position)?, *m)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, m)| m).collect())
}

/// Sort key of a linkage group label.
///
/// Every label of one report gets the same variant: numeric when all labels
/// are integers, lexical otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    Numeric(i64),
    Lexical(String),
}

pub fn group_keys(labels: &[&str]) -> Vec<GroupKey> {
    let numeric: Option<Vec<i64>> = labels.iter().map(|l| l.trim().parse().ok()).collect();
    match numeric {
        Some(nums) => nums.into_iter().map(GroupKey::Numeric).collect(),
        None => labels
            .iter()
            .map(|l| GroupKey::Lexical(l.to_string()))
            .collect(),
    }
}

/// Orders group labels for a report, dropping the `unlinked` group.
///
/// ```
/// let groups = mq2::libs::linkage::order_groups(&["10", "2", "U", "1"], "U");
/// assert_eq!(groups, vec!["1", "2", "10"]);
///
/// let groups = mq2::libs::linkage::order_groups(&["10", "2", "X"], "U");
/// assert_eq!(groups, vec!["10", "2", "X"]);
/// ```
pub fn order_groups<'a>(labels: &[&'a str], unlinked: &str) -> Vec<&'a str> {
    let kept: Vec<&'a str> = labels.iter().copied().filter(|l| *l != unlinked).collect();
    let keys = group_keys(&kept);

    let mut keyed: Vec<(GroupKey, &'a str)> = keys.into_iter().zip(kept).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, l)| l).collect()
}
