//! Folding per-trait LOD tables into one marker-by-trait matrix.
//!
//! A per-trait table (MapQTL `.mqo` layout) has the columns
//! `[nr, group, position, locus, LOD, ...]`. Every table folded into the same
//! matrix must carry an identical `[nr, group, position, locus]` block,
//! header included.

use log::debug;
use xxhash_rust::xxh3::Xxh3;

use crate::libs::error::{Mq2Error, Result};
use crate::libs::table::Table;

/// Number of leading columns shared by every per-trait table
pub const KEY_COLUMNS: usize = 4;
/// Index of the LOD column in a per-trait table
pub const LOD_COLUMN: usize = 4;
/// Header expected on the LOD column
pub const LOD_HEADER: &str = "LOD";

/// Fails with `UnsupportedAnalysisType` unless column 4 is headed `LOD`.
pub fn ensure_lod_table(table: &Table, label: &str) -> Result<()> {
    table.require_width(LOD_COLUMN + 1, label)?;
    if table.header[LOD_COLUMN].trim() != LOD_HEADER {
        return Err(Mq2Error::UnsupportedAnalysisType {
            label: label.to_string(),
        });
    }
    Ok(())
}

/// Accumulator of consolidated LOD columns.
#[derive(Debug, Clone, Default)]
pub struct QtlMatrix {
    /// Key block, stored row-major with the header as row 0
    keys: Vec<Vec<String>>,
    key_hash: u64,
    traits: Vec<String>,
    /// One column of LOD cells per trait, header excluded
    lods: Vec<Vec<String>>,
}

fn key_rows(table: &Table) -> impl Iterator<Item = &[String]> + '_ {
    std::iter::once(&table.header)
        .chain(table.rows.iter())
        .map(|row| &row[..KEY_COLUMNS])
}

fn hash_keys(table: &Table) -> u64 {
    let mut hasher = Xxh3::new();
    let mut rows = 0u64;
    for row in key_rows(table) {
        for cell in row {
            hasher.update(cell.as_bytes());
            hasher.update(&[0x1f]);
        }
        hasher.update(&[0x1e]);
        rows += 1;
    }
    hasher.update(&rows.to_le_bytes());
    hasher.digest()
}

impl QtlMatrix {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn traits(&self) -> &[String] {
        &self.traits
    }

    /// Folds one per-trait table into the accumulator.
    ///
    /// The first table seeds the key block. Later tables are matched against
    /// it by the xxh3 digest of their key block alone; the cells are only
    /// walked after a mismatch, to log the first differing row. Any mismatch
    /// makes the whole consolidation unusable and `MatrixMismatch` names the
    /// offending `label`.
    pub fn consolidate(mut self, table: &Table, label: &str) -> Result<Self> {
        ensure_lod_table(table, label)?;

        let hash = hash_keys(table);
        if self.is_empty() {
            self.keys = key_rows(table).map(|row| row.to_vec()).collect();
            self.key_hash = hash;
        } else if hash != self.key_hash {
            let row = self
                .keys
                .iter()
                .zip(key_rows(table))
                .position(|(a, b)| a.as_slice() != b)
                .unwrap_or_else(|| self.keys.len().min(table.len() + 1));
            debug!("{}: map differs from the first table at row {}", label, row);
            return Err(Mq2Error::MatrixMismatch {
                label: label.to_string(),
            });
        }

        self.traits.push(label.to_string());
        self.lods
            .push(table.column(LOD_COLUMN).map(|s| s.to_string()).collect());

        Ok(self)
    }

    /// Exports the wide matrix `[locus, group, position, trait1, ...]`.
    ///
    /// The header keeps the source's locus/group/position headings followed
    /// by the trait labels.
    pub fn to_table(&self) -> Table {
        let Some(head) = self.keys.first() else {
            return Table::default();
        };

        let mut header = vec![head[3].clone(), head[1].clone(), head[2].clone()];
        header.extend(self.traits.iter().cloned());

        let rows = self.keys[1..]
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let mut row = vec![key[3].clone(), key[1].clone(), key[2].clone()];
                row.extend(self.lods.iter().map(|col| col[i].clone()));
                row
            })
            .collect();

        Table::new(header, rows)
    }
}

/// Consolidates labelled tables in the given order.
pub fn consolidate_all<'a, I>(tables: I) -> Result<QtlMatrix>
where
    I: IntoIterator<Item = (&'a str, &'a Table)>,
{
    tables
        .into_iter()
        .try_fold(QtlMatrix::new(), |acc, (label, table)| {
            acc.consolidate(table, label)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::table::table_from;

    fn mqo(lods: &[&str]) -> Table {
        let keys = [
            ["1", "2", "0.0", "m1"],
            ["2", "2", "5.0", "m2"],
            ["3", "2", "10.0", "m3"],
            ["4", "2", "15.0", "m4"],
        ];
        let rows: Vec<Vec<&str>> = keys
            .iter()
            .zip(lods.iter())
            .map(|(k, l)| vec![k[0], k[1], k[2], k[3], *l])
            .collect();
        let rows: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
        table_from(&["Nr", "Group", "Position", "Locus", "LOD"], &rows)
    }

    #[test]
    fn consolidate_keeps_input_order() {
        let a = mqo(&["1.0", "2.5", "4.1", "1.2"]);
        let b = mqo(&["0.1", "0.2", "0.3", "0.4"]);
        let matrix = consolidate_all([("b_trait", &a), ("a_trait", &b)]).unwrap();
        assert_eq!(matrix.traits(), &["b_trait", "a_trait"]);

        let table = matrix.to_table();
        assert_eq!(
            table.header,
            vec!["Locus", "Group", "Position", "b_trait", "a_trait"]
        );
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[2], vec!["m3", "2", "10.0", "4.1", "0.3"]);
    }

    #[test]
    fn consolidate_rejects_other_map() {
        let a = mqo(&["1.0", "2.5", "4.1", "1.2"]);
        let mut b = mqo(&["1.0", "2.5", "4.1", "1.2"]);
        b.rows[3][2] = "16.0".to_string();
        let c = mqo(&["1.0", "2.5", "4.1", "1.2"]);

        let err = consolidate_all([("a", &a), ("b", &b), ("c", &c)]).unwrap_err();
        assert_eq!(
            err,
            Mq2Error::MatrixMismatch {
                label: "b".to_string()
            }
        );
    }

    #[test]
    fn consolidate_rejects_shorter_map() {
        let a = mqo(&["1.0", "2.5", "4.1", "1.2"]);
        let mut b = mqo(&["1.0", "2.5", "4.1", "1.2"]);
        b.rows.pop();

        let err = consolidate_all([("a", &a), ("b", &b)]).unwrap_err();
        assert!(matches!(err, Mq2Error::MatrixMismatch { label } if label == "b"));
    }

    #[test]
    fn key_digest_keeps_cell_boundaries() {
        let a = mqo(&["1.0", "2.5", "4.1", "1.2"]);
        let mut b = mqo(&["0.1", "0.2", "0.3", "0.4"]);
        assert_eq!(hash_keys(&a), hash_keys(&b));

        // same characters, shifted across the position/locus boundary
        b.rows[0][2] = "0.0m".to_string();
        b.rows[0][3] = "1".to_string();
        assert_ne!(hash_keys(&a), hash_keys(&b));

        let err = consolidate_all([("a", &a), ("b", &b)]).unwrap_err();
        assert!(matches!(err, Mq2Error::MatrixMismatch { label } if label == "b"));
    }

    #[test]
    fn consolidate_rejects_non_lod() {
        let mut a = mqo(&["1.0", "2.5", "4.1", "1.2"]);
        a.header[4] = "K*".to_string();

        let err = QtlMatrix::new().consolidate(&a, "kw").unwrap_err();
        assert!(matches!(err, Mq2Error::UnsupportedAnalysisType { label } if label == "kw"));
    }
}
