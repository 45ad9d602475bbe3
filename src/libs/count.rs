use crate::libs::error::{Mq2Error, Result};
use crate::libs::peak::WIDE_FIRST_TRAIT;
use crate::libs::table::Table;

pub const COUNT_HEADER: &str = "# QTLs";

/// Drops a trailing `# QTLs` column, if present.
pub fn strip_count_column(table: &Table) -> Table {
    if table.header.last().map(|h| h.trim()) != Some(COUNT_HEADER) {
        return table.clone();
    }
    let width = table.width() - 1;
    Table::new(
        table.header[..width].to_vec(),
        table.rows.iter().map(|row| row[..width].to_vec()).collect(),
    )
}

/// Appends to every row of a wide matrix the number of traits whose LOD
/// exceeds `threshold`.
///
/// An already appended count column is replaced, so annotating twice gives
/// the same table.
///
/// ```
/// use mq2::libs::table::table_from;
/// let matrix = table_from(
///     &["Marker", "Chr", "Pos", "T1", "T2"],
///     &[&["m1", "1", "0", "3.5", "4.0"], &["m2", "1", "5", "", "1.0"]],
/// );
/// let counted = mq2::libs::count::annotate(&matrix, 3.0).unwrap();
/// assert_eq!(counted.header[5], "# QTLs");
/// assert_eq!(counted.rows[0][5], "2");
/// assert_eq!(counted.rows[1][5], "0");
/// ```
pub fn annotate(matrix: &Table, threshold: f64) -> Result<Table> {
    let mut table = strip_count_column(matrix);
    table.header.push(COUNT_HEADER.to_string());

    for (i, row) in table.rows.iter_mut().enumerate() {
        let mut cnt = 0;
        for cell in row.iter().skip(WIDE_FIRST_TRAIT) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let lod = cell.parse::<f64>().map_err(|_| Mq2Error::InvalidNumber {
                label: COUNT_HEADER.to_string(),
                row: i + 1,
                value: cell.to_string(),
            })?;
            if lod > threshold {
                cnt += 1;
            }
        }
        row.push(cnt.to_string());
    }

    Ok(table)
}
