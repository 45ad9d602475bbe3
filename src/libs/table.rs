use std::io::{Read, Write};

use crate::libs::error::{Mq2Error, Result};

/// A rectangular grid of text cells with a header row.
///
/// Cells stay as text; numeric columns are parsed where they are consumed so
/// that blank LOD cells and marker names can share one representation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Parses delimited text, cells trimmed.
    ///
    /// Blank lines are skipped. Rows shorter than the header are padded with
    /// blank cells, rows longer than the header are rejected. With `quoting`,
    /// double quoted cells may hold the delimiter.
    ///
    /// ```
    /// use mq2::libs::table::Table;
    /// let text = "\"Marker\",\"Chr\",\"Pos\",\"T1\"\nm1,1,0.0,2.5\n\nm2,1,5.0\n";
    /// let table = Table::read(text.as_bytes(), b',', true, "wide").unwrap();
    /// assert_eq!(table.header, vec!["Marker", "Chr", "Pos", "T1"]);
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.rows[1][3], "");
    /// ```
    pub fn read<R: Read>(reader: R, delimiter: u8, quoting: bool, label: &str) -> Result<Self> {
        let malformed = |reason: String| Mq2Error::MalformedTable {
            label: label.to_string(),
            reason,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .quoting(quoting)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut lines = vec![];
        for record in rdr.records() {
            let record = record.map_err(|e| malformed(e.to_string()))?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            lines.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }

        let mut lines = lines.into_iter();
        let header = lines
            .next()
            .ok_or_else(|| malformed("no header row".to_string()))?;

        let width = header.len();
        let mut rows = vec![];
        for (i, mut row) in lines.enumerate() {
            if row.len() > width {
                return Err(malformed(format!(
                    "row {} has {} cells, header has {}",
                    i + 1,
                    row.len(),
                    width
                )));
            }
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { header, rows })
    }

    /// Number of data rows, header excluded
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Fails unless the table has at least `min` columns.
    pub fn require_width(&self, min: usize, label: &str) -> Result<()> {
        if self.width() < min {
            return Err(Mq2Error::MalformedTable {
                label: label.to_string(),
                reason: format!("expected at least {} columns, found {}", min, self.width()),
            });
        }
        Ok(())
    }

    /// Cells of one column, header excluded
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[idx].as_str())
    }

    /// Writes comma separated rows, header first, cells trimmed.
    ///
    /// Cells holding a comma or a quote are quoted.
    pub fn write_csv<W: Write + ?Sized>(&self, writer: &mut W) -> csv::Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b',')
            .from_writer(writer);
        for row in std::iter::once(&self.header).chain(self.rows.iter()) {
            wtr.write_record(row.iter().map(|c| c.trim()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Builds a table from string literals; used by unit tests and doc examples.
pub fn table_from(header: &[&str], rows: &[&[&str]]) -> Table {
    Table::new(
        header.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_tab_separated() {
        let text = "Nr\tGroup\tPosition\tLocus\tLOD\n1\t1\t0.0\tm1\t0.5\r\n2\t1\t2.0\t\t0.7\n";
        let table = Table::read(text.as_bytes(), b'\t', false, "mqo").unwrap();
        assert_eq!(table.width(), 5);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][4], "0.5");
        assert_eq!(table.rows[1][3], "");
        assert_eq!(table.column(2).collect::<Vec<_>>(), vec!["0.0", "2.0"]);
    }

    #[test]
    fn read_rejects_long_rows() {
        let text = "a,b\n1,2,3\n";
        let err = Table::read(text.as_bytes(), b',', false, "bad").unwrap_err();
        assert!(matches!(err, Mq2Error::MalformedTable { .. }));
    }

    #[test]
    fn read_rejects_empty_input() {
        let err = Table::read("\n\n".as_bytes(), b',', false, "empty").unwrap_err();
        assert!(matches!(err, Mq2Error::MalformedTable { .. }));
    }

    #[test]
    fn read_quoted_delimiter() {
        let text = "\"\",\"chr\",\"pos\",\"T1\"\n\"m,1\",\"1\",0,4.0\n";
        let table = Table::read(text.as_bytes(), b',', true, "wide").unwrap();
        assert_eq!(table.header, vec!["", "chr", "pos", "T1"]);
        assert_eq!(table.rows, vec![vec!["m,1", "1", "0", "4.0"]]);
    }

    #[test]
    fn written_commas_read_back() {
        let table = table_from(
            &["Locus", "Group", "Position", "a,b", "say \"hi\""],
            &[&["m1", "1", "0", "4", "1.5"]],
        );
        let mut out = vec![];
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out.clone()).unwrap(),
            "Locus,Group,Position,\"a,b\",\"say \"\"hi\"\"\"\nm1,1,0,4,1.5\n"
        );

        let back = Table::read(out.as_slice(), b',', true, "round").unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn write_trims_cells() {
        let table = table_from(&["a", " b"], &[&["1 ", "2"]]);
        let mut out = vec![];
        table.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\n1,2\n");
    }
}
