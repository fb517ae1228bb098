//! Table Model
//! Rectangular-ish table of text cells with a separate header row.

/// One row of string cells.
pub type Row = Vec<String>;

/// A loaded table: the header row plus the data records.
///
/// Records may be shorter than the header; indexing past the end of a
/// record yields `None` instead of panicking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Row,
    pub records: Vec<Row>,
}

impl Table {
    pub fn new(header: Row, records: Vec<Row>) -> Self {
        Self { header, records }
    }

    /// Number of data records (header excluded).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cell at `(record, col)`, `None` when either index is out of range.
    pub fn cell(&self, record: usize, col: usize) -> Option<&str> {
        self.records
            .get(record)
            .and_then(|row| row.get(col))
            .map(String::as_str)
    }

    /// Width of the header row.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Keep the header, replace the records.
    pub fn with_records(&self, records: Vec<Row>) -> Self {
        Self {
            header: self.header.clone(),
            records,
        }
    }
}
