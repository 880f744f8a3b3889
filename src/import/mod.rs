use crate::error::Result;
use crate::models::RawActivityRow;

pub mod csv;

pub use self::csv::CsvActivitySource;

/// Source of raw activity rows, in the order they should be processed
pub trait RecordSource {
    /// Read every row the source holds
    fn rows(&self) -> Result<Vec<RawActivityRow>>;

    /// Short human-readable description, used in log output
    fn source_name(&self) -> String;
}

/// Rows already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<RawActivityRow>,
}

impl InMemorySource {
    pub fn new(rows: Vec<RawActivityRow>) -> Self {
        Self { rows }
    }
}

impl RecordSource for InMemorySource {
    fn rows(&self) -> Result<Vec<RawActivityRow>> {
        Ok(self.rows.clone())
    }

    fn source_name(&self) -> String {
        format!("in-memory ({} rows)", self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_source_preserves_order() {
        let rows: Vec<RawActivityRow> = ["2021-03-02", "2021-03-01"]
            .iter()
            .map(|d| RawActivityRow {
                date: d.to_string(),
                ..RawActivityRow::default()
            })
            .collect();

        let source = InMemorySource::new(rows.clone());
        assert_eq!(source.rows().unwrap(), rows);
        assert!(source.source_name().contains("2 rows"));
    }
}
