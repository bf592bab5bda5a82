//! Report assembly and CSV output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::metrics::{MetricValue, MetricsRecord};
use crate::publisher::Publisher;
use crate::schema::{Column, ordered_header};

/// Header plus rows projected onto it; every row has the header's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub header: Vec<Column>,
    pub rows: Vec<Vec<MetricValue>>,
}

impl ReportTable {
    pub fn new(publisher: &Publisher) -> Self {
        Self {
            header: ordered_header(publisher),
            rows: Vec::new(),
        }
    }

    /// Project `record` onto the header and append it.
    pub fn push(&mut self, record: &MetricsRecord) {
        let row = self
            .header
            .iter()
            .map(|&column| {
                record.get(column).cloned().unwrap_or_else(|| {
                    log::warn!("metrics record has no {column:?} value");
                    MetricValue::Text(None)
                })
            })
            .collect();
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header labels first, then one record per row.
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.header.iter().map(|c| c.label()))?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(ToString::to_string))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_csv(BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
