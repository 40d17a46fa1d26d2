//! Arrow-backed CSV and Parquet writers

use super::{ReportError, ReportRow};
use crate::config::ReportFormat;
use crate::race::AttributeTag;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

/// Report columns: `ID`, one per attribute, `NormalSum`, `Outcome`
pub fn report_schema(attributes: &[AttributeTag]) -> Schema {
    let mut fields = vec![Field::new("ID", DataType::Utf8, false)];
    for tag in attributes {
        fields.push(Field::new(tag.key(), DataType::Int64, false));
    }
    fields.push(Field::new("NormalSum", DataType::Int64, false));
    fields.push(Field::new("Outcome", DataType::Utf8, false));
    Schema::new(fields)
}

/// Build a single record batch from report rows
pub fn to_record_batch(
    rows: &[ReportRow],
    attributes: &[AttributeTag],
) -> Result<RecordBatch, ReportError> {
    let schema = Arc::new(report_schema(attributes));

    let ids: Vec<&str> = rows.iter().map(|r| r.race_id.as_str()).collect();
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(ids))];

    for index in 0..attributes.len() {
        let values: Vec<i64> = rows
            .iter()
            .map(|r| r.values.get(index).copied().unwrap_or(0))
            .collect();
        columns.push(Arc::new(Int64Array::from(values)));
    }

    let sums: Vec<i64> = rows.iter().map(|r| r.normalized_sum).collect();
    let outcomes: Vec<&str> = rows.iter().map(|r| r.outcome.as_str()).collect();
    columns.push(Arc::new(Int64Array::from(sums)));
    columns.push(Arc::new(StringArray::from(outcomes)));

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Writes report rows to disk
pub struct ReportWriter {
    attributes: Vec<AttributeTag>,
}

impl ReportWriter {
    pub fn new(attributes: Vec<AttributeTag>) -> Self {
        Self { attributes }
    }

    /// Write `rows` to `path`, creating parent directories as needed
    pub fn write(
        &self,
        rows: &[ReportRow],
        path: &Path,
        format: ReportFormat,
    ) -> Result<(), ReportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let batch = to_record_batch(rows, &self.attributes)?;
        let file = File::create(path)?;

        match format {
            ReportFormat::Csv => {
                let mut writer = WriterBuilder::new().with_header(true).build(file);
                writer.write(&batch)?;
            }
            ReportFormat::Parquet => {
                let props = WriterProperties::builder()
                    .set_compression(Compression::SNAPPY)
                    .build();
                let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
                writer.write(&batch)?;
                writer.close()?;
            }
        }

        tracing::debug!(path = ?path, count = rows.len(), format = ?format, "Wrote report");
        Ok(())
    }
}
