//! Parquet output for compliance summaries.

use super::{AggregateError, ComplianceSummary};
use crate::config::OutputPolicy;
use parquet::data_type::{BoolType, ByteArray, ByteArrayType, Int64Type};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::{SerializedColumnWriter, SerializedFileWriter, SerializedRowGroupWriter};
use parquet::schema::parser::parse_message_type;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Column layout of the output file, in write order.
const SUMMARY_SCHEMA: &str = "
message compliance_summary {
    REQUIRED BYTE_ARRAY organization_name (UTF8);
    REQUIRED INT64 repository_id;
    REQUIRED BYTE_ARRAY repository_name (UTF8);
    REQUIRED BYTE_ARRAY repository_owner (UTF8);
    REQUIRED INT64 num_prs;
    REQUIRED INT64 num_prs_merged;
    OPTIONAL INT64 merged_at (TIMESTAMP_MILLIS);
    REQUIRED BOOLEAN is_compliant;
}
";

/// What [`write_summaries`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new file was written.
    Written { path: PathBuf, rows: usize },

    /// An existing file was replaced.
    Overwritten { path: PathBuf, rows: usize },

    /// The file existed and was left alone.
    Skipped { path: PathBuf },
}

/// Writes `summaries` to `path` as Parquet, honoring `policy` when the file
/// already exists.
///
/// # Errors
///
/// Returns [`AggregateError::OutputExists`] under [`OutputPolicy::Fail`] when
/// `path` exists, and I/O or Parquet errors otherwise.
pub fn write_summaries(
    path: &Path,
    summaries: &[ComplianceSummary],
    policy: OutputPolicy,
) -> Result<WriteOutcome, AggregateError> {
    let existed = path.exists();
    if existed {
        match policy {
            OutputPolicy::Fail => {
                return Err(AggregateError::OutputExists {
                    path: path.display().to_string(),
                });
            }
            OutputPolicy::Skip => {
                warn!(path = %path.display(), "Output exists, skipping write");
                return Ok(WriteOutcome::Skipped {
                    path: path.to_path_buf(),
                });
            }
            OutputPolicy::Overwrite => {
                warn!(path = %path.display(), "Output exists, overwriting");
            }
        }
    }

    stage_and_publish(path, policy, |file| encode(file, summaries))?;

    info!(path = %path.display(), rows = summaries.len(), "Wrote compliance summary");

    let path = path.to_path_buf();
    let rows = summaries.len();
    Ok(if existed {
        WriteOutcome::Overwritten { path, rows }
    } else {
        WriteOutcome::Written { path, rows }
    })
}

/// Encodes into a temporary file beside `path` and moves it into place.
///
/// `path` is only touched once encoding has succeeded. A failed encode drops
/// the temporary file and leaves any previous output as it was.
fn stage_and_publish(
    path: &Path,
    policy: OutputPolicy,
    encode: impl FnOnce(&mut File) -> Result<(), ParquetError>,
) -> Result<(), AggregateError> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| AggregateError::IoError {
        path: parent.display().to_string(),
        source: e,
    })?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| AggregateError::IoError {
        path: parent.display().to_string(),
        source: e,
    })?;
    encode(staged.as_file_mut()).map_err(|e| AggregateError::ParquetError {
        path: path.display().to_string(),
        source: e,
    })?;

    let published = match policy {
        OutputPolicy::Overwrite => staged.persist(path),
        OutputPolicy::Fail | OutputPolicy::Skip => staged.persist_noclobber(path),
    };
    published.map(|_| ()).map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            AggregateError::OutputExists {
                path: path.display().to_string(),
            }
        } else {
            AggregateError::IoError {
                path: path.display().to_string(),
                source: e.error,
            }
        }
    })
}

fn encode<W: Write + Send>(sink: W, summaries: &[ComplianceSummary]) -> Result<(), ParquetError> {
    let schema = Arc::new(parse_message_type(SUMMARY_SCHEMA)?);
    let props = Arc::new(WriterProperties::builder().build());
    let mut writer = SerializedFileWriter::new(sink, schema, props)?;
    let mut row_group = writer.next_row_group()?;

    write_strings(&mut row_group, summaries, |s| &s.organization_name)?;
    write_longs(&mut row_group, summaries, |s| to_i64(s.repository_id))?;
    write_strings(&mut row_group, summaries, |s| &s.repository_name)?;
    write_strings(&mut row_group, summaries, |s| &s.repository_owner)?;
    write_longs(&mut row_group, summaries, |s| to_i64(s.num_prs))?;
    write_longs(&mut row_group, summaries, |s| to_i64(s.num_prs_merged))?;

    let merged_at: Vec<i64> = summaries
        .iter()
        .filter_map(|s| s.merged_at.map(|ts| ts.and_utc().timestamp_millis()))
        .collect();
    let def_levels: Vec<i16> = summaries
        .iter()
        .map(|s| i16::from(s.merged_at.is_some()))
        .collect();
    let mut column = next_column(&mut row_group)?;
    column
        .typed::<Int64Type>()
        .write_batch(&merged_at, Some(def_levels.as_slice()), None)?;
    column.close()?;

    let flags: Vec<bool> = summaries.iter().map(|s| s.is_compliant).collect();
    let mut column = next_column(&mut row_group)?;
    column.typed::<BoolType>().write_batch(&flags, None, None)?;
    column.close()?;

    row_group.close()?;
    writer.close()?;
    Ok(())
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn next_column<'a, W: Write + Send>(
    row_group: &'a mut SerializedRowGroupWriter<'_, W>,
) -> Result<SerializedColumnWriter<'a>, ParquetError> {
    row_group
        .next_column()?
        .ok_or_else(|| ParquetError::General("schema has fewer columns than written".to_string()))
}

fn write_strings<W: Write + Send>(
    row_group: &mut SerializedRowGroupWriter<'_, W>,
    summaries: &[ComplianceSummary],
    field: impl Fn(&ComplianceSummary) -> &String,
) -> Result<(), ParquetError> {
    let values: Vec<ByteArray> = summaries
        .iter()
        .map(|s| ByteArray::from(field(s).as_str()))
        .collect();
    let mut column = next_column(row_group)?;
    column
        .typed::<ByteArrayType>()
        .write_batch(&values, None, None)?;
    column.close()
}

fn write_longs<W: Write + Send>(
    row_group: &mut SerializedRowGroupWriter<'_, W>,
    summaries: &[ComplianceSummary],
    field: impl Fn(&ComplianceSummary) -> i64,
) -> Result<(), ParquetError> {
    let values: Vec<i64> = summaries.iter().map(field).collect();
    let mut column = next_column(row_group)?;
    column.typed::<Int64Type>().write_batch(&values, None, None)?;
    column.close()
}
