// Group export as two-column CSV.
//
// Format: header `Group,Participant Name`, then one row per member in group
// order, rows separated by `\n` with no newline after the last one. Values
// are written verbatim; commas inside names are not escaped.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::groups::Group;

pub const EXPORT_HEADER: [&str; 2] = ["Group", "Participant Name"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV buffer: {0}")]
    Buffer(std::io::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn csv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

fn render(groups: &[Group]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv_writer(Vec::new());
    wtr.write_record(EXPORT_HEADER)?;
    for group in groups {
        let label = group.label();
        for member in &group.members {
            wtr.write_record([label.as_str(), member.name.as_str()])?;
        }
    }
    let mut bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.into_error()))?;
    // The writer terminates every record; the export separates them.
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(bytes)
}

/// Write the header and one row per (group label, member name) pair to
/// `out`. `dest` names the destination in errors.
pub fn write_groups<W: Write>(groups: &[Group], out: &mut W, dest: &str) -> Result<(), ExportError> {
    let bytes = render(groups)?;
    out.write_all(&bytes)
        .and_then(|()| out.flush())
        .map_err(|source| ExportError::Io {
            path: dest.to_string(),
            source,
        })
}

/// Render groups as CSV text.
pub fn serialize(groups: &[Group]) -> Result<String, ExportError> {
    Ok(String::from_utf8(render(groups)?)?)
}

/// File name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("classroom_groups_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the export file into `dir` and return its path.
pub fn export_to_dir(groups: &[Group], dir: &Path, date: NaiveDate) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(date));
    let mut file = std::fs::File::create(&path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_groups(groups, &mut file, &path.display().to_string())?;
    let rows: usize = groups.iter().map(|g| g.members.len()).sum();
    info!("Exported {} rows in {} groups to {}", rows, groups.len(), path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
