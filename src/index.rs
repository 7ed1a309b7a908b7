//! Index-file parsing.
//!
//! An index file is named `<archive-stem>.idx` and sits next to the PDFs in
//! the job. Each non-blank line is one record with `||`-separated fields:
//!
//! ```text
//! concatenation   counter||filename
//! split           counter||filename||firstPage||lastPage
//! page override   counter||page||degrees||pageWidth||pageHeight||scaleX||scaleY||shiftX||shiftY
//! ```
//!
//! Records are returned in file order; the counter is informational and is
//! carried through for error messages only.

use crate::error::IndexError;
use crate::geometry::{PageSize, PerPageOverride, ScaleFactors};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const FIELD_SEPARATOR: &str = "||";

/// One line of a concatenation index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatEntry {
    pub counter: u32,
    pub file_name: String,
}

/// One line of a split index: pages `first..=last` go to `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRange {
    pub counter: u32,
    pub file_name: String,
    pub first: u32,
    pub last: u32,
}

/// `<dir>/<stem>.idx`
pub fn index_path(dir: &Path, archive_stem: &str) -> PathBuf {
    dir.join(format!("{archive_stem}.idx"))
}

/// Read an index file, failing with [`IndexError::NotFound`] when absent.
pub fn read_index(path: &Path) -> Result<String, IndexError> {
    if !path.is_file() {
        return Err(IndexError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| IndexError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read index {}", path.display());
    Ok(text)
}

pub fn parse_concat(text: &str) -> Result<Vec<ConcatEntry>, IndexError> {
    records(text, 2)
        .map(|record| {
            let (line, fields) = record?;
            Ok(ConcatEntry {
                counter: field(line, &fields, 0, "counter")?,
                file_name: file_name(line, &fields, 1)?,
            })
        })
        .collect()
}

pub fn parse_split(text: &str) -> Result<Vec<SplitRange>, IndexError> {
    records(text, 4)
        .map(|record| {
            let (line, fields) = record?;
            Ok(SplitRange {
                counter: field(line, &fields, 0, "counter")?,
                file_name: file_name(line, &fields, 1)?,
                first: field(line, &fields, 2, "first page")?,
                last: field(line, &fields, 3, "last page")?,
            })
        })
        .collect()
}

pub fn parse_overrides(text: &str) -> Result<Vec<PerPageOverride>, IndexError> {
    records(text, 9)
        .map(|record| {
            let (line, fields) = record?;
            Ok(PerPageOverride {
                counter: field(line, &fields, 0, "counter")?,
                page: field(line, &fields, 1, "page")?,
                degrees: field(line, &fields, 2, "degrees")?,
                target: PageSize::new(
                    field(line, &fields, 3, "page width")?,
                    field(line, &fields, 4, "page height")?,
                ),
                scale: ScaleFactors {
                    x: field(line, &fields, 5, "scale x")?,
                    y: field(line, &fields, 6, "scale y")?,
                },
                shift_x: field(line, &fields, 7, "shift x")?,
                shift_y: field(line, &fields, 8, "shift y")?,
            })
        })
        .collect()
}

/// Every concatenation entry must name a file present in `dir`.
pub fn verify_entries(dir: &Path, entries: &[ConcatEntry]) -> Result<(), IndexError> {
    match entries.iter().find(|e| !dir.join(&e.file_name).is_file()) {
        Some(missing) => Err(IndexError::MissingEntry {
            counter: missing.counter,
            file_name: missing.file_name.clone(),
        }),
        None => Ok(()),
    }
}

// ── Line handling ────────────────────────────────────────────────────────

/// Non-blank lines as `(1-based line number, fields)`, checked for a minimum field count.
fn records(
    text: &str,
    min_fields: usize,
) -> impl Iterator<Item = Result<(usize, Vec<&str>), IndexError>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(move |(n, line)| {
            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
            if fields.len() < min_fields {
                return Err(IndexError::Malformed {
                    line: n + 1,
                    detail: format!(
                        "expected {min_fields} '||'-separated fields, found {}",
                        fields.len()
                    ),
                });
            }
            Ok((n + 1, fields))
        })
}

fn field<T: FromStr>(line: usize, fields: &[&str], at: usize, name: &str) -> Result<T, IndexError> {
    fields[at].parse().map_err(|_| IndexError::Malformed {
        line,
        detail: format!("{name} '{}' is not a valid number", fields[at]),
    })
}

fn file_name(line: usize, fields: &[&str], at: usize) -> Result<String, IndexError> {
    let name = fields[at];
    // Entries name files inside the job; anything path-like is refused.
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(IndexError::Malformed {
            line,
            detail: format!("'{name}' is not a plain file name"),
        });
    }
    Ok(name.to_string())
}
