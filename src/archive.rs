//! Job archive extraction and output packaging.
//!
//! Entry names are sanitised before extraction: only normal path components
//! survive, so `../../etc/passwd` lands as `etc/passwd` inside the workspace.
//! Executors only look at the top level of the extracted tree.

use crate::error::ArchiveError;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Keep only normal components of an entry name; `None` when nothing is left.
fn sanitize_path(name: &str) -> Option<PathBuf> {
    let mut sanitized = PathBuf::new();
    for component in Path::new(name).components() {
        if let Component::Normal(part) = component {
            sanitized.push(part);
        }
    }
    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Extract every file entry of `archive` under `dest`.
///
/// Returns the extracted paths in archive order.
pub fn extract(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(archive).map_err(io_error(archive))?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    let mut extracted = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let (name, is_dir, encrypted) = {
            let raw = zip.by_index_raw(i)?;
            (raw.name().to_string(), raw.is_dir(), raw.encrypted())
        };
        if is_dir {
            continue;
        }
        if encrypted {
            return Err(ArchiveError::PasswordProtected { name });
        }
        let Some(relative) = sanitize_path(&name) else {
            warn!("Skipping archive entry with unusable path: {name}");
            continue;
        };

        let target = dest.join(&relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let mut entry = zip.by_index(i)?;
        let mut out = File::create(&target).map_err(io_error(&target))?;
        std::io::copy(&mut entry, &mut out).map_err(io_error(&target))?;
        debug!("Extracted {}", relative.display());
        extracted.push(target);
    }
    Ok(extracted)
}

/// Zip the regular files at the top level of `src_dir` into `dest`.
///
/// Entries are stored by file name, sorted, deflate-compressed. Returns the
/// number of entries written.
pub fn create(src_dir: &Path, dest: &Path) -> Result<usize, ArchiveError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(src_dir)
        .map_err(io_error(src_dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let out = File::create(dest).map_err(io_error(dest))?;
    let mut zip = ZipWriter::new(BufWriter::new(out));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            warn!("Skipping non UTF-8 file name {}", path.display());
            continue;
        };
        zip.start_file(name, options)?;
        let mut input = File::open(path).map_err(io_error(path))?;
        std::io::copy(&mut input, &mut zip).map_err(io_error(path))?;
    }
    zip.finish()?;
    debug!("Packaged {} files into {}", files.len(), dest.display());
    Ok(files.len())
}
