//! Moving a package between its zip file and an expanded directory

use crate::content_types::CONTENT_TYPES_PART;
use crate::error::{XlsxError, XlsxResult};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Expand the zip file at `archive_path` into `dest`
///
/// Entries whose names would land outside `dest` make the package corrupt.
pub fn extract(archive_path: &Path, dest: &Path) -> XlsxResult<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(XlsxError::corrupt(
                archive_path,
                format!("entry '{}' points outside the package", entry.name()),
            ));
        };

        let target = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&target)?);
        io::copy(&mut entry, &mut out)?;
        out.flush()?;
    }

    log::debug!(
        "extracted {} entries from {}",
        archive.len(),
        archive_path.display()
    );
    Ok(())
}

/// Zip every file below `dir` into `out_path`, content types first
pub fn pack(dir: &Path, out_path: &Path, compression_level: Option<i64>) -> XlsxResult<()> {
    let mut names = Vec::new();
    collect_files(dir, dir, &mut names)?;
    names.sort_by(|a, b| (a != CONTENT_TYPES_PART, a).cmp(&(b != CONTENT_TYPES_PART, b)));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(compression_level);

    let mut zip = ZipWriter::new(BufWriter::new(File::create(out_path)?));
    for name in &names {
        zip.start_file(name.as_str(), options)?;
        let mut part = File::open(dir.join(name))?;
        io::copy(&mut part, &mut zip)?;
    }
    zip.finish()?.flush()?;

    log::debug!("packed {} parts into {}", names.len(), out_path.display());
    Ok(())
}

/// Entry names (with `/` separators) of the files below `current`
fn collect_files(root: &Path, current: &Path, names: &mut Vec<String>) -> XlsxResult<()> {
    for entry in fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, names)?;
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
    }
    Ok(())
}
