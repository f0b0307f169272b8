//! Archive builder: packs the selected catalog items into one `.tar.gz`.

use crate::fs::paths;
use crate::models::BackupItem;
use crate::utils::errors::BackupError;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What ended up in an archive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Root-relative names of the top-level entries, in archive order
    pub entries: Vec<PathBuf>,
    /// Selected catalog paths that matched nothing on disk
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    compression_level: u32,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new(Compression::default().level())
    }
}

impl ArchiveBuilder {
    pub fn new(compression_level: u32) -> Self {
        Self {
            compression_level: compression_level.min(9),
        }
    }

    /// Write every selected item to a gzip-compressed tarball at `destination`.
    ///
    /// Missing paths are skipped without error. Any other I/O failure aborts
    /// the build and removes whatever was written to `destination`.
    pub fn build(&self, items: &[BackupItem], destination: &Path) -> Result<ArchiveReport, BackupError> {
        self.build_with(items, destination, |file| file)
    }

    /// Same as [`build`](Self::build), with the destination file wrapped by
    /// `wrap` before the first byte is written.
    fn build_with<W: Write>(
        &self,
        items: &[BackupItem],
        destination: &Path,
        wrap: impl FnOnce(File) -> W,
    ) -> Result<ArchiveReport, BackupError> {
        match self.write_archive(items, destination, wrap) {
            Ok(report) => {
                info!(
                    "Archive {} written ({} entries, {} skipped)",
                    destination.display(),
                    report.entries.len(),
                    report.skipped.len()
                );
                Ok(report)
            }
            Err(e) => {
                remove_partial(destination);
                Err(BackupError::ArchiveIo(e))
            }
        }
    }

    fn write_archive<W: Write>(
        &self,
        items: &[BackupItem],
        destination: &Path,
        wrap: impl FnOnce(File) -> W,
    ) -> io::Result<ArchiveReport> {
        let file = File::create(destination).map_err(|e| with_path(e, destination))?;
        let encoder = GzEncoder::new(wrap(file), Compression::new(self.compression_level));
        let mut tar = Builder::new(encoder);
        tar.follow_symlinks(false);

        let mut report = ArchiveReport::default();

        for item in items.iter().filter(|i| i.selected) {
            let sources = paths::expand(&item.path);
            if sources.is_empty() {
                debug!("Nothing found for {}, skipping", item.path);
                report.skipped.push(item.path.clone());
                continue;
            }

            for source in sources {
                let name = paths::archive_name(&source)?;
                append_tree(&mut tar, &source, &name)?;
                debug!("Added {} as {}", source.display(), name.display());
                report.entries.push(name);
            }
        }

        let encoder = tar.into_inner()?;
        encoder.finish()?.flush()?;

        Ok(report)
    }
}

/// Build an archive with the default compression level.
pub fn build_archive(items: &[BackupItem], destination: &Path) -> Result<ArchiveReport, BackupError> {
    ArchiveBuilder::default().build(items, destination)
}

/// Append `source` under `name`, and everything below it when it is a
/// directory. Symlinks are stored as links, never followed. Sockets have no
/// tar representation and are left out.
fn append_tree<W: Write>(tar: &mut Builder<W>, source: &Path, name: &Path) -> io::Result<()> {
    let walker = WalkDir::new(source)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if is_socket(&entry.file_type()) {
            debug!("Skipping socket {}", path.display());
            continue;
        }

        let entry_name = match path.strip_prefix(source) {
            Ok(rest) if !rest.as_os_str().is_empty() => name.join(rest),
            _ => name.to_path_buf(),
        };
        tar.append_path_with_name(path, &entry_name)
            .map_err(|e| with_path(e, path))?;
    }
    Ok(())
}

#[cfg(unix)]
fn is_socket(file_type: &std::fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_socket()
}

#[cfg(not(unix))]
fn is_socket(_file_type: &std::fs::FileType) -> bool {
    false
}

fn with_path(e: io::Error, path: &Path) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
}

fn remove_partial(destination: &Path) {
    match std::fs::remove_file(destination) {
        Ok(()) => debug!("Removed partial archive {}", destination.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial archive {}: {}", destination.display(), e),
    }
}
