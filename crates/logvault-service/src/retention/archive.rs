//! Gzip archival of expired log files.
//!
//! Layout: `<original-dir>/archived/<unix-timestamp>-<file-name>.gz`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::Compression;
use flate2::write::GzEncoder;

use logvault_core::error::{AppError, ErrorKind};
use logvault_core::result::AppResult;

/// Name of the archive directory created next to each archived file.
pub const ARCHIVE_DIR: &str = "archived";

/// Compress `source` into its sibling archive directory, then remove it.
///
/// Returns the path of the written `.gz` file.
pub async fn archive_file(source: &Path) -> AppResult<PathBuf> {
    let source = source.to_path_buf();
    tokio::task::spawn_blocking(move || compress_and_remove(&source))
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Archive task failed", e))?
}

fn compress_and_remove(source: &Path) -> AppResult<PathBuf> {
    let parent = source
        .parent()
        .ok_or_else(|| AppError::storage(format!("{} has no parent", source.display())))?;
    let file_name = source
        .file_name()
        .ok_or_else(|| AppError::storage(format!("{} has no file name", source.display())))?
        .to_string_lossy()
        .into_owned();

    let mut reader = BufReader::new(File::open(source)?);

    let archive_dir = parent.join(ARCHIVE_DIR);
    std::fs::create_dir_all(&archive_dir)?;
    let target = unique_target(&archive_dir, &file_name, Utc::now().timestamp());

    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&target)?), Compression::default());
    if let Err(e) = io::copy(&mut reader, &mut encoder).and_then(|_| encoder.try_finish()) {
        let _ = std::fs::remove_file(&target);
        return Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to compress {}", source.display()),
            e,
        ));
    }
    encoder
        .finish()
        .and_then(|mut writer| io::Write::flush(&mut writer))?;

    std::fs::remove_file(source)?;
    Ok(target)
}

/// First `<ts>-<name>.gz` that does not exist yet, bumping `ts` on collision.
fn unique_target(dir: &Path, file_name: &str, mut ts: i64) -> PathBuf {
    loop {
        let candidate = dir.join(format!("{ts}-{file_name}.gz"));
        if !candidate.exists() {
            return candidate;
        }
        ts += 1;
    }
}
