//! Delivering an export to the user as a file.
//!
//! Two strategies share one observable outcome (a single file under the final
//! name, nothing else left behind):
//! - [`DirectSave`] writes into the platform's download folder, which must
//!   already exist;
//! - [`StagedSave`] creates its folder on demand.
//!
//! Both write a temporary file next to the destination and rename it into
//! place, so an earlier file of the same name survives a failed write.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ripper_logging::{ripper_debug, ripper_warn};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::export::LinkExport;
use crate::filename::download_safe_name;

const FALLBACK_DIR_NAME: &str = "downloads";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("download directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub trait FileDelivery: Send + Sync {
    /// Short name for logs.
    fn strategy(&self) -> &'static str;
    /// Writes `export` and returns the path of the delivered file.
    fn deliver(&self, export: &LinkExport) -> Result<PathBuf, DeliveryError>;
}

/// Ensure a download directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), DeliveryError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(DeliveryError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Picks a strategy. A configured directory always gets the staged writer;
/// otherwise the platform download folder is used when there is one.
pub fn detect_delivery(configured_dir: Option<&Path>) -> Box<dyn FileDelivery> {
    if let Some(dir) = configured_dir {
        return Box::new(StagedSave::new(dir.to_path_buf()));
    }
    match dirs::download_dir() {
        Some(dir) if dir.is_dir() => {
            ripper_debug!("Using platform download folder {:?}", dir);
            Box::new(DirectSave::new(dir))
        }
        _ => {
            let dir = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(FALLBACK_DIR_NAME);
            ripper_debug!("No platform download folder; staging into {:?}", dir);
            Box::new(StagedSave::new(dir))
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectSave {
    dir: PathBuf,
}

impl DirectSave {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl FileDelivery for DirectSave {
    fn strategy(&self) -> &'static str {
        "direct"
    }

    fn deliver(&self, export: &LinkExport) -> Result<PathBuf, DeliveryError> {
        let path = self.dir.join(download_safe_name(&export.filename));
        // The folder is expected to exist; an earlier file of the same name is
        // only replaced once the new content is fully on disk.
        write_then_persist(&self.dir, &path, export.content.as_bytes())?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct StagedSave {
    dir: PathBuf,
}

impl StagedSave {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl FileDelivery for StagedSave {
    fn strategy(&self) -> &'static str {
        "staged"
    }

    fn deliver(&self, export: &LinkExport) -> Result<PathBuf, DeliveryError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(download_safe_name(&export.filename));
        write_then_persist(&self.dir, &target, export.content.as_bytes())?;
        Ok(target)
    }
}

/// Writes `content` to a temporary file in `dir` and renames it onto `target`.
fn write_then_persist(dir: &Path, target: &Path, content: &[u8]) -> Result<(), DeliveryError> {
    // Dropping `tmp` on any early return deletes it.
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    if let Err(err) = tmp.persist(target) {
        ripper_warn!("Failed to move export into place at {:?}: {}", target, err.error);
        return Err(DeliveryError::Io(err.error));
    }
    Ok(())
}
