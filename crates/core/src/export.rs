//! CSV export of liquidation candidates.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::error::ExportError;
use crate::position::LiquidationCandidate;

/// CSV header row.
pub const HEADERS: [&str; 3] = ["Address", "Borrow_USD", "Health_Factor"];

/// Writes candidates to a CSV file, all-or-nothing.
///
/// Rows go to a sibling `<name>.tmp` file that is synced and then renamed
/// over the destination, so readers never observe a half-written export.
#[derive(Debug, Clone)]
pub struct ResultExporter {
    path: PathBuf,
}

impl ResultExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("export"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write one row per candidate under the header row.
    #[instrument(skip(self, candidates), fields(path = %self.path.display(), rows = candidates.len()))]
    pub fn export(&self, candidates: &[LiquidationCandidate]) -> Result<PathBuf, ExportError> {
        let tmp = self.temp_path();

        let result = write_csv(&tmp, candidates).and_then(|()| {
            fs::rename(&tmp, &self.path).map_err(|source| ExportError::Io {
                path: self.path.clone(),
                source,
            })
        });

        if let Err(e) = result {
            if tmp.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp export file");
                }
            }
            return Err(e);
        }

        info!(rows = candidates.len(), "CSV written");
        Ok(self.path.clone())
    }
}

fn write_csv(path: &Path, candidates: &[LiquidationCandidate]) -> Result<(), ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(HEADERS)?;
    for candidate in candidates {
        writer.write_record([
            candidate.canonical_address(),
            candidate.borrowed_usd.to_string(),
            candidate.health_factor.to_string(),
        ])?;
    }

    let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
    file.sync_all().map_err(io_err)?;

    Ok(())
}
