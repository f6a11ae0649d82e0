use liquidation_export_api::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Address discovery failed. A partial population is never returned.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("indexing page at offset {skip} failed: {source}")]
    Page {
        skip: usize,
        #[source]
        source: ApiError,
    },

    #[error("no short page after {pages} pages ({fetched} addresses), population may be truncated")]
    PageLimit { pages: usize, fetched: usize },
}

/// Writing the export file failed. The destination is left untouched.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Fatal pipeline errors. Enrichment failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("address discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}
