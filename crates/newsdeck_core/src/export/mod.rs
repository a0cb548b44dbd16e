//! Page export orchestration.
//!
//! # Responsibility
//! - Drive an external page rasterizer one page at a time and write the
//!   results as numbered PNG files.
//! - Report per-page failures without rolling back pages already written.
//!
//! # Invariants
//! - A failed page is skipped and reported; earlier pages stay on disk.
//! - Export must not run mid-edit; the service layer enforces it.

use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Capability of the external collaborator rendering pages to images.
pub trait PageRasterizer {
    /// Number of pages currently renderable.
    fn page_count(&self) -> usize;
    /// Renders one page (0-based) to PNG bytes.
    fn rasterize_page(&mut self, index: usize) -> Result<Vec<u8>, RasterizeError>;
}

/// Failure reported by a rasterizer for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizeError {
    pub message: String,
}

impl RasterizeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for RasterizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "rasterization failed: {}", self.message)
    }
}

impl Error for RasterizeError {}

/// Export error outside the per-page failure path.
#[derive(Debug)]
pub enum ExportError {
    /// The output directory could not be created.
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutputDir { path, source } => {
                write!(f, "cannot create export directory `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutputDir { source, .. } => Some(source),
        }
    }
}

/// One skipped page and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    /// 1-based page number, matching the output file names.
    pub page: usize,
    pub reason: String,
}

/// Outcome of one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Files written, in page order.
    pub written: Vec<PathBuf>,
    /// Pages skipped, in page order.
    pub failed: Vec<PageFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Exports every page as `newsletter_page_{n}.png` under `out_dir`.
///
/// Pages are rendered independently; one failure skips that page and is
/// recorded in the report while the loop continues.
pub fn export_pages<R: PageRasterizer>(
    rasterizer: &mut R,
    out_dir: &Path,
) -> Result<ExportReport, ExportError> {
    fs::create_dir_all(out_dir).map_err(|source| ExportError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut report = ExportReport::default();
    for index in 0..rasterizer.page_count() {
        let page = index + 1;
        let outcome = rasterizer.rasterize_page(index).map_err(|err| err.to_string());
        let outcome = outcome.and_then(|bytes| {
            let path = out_dir.join(format!("newsletter_page_{page}.png"));
            fs::write(&path, &bytes)
                .map(|()| path)
                .map_err(|err| err.to_string())
        });

        match outcome {
            Ok(path) => {
                info!(
                    "event=page_export module=export status=ok page={page} path={}",
                    path.display()
                );
                report.written.push(path);
            }
            Err(reason) => {
                error!("event=page_export module=export status=error page={page} error={reason}");
                report.failed.push(PageFailure { page, reason });
            }
        }
    }

    Ok(report)
}
