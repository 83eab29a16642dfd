//! Export: capture the rendered preview and deliver an image file
//!
//! Capturing and delivering are collaborators behind [`SurfaceCapture`] and
//! [`DownloadSink`]. [`Exporter`] owns the `exporting` flag: it is raised for
//! the whole capture-and-deliver step, refuses re-entrant exports, and is
//! lowered by a guard on every exit path.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::model::{ExportConfig, ExportFormat};
use crate::rendering::{Screenshot, Surface};

/// Default download name prefix.
pub const DEFAULT_PREFIX: &str = "fake-tweet";

pub const SUCCESS_MESSAGE: &str = "Tweet exported successfully!";
pub const FAILURE_MESSAGE: &str = "Failed to export tweet. Please try again.";
pub const NOT_FOUND_MESSAGE: &str = "Tweet preview not found. Please try again.";

/// Turns a rendered surface into encoded image bytes.
pub trait SurfaceCapture: Send + Sync {
    fn capture<'a>(&'a self, surface: &'a Surface, config: &'a ExportConfig) -> BoxFuture<'a, Result<Screenshot>>;
}

/// Built-in capture backed by [`crate::rendering::raster`], run on the blocking pool.
#[cfg(feature = "raster")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCapture;

#[cfg(feature = "raster")]
impl SurfaceCapture for RasterCapture {
    fn capture<'a>(&'a self, surface: &'a Surface, config: &'a ExportConfig) -> BoxFuture<'a, Result<Screenshot>> {
        let surface = surface.clone();
        let config = *config;
        Box::pin(async move {
            tokio::task::spawn_blocking(move || crate::rendering::raster::capture(&surface, &config))
                .await
                .map_err(|e| Error::Encode(format!("rasterizer task failed: {}", e)))?
        })
    }
}

/// Where finished files go.
pub trait DownloadSink: Send + Sync {
    /// Store `data` under `file_name`, returning where it ended up.
    fn deliver(&self, file_name: &str, data: &[u8]) -> Result<PathBuf>;
}

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Delivery(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, data).map_err(|e| Error::Delivery(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

/// `<prefix>-<epoch-millis>.<ext>`
pub fn export_file_name(prefix: &str, format: ExportFormat, epoch_millis: i64) -> String {
    format!("{}-{}.{}", prefix, epoch_millis, format.extension())
}

/// Message for the user after an export attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Exported { path: PathBuf },
    Failed { message: String },
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Exported { .. } => SUCCESS_MESSAGE,
            Notice::Failed { message } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failed { .. })
    }
}

/// Shared `exporting` flag; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct ExportingFlag(Arc<AtomicBool>);

impl ExportingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag, or `None` if it is already raised.
    pub fn try_acquire(&self) -> Option<ExportGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ExportGuard(self.0.clone()))
    }
}

/// Lowers the flag when dropped.
#[derive(Debug)]
pub struct ExportGuard(Arc<AtomicBool>);

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What a successful export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

type NoticeCallback = Box<dyn Fn(&Notice) + Send + Sync>;

pub struct Exporter {
    prefix: String,
    flag: ExportingFlag,
    on_notice: Option<NoticeCallback>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Exporter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            flag: ExportingFlag::default(),
            on_notice: None,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether an export is running.
    pub fn exporting(&self) -> bool {
        self.flag.is_set()
    }

    pub fn flag(&self) -> ExportingFlag {
        self.flag.clone()
    }

    /// Register a callback receiving success and failure notices.
    pub fn on_notice<F>(&mut self, cb: F)
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.on_notice = Some(Box::new(cb));
    }

    pub fn clear_on_notice(&mut self) {
        self.on_notice = None;
    }

    fn notify(&self, notice: Notice) {
        if let Some(cb) = &self.on_notice {
            cb(&notice);
        }
    }

    /// Capture `surface` and deliver it. Failures are reported through the
    /// notice callback and returned; the flag is lowered either way.
    pub async fn export(
        &self,
        surface: Option<&Surface>,
        config: &ExportConfig,
        capture: &dyn SurfaceCapture,
        sink: &dyn DownloadSink,
    ) -> Result<ExportReceipt> {
        let Some(surface) = surface else {
            log::warn!("export requested before the preview was rendered");
            self.notify(Notice::Failed { message: NOT_FOUND_MESSAGE.to_string() });
            return Err(Error::SurfaceNotFound);
        };
        let Some(_guard) = self.flag.try_acquire() else {
            log::debug!("export ignored: another export is running");
            return Err(Error::ExportInProgress);
        };

        let config = config.sanitized();
        log::info!("exporting {} at {}x ({}x{} surface)", config.format, config.scale, surface.width, surface.height);
        match self.capture_and_deliver(surface, &config, capture, sink).await {
            Ok(receipt) => {
                log::info!("exported {} ({} bytes)", receipt.path.display(), receipt.bytes);
                self.notify(Notice::Exported { path: receipt.path.clone() });
                Ok(receipt)
            }
            Err(e) => {
                log::error!("export failed: {}", e);
                self.notify(Notice::Failed { message: FAILURE_MESSAGE.to_string() });
                Err(e)
            }
        }
    }

    async fn capture_and_deliver(
        &self,
        surface: &Surface,
        config: &ExportConfig,
        capture: &dyn SurfaceCapture,
        sink: &dyn DownloadSink,
    ) -> Result<ExportReceipt> {
        let shot = capture.capture(surface, config).await?;
        let file_name = export_file_name(&self.prefix, shot.format, chrono::Utc::now().timestamp_millis());
        let path = sink.deliver(&file_name, &shot.data)?;
        Ok(ExportReceipt {
            path,
            file_name,
            width: shot.width,
            height: shot.height,
            bytes: shot.data.len(),
        })
    }
}
