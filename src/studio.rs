//! The application state handed to front ends
//!
//! A [`Studio`] bundles the document store, the text gate, the last rendered
//! preview surface and the export state. Front ends hold one and call into
//! it; nothing here is global.

use chrono::{DateTime, Utc};

use crate::editors::content::{TextGate, TextStatus};
use crate::error::Result;
use crate::export::{DownloadSink, ExportReceipt, Exporter, SurfaceCapture};
use crate::model::{ExportConfig, ExportFormat, Post};
use crate::preview::{project, PreviewModel};
use crate::rendering::{render_surface, Surface};
use crate::storage::PostStorage;
use crate::store::{ContentPatch, DocumentStore, SettingsPatch};
use crate::StudioConfig;

pub struct Studio<S: PostStorage> {
    config: StudioConfig,
    store: DocumentStore<S>,
    gate: TextGate,
    exporter: Exporter,
    export_config: ExportConfig,
    surface: Option<Surface>,
    preview_scale: f32,
}

impl<S: PostStorage> Studio<S> {
    /// Open a studio over `storage`, restoring the stored post and export settings.
    pub fn open(config: StudioConfig, storage: S) -> Result<Self> {
        config.validate()?;
        let store = DocumentStore::open(storage);
        let export_config = store
            .last_export_config()
            .unwrap_or(ExportConfig {
                format: store.post().settings.export_format,
                ..config.export
            });
        Ok(Self {
            gate: TextGate::new(config.text_limit),
            exporter: Exporter::new(config.export_prefix.clone()),
            export_config,
            surface: None,
            preview_scale: 1.0,
            store,
            config,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn post(&self) -> &Post {
        self.store.post()
    }

    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocumentStore<S> {
        &mut self.store
    }

    pub fn gate(&self) -> TextGate {
        self.gate
    }

    /// Offer new post text; returns whether it was accepted.
    pub fn edit_text(&mut self, text: &str) -> bool {
        match self.gate.accept(text) {
            Some(patch) => {
                self.store.update_content(patch);
                true
            }
            None => false,
        }
    }

    pub fn apply_content(&mut self, patch: Option<ContentPatch>) -> bool {
        match patch {
            Some(patch) => {
                self.store.update_content(patch);
                true
            }
            None => false,
        }
    }

    pub fn text_status(&self) -> TextStatus {
        self.gate.status(&self.post().content.text)
    }

    pub fn preview(&self, now: DateTime<Utc>) -> PreviewModel {
        project(self.post(), now)
    }

    /// Render the preview surface and keep it for export.
    pub fn render(&mut self, now: DateTime<Utc>) -> &Surface {
        let surface = render_surface(self.store.post(), now, self.config.preview_width);
        self.surface.insert(surface)
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn preview_scale(&self) -> f32 {
        self.preview_scale
    }

    /// On-screen zoom of the preview; ignored unless positive.
    pub fn set_preview_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.preview_scale = scale;
        }
    }

    pub fn export_config(&self) -> ExportConfig {
        self.export_config
    }

    /// Change export settings; they are remembered with the post and the
    /// chosen format becomes the post's default.
    pub fn set_export_config(&mut self, config: ExportConfig) {
        let config = config.sanitized();
        self.export_config = config;
        self.store.set_export_config(config);
        if self.post().settings.export_format != config.format {
            self.store.update_settings(SettingsPatch {
                export_format: Some(config.format),
                ..Default::default()
            });
        }
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        let config = ExportConfig { format, ..self.export_config };
        self.set_export_config(config);
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn exporter_mut(&mut self) -> &mut Exporter {
        &mut self.exporter
    }

    pub fn exporting(&self) -> bool {
        self.exporter.exporting()
    }

    /// Export the last rendered surface with the current export settings.
    pub async fn export(&self, capture: &dyn SurfaceCapture, sink: &dyn DownloadSink) -> Result<ExportReceipt> {
        self.exporter
            .export(self.surface.as_ref(), &self.export_config, capture, sink)
            .await
    }
}
