//! Zip archive of wiki pages

use std::io::{Cursor, Write};

use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{page_file_name, DocSink};
use crate::error::SinkError;
use crate::model::{Event, Function, Script};
use crate::render::{member_title, script_title, Renderer};

/// Collects pages in memory and writes them into a deflated zip archive.
///
/// Entries keep the order of their first write. Writing a page whose entry
/// name already exists replaces the earlier text. Every entry carries the
/// same fixed modification time, so identical input gives identical bytes.
pub struct ZipArchiveSink {
    renderer: Renderer,
    entries: Vec<(String, String)>,
    archive: Option<Vec<u8>>,
}

impl ZipArchiveSink {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            entries: Vec::new(),
            archive: None,
        }
    }

    /// Entry names in archive order
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Archive bytes, available once finalized
    pub fn bytes(&self) -> Option<&[u8]> {
        self.archive.as_deref()
    }

    /// Finalize and take the archive bytes.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, SinkError> {
        self.finalize()?;
        Ok(self.archive.take().unwrap_or_default())
    }

    fn add_entry(&mut self, name: String, text: String) -> Result<(), SinkError> {
        if self.archive.is_some() {
            return Err(SinkError::AlreadyFinalized { sink: "zip" });
        }
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => {
                debug!(entry = %name, "replacing archive entry");
                entry.1 = text;
            }
            None => self.entries.push((name, text)),
        }
        Ok(())
    }

    fn build(&self) -> Result<Vec<u8>, SinkError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, text) in &self.entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| SinkError::archive(format!("start entry '{name}'"), e))?;
            writer
                .write_all(text.as_bytes())
                .map_err(|e| SinkError::archive(format!("write entry '{name}'"), ZipError::Io(e)))?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| SinkError::archive("finish archive", e))?;
        Ok(cursor.into_inner())
    }
}

impl DocSink for ZipArchiveSink {
    fn kind(&self) -> &'static str {
        "zip"
    }

    fn write_script(&mut self, script: &Script) -> Result<(), SinkError> {
        let text = self.renderer.script_page(script);
        self.add_entry(page_file_name(&script_title(&script.name)), text)
    }

    fn write_function(&mut self, script_name: &str, function: &Function) -> Result<(), SinkError> {
        let text = self.renderer.function_page(script_name, function);
        self.add_entry(page_file_name(&member_title(&function.name, script_name)), text)
    }

    fn write_event(&mut self, script_name: &str, event: &Event) -> Result<(), SinkError> {
        let text = self.renderer.event_page(script_name, event);
        self.add_entry(page_file_name(&member_title(&event.name, script_name)), text)
    }

    fn write_misc(&mut self, title: &str, text: &str) -> Result<(), SinkError> {
        self.add_entry(page_file_name(title), text.to_string())
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        if self.archive.is_some() {
            return Ok(());
        }
        let bytes = self.build()?;
        debug!(entries = self.entries.len(), bytes = bytes.len(), "zip archive finished");
        self.archive = Some(bytes);
        Ok(())
    }
}
