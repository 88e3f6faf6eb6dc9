//! One file per page in a directory

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{page_file_name, DocSink};
use crate::error::SinkError;
use crate::model::{Event, Function, Script};
use crate::render::{member_title, script_title, Renderer};

/// Writes each page as `<title>.wiki` into a directory.
///
/// Misc pages are not supported and are dropped; finalizing has nothing to
/// flush.
pub struct FsPageSink {
    dir: PathBuf,
    renderer: Renderer,
    written: usize,
}

impl FsPageSink {
    /// Create the sink, creating the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>, renderer: Renderer) -> Result<Self, SinkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| SinkError::Io {
            operation: "create output directory",
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            renderer,
            written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of pages written so far
    pub fn pages_written(&self) -> usize {
        self.written
    }

    fn write_page(&mut self, title: &str, text: &str) -> Result<(), SinkError> {
        let path = self.dir.join(page_file_name(title));
        std::fs::write(&path, text).map_err(|source| SinkError::Io {
            operation: "write page",
            path: path.clone(),
            source,
        })?;
        self.written += 1;
        debug!(path = %path.display(), "wrote page");
        Ok(())
    }
}

impl DocSink for FsPageSink {
    fn kind(&self) -> &'static str {
        "wiki"
    }

    fn write_script(&mut self, script: &Script) -> Result<(), SinkError> {
        let text = self.renderer.script_page(script);
        self.write_page(&script_title(&script.name), &text)
    }

    fn write_function(&mut self, script_name: &str, function: &Function) -> Result<(), SinkError> {
        let text = self.renderer.function_page(script_name, function);
        self.write_page(&member_title(&function.name, script_name), &text)
    }

    fn write_event(&mut self, script_name: &str, event: &Event) -> Result<(), SinkError> {
        let text = self.renderer.event_page(script_name, event);
        self.write_page(&member_title(&event.name, script_name), &text)
    }

    fn write_misc(&mut self, title: &str, _text: &str) -> Result<(), SinkError> {
        debug!(title, "page sink ignores misc pages");
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        debug!(pages = self.written, dir = %self.dir.display(), "page sink finished");
        Ok(())
    }
}
