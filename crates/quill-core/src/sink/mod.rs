//! Documentation sinks
//!
//! A sink receives rendered pages (or raw entity rows) one entity at a time
//! and owns whatever resource the output lives in. Every sink is finalized
//! exactly once; finalizing again is a no-op.

mod archive;
mod dump;
mod pages;
mod sql;

use crate::error::SinkError;
use crate::model::{Event, Function, Script};

pub use self::archive::ZipArchiveSink;
pub use self::dump::{text_digest, XmlDumpSink, XmlSiteInfo};
pub use self::pages::FsPageSink;
pub use self::sql::{SqlOptions, SqlSink};

/// A destination for documentation pages.
pub trait DocSink {
    /// Short name used in log lines and errors
    fn kind(&self) -> &'static str;

    fn write_script(&mut self, script: &Script) -> Result<(), SinkError>;

    fn write_function(&mut self, script_name: &str, function: &Function) -> Result<(), SinkError>;

    fn write_event(&mut self, script_name: &str, event: &Event) -> Result<(), SinkError>;

    /// Write a page that does not belong to a script, such as the index.
    fn write_misc(&mut self, title: &str, text: &str) -> Result<(), SinkError>;

    /// Flush buffered output and release resources.
    ///
    /// Release steps run even when an earlier step fails; the first error is
    /// returned.
    fn finalize(&mut self) -> Result<(), SinkError>;
}

/// Write a script page followed by one page per function and event.
pub fn publish_script<S: DocSink + ?Sized>(sink: &mut S, script: &Script) -> Result<(), SinkError> {
    sink.write_script(script)?;
    for function in &script.functions {
        sink.write_function(&script.name, function)?;
    }
    for event in &script.events {
        sink.write_event(&script.name, event)?;
    }
    tracing::debug!(
        sink = sink.kind(),
        script = %script.name,
        functions = script.functions.len(),
        events = script.events.len(),
        "published script"
    );
    Ok(())
}

/// File or archive entry name for a page title.
///
/// `:` is not allowed in file names on every platform, so it becomes `_`.
pub fn page_file_name(title: &str) -> String {
    format!("{}.wiki", title.replace(':', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl DocSink for Recorder {
        fn kind(&self) -> &'static str {
            "recorder"
        }

        fn write_script(&mut self, script: &Script) -> Result<(), SinkError> {
            self.calls.push(format!("script {}", script.name));
            Ok(())
        }

        fn write_function(&mut self, script_name: &str, function: &Function) -> Result<(), SinkError> {
            self.calls.push(format!("function {} {}", script_name, function.name));
            Ok(())
        }

        fn write_event(&mut self, script_name: &str, event: &Event) -> Result<(), SinkError> {
            self.calls.push(format!("event {} {}", script_name, event.name));
            Ok(())
        }

        fn write_misc(&mut self, title: &str, _text: &str) -> Result<(), SinkError> {
            self.calls.push(format!("misc {title}"));
            Ok(())
        }

        fn finalize(&mut self) -> Result<(), SinkError> {
            Ok(())
        }
    }

    #[test]
    fn test_publish_order() {
        let mut script = Script::new("Door", "ObjectReference");
        script.functions.push(Function::new("Open", "", ""));
        script.functions.push(Function::new("Close", "", ""));
        script.events.push(Event::new("OnActivate", "ObjectReference akActionRef"));

        let mut sink = Recorder::default();
        publish_script(&mut sink, &script).unwrap();
        assert_eq!(
            sink.calls,
            [
                "script Door",
                "function Door Open",
                "function Door Close",
                "event Door OnActivate",
            ]
        );
    }

    #[test]
    fn test_publish_through_trait_object() {
        let script = Script::new("Empty", "");
        let mut recorder = Recorder::default();
        let sink: &mut dyn DocSink = &mut recorder;
        publish_script(sink, &script).unwrap();
        assert_eq!(recorder.calls, ["script Empty"]);
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("Actor Script"), "Actor Script.wiki");
        assert_eq!(page_file_name("Category:Papyrus"), "Category_Papyrus.wiki");
        assert_eq!(page_file_name("Run - Mod:Widget"), "Run - Mod_Widget.wiki");
    }
}
