//! Landing page listing every documented script

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::discover::collect_source_files;
use crate::error::SinkError;
use crate::model::Script;
use crate::sink::{page_file_name, DocSink};

/// Title of the generated index page
pub const INDEX_TITLE: &str = "Category:Papyrus";

const SIDEBAR: &[&str] = &[
    "|style=\"color:black;\" width=\"30%\" border=\"0\" cellpadding=\"5\" valign=\"top\"|",
    "== Papyrus Index ==",
    "=== Concepts ===",
    "* [[Differences_from_Previous_Scripting|Differences from Previous Scripting]]",
    "* [[Extending Scripts (Papyrus)|Extending Scripts]]",
    "* [[Persistence (Papyrus)|Persistence]]",
    "",
    "=== Language ===",
    "* [[Operator_Reference|Operators]]",
    "* [[Expression_Reference|Expressions]]",
    "* [[Statement_Reference|Statements]]",
    "* [[Function_Reference|Functions]]",
    "* [[States (Papyrus)|States]]",
    "",
    "=== Types ===",
    "* [[:Category:Script Objects|Objects]]",
    "* [[Variables and Properties (Papyrus)|Variables & Properties]]",
    "* [[Arrays (Papyrus)|Arrays]]",
    "* [[Structs (Papyrus)|Structs]]",
    "",
    "=== Events ===",
    "* [[:Category:Events|Events]]",
    "* [[Remote Papyrus Event Registration|Remote Event Registrations]]",
    "* [[Custom Papyrus Events|Custom Events]]",
    "",
    "=== External Text Editors ===",
    "* [[:Category:Text Editors|Choosing a Text Editor]]",
    "* [[Visual Studio Code]]",
    "",
    "=== Compiler ===",
    "* [[Papyrus Compiler Reference|Compiler Reference]]",
    "* [[Papyrus Compiler Errors|Papyrus Compiler Errors]]",
    "* [[:Category:Papyrus Configurations|Papyrus Configurations]]",
    "* [[Papyrus Projects]]",
    "",
    "=== Reference Pages ===",
    "* [[Papyrus FAQs]]",
    "* [[:Category:Papyrus Language Reference|Papyrus Language Reference]]",
    "* [[Papyrus Runtime Errors]]",
    "* [[INI Settings (Papyrus)|Papyrus-related INI Settings]]",
    "* [[Game Settings (Papyrus)|Papyrus-Related Game Settings]]",
    "* [[Console Commands (Papyrus)|Papyrus-Related Console Commands]]",
    "* [[Papyrus_Glossary|Glossary of Terms]]",
    "|-",
    "|colspan=2|",
    "|}",
];

/// Collects script names and renders the `Category:Papyrus` page
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    project_name: String,
    scripts: BTreeSet<String>,
}

impl IndexBuilder {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            scripts: BTreeSet::new(),
        }
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        self.scripts.insert(name.into());
    }

    pub fn add_script(&mut self, script: &Script) {
        self.add_name(script.name.clone());
    }

    /// Add the file stem of every source file under `dir`.
    ///
    /// Returns the number of files found.
    pub fn scan_directory(&mut self, dir: &Path) -> io::Result<usize> {
        let files = collect_source_files(dir)?;
        for file in &files {
            if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
                self.add_name(stem);
            }
        }
        Ok(files.len())
    }

    /// Script names in page order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Render the index page text.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = vec![
            "__NOTOC__ __NOEDITSECTION__".into(),
            String::new(),
            "{|style=\"color:black;\" width=\"100%\" border=\"0\" cellpadding=\"5\" valign=\"top\"".into(),
            "|valign=\"top\"|".into(),
            String::new(),
            format!("== Welcome to the {} Papyrus Reference ==", self.project_name),
            "Papyrus is a lightweight, event-driven scripting system used for building gameplay \
             logic and modular interactions, using Scripts as a sort of type or class, with \
             elements of the language Pascal, UnrealScript, and C#/Java. This index is \
             automatically generated from available .psc source files. Each linked script page \
             includes member functions, events, and properties."
                .into(),
            String::new(),
            "== Papyrus Reference Index ==".into(),
            "This page provides a concise, automatically generated listing of all Papyrus script \
             reference pages in this documentation set."
                .into(),
            String::new(),
            "=== Script Objects ===".into(),
        ];

        lines.extend(self.scripts.iter().map(|name| format!("* [[{name} Script]]")));

        lines.extend(
            [
                "",
                "=== Additional Categories ===",
                "* [[:Category:Scripting]]",
                "* [[:Category:Papyrus]]",
                "* [[:Category:Events]]",
                "* [[:Category:Script Objects|All Script Objects]]",
                "== Adding Custom Types ==",
                "You can extend this index by supplying a JSON file listing user-defined \
                 essential types. Example:",
                "<syntaxhighlight lang=\"json\">",
                "[\"MyCustomShip\", \"PlanetObject\", \"DockingPort\"]",
                "</syntaxhighlight>",
                "",
                "== See Also ==",
                "* [[Papyrus Language Reference]]",
                "* [[Variables and Properties (Papyrus)|Variables & Properties]]",
                "* [[Structs (Papyrus)|Structs]]",
                "* [[Operator Reference|Operators]]",
                "* [[Event Reference|Events]]",
                "",
            ]
            .into_iter()
            .chain(SIDEBAR.iter().copied())
            .chain([
                "",
                "[[Category:Scripting]]",
                "[[Category:Papyrus]]",
                "[[Category:Script Objects]]",
            ])
            .map(String::from),
        );

        lines.join("\n")
    }

    /// Write the index as a misc page of a sink.
    pub fn write_to<S: DocSink + ?Sized>(&self, sink: &mut S) -> Result<(), SinkError> {
        debug!(scripts = self.scripts.len(), sink = sink.kind(), "writing index");
        sink.write_misc(INDEX_TITLE, &self.render())
    }

    /// Write the index as `Category_Papyrus.wiki` into a directory.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, SinkError> {
        let path = dir.join(page_file_name(INDEX_TITLE));
        std::fs::write(&path, self.render()).map_err(|source| SinkError::Io {
            operation: "write index",
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), scripts = self.scripts.len(), "wrote index");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_sorted_and_unique() {
        let mut index = IndexBuilder::new("Starfield");
        index.add_name("Quest");
        index.add_name("Actor");
        index.add_script(&Script::new("Quest", "Form"));
        assert_eq!(index.names().collect::<Vec<_>>(), ["Actor", "Quest"]);

        let page = index.render();
        assert!(page.contains("== Welcome to the Starfield Papyrus Reference =="));
        assert!(page.contains("=== Script Objects ===\n* [[Actor Script]]\n* [[Quest Script]]\n\n"));
        assert!(page.starts_with("__NOTOC__ __NOEDITSECTION__"));
        assert!(page.ends_with("[[Category:Scripting]]\n[[Category:Papyrus]]\n[[Category:Script Objects]]"));
    }

    #[test]
    fn test_scan_directory_uses_file_stems() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("Door.psc"), "").unwrap();
        std::fs::write(dir.path().join("nested/Lever.psc"), "").unwrap();
        std::fs::write(dir.path().join("readme.md"), "").unwrap();

        let mut index = IndexBuilder::new("Test");
        assert_eq!(index.scan_directory(dir.path()).unwrap(), 2);
        assert_eq!(index.names().collect::<Vec<_>>(), ["Door", "Lever"]);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = IndexBuilder::new("Test");
        index.add_name("Door");
        let path = index.write_to_dir(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Category_Papyrus.wiki"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), index.render());
    }
}
