//! Line parser for script source files
//!
//! The parser makes a single forward pass over the source. Lines before the
//! `ScriptName` header are ignored; after it each line is classified (see
//! [`classify`]) and applied to the script under construction. Lines no rule
//! recognizes are dropped without a diagnostic.

mod classify;

use std::collections::HashMap;
use std::path::Path;

use tracing::trace;

use crate::model::{Event, Function, Property, PropertyFlag, Script, Struct};

pub use classify::{classify, ends_example, header, LineKind, CLASSIFIERS};

/// Parses script source text into a [`Script`]
pub struct ScriptParser;

impl ScriptParser {
    /// Parse source text.
    ///
    /// Returns `None` when the text contains no script header; callers should
    /// skip such files rather than treat them as failures. A leading byte
    /// order mark is ignored.
    pub fn parse(source: &str) -> Option<Script> {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut state = ParseState::default();
        for (index, line) in source.lines().enumerate() {
            state.feed(index + 1, line);
        }
        state.finish()
    }

    /// Read and parse a source file
    pub fn parse_file(path: &Path) -> std::io::Result<Option<Script>> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::parse(&source))
    }
}

/// Comment text waiting for the next declaration
#[derive(Debug, Default)]
struct PendingDoc {
    lines: Vec<String>,
    params: HashMap<String, String>,
}

impl PendingDoc {
    fn take_description(&mut self) -> String {
        let description = self.lines.join(" ");
        self.lines.clear();
        self.params.clear();
        description
    }

    fn take_all(&mut self) -> (String, HashMap<String, String>) {
        let params = std::mem::take(&mut self.params);
        (self.take_description(), params)
    }
}

/// Members of the struct currently being read
#[derive(Debug)]
struct OpenStruct {
    name: String,
    members: Vec<String>,
}

/// Transient state of one parse pass
#[derive(Debug, Default)]
struct ParseState {
    script: Option<Script>,
    pending: PendingDoc,
    open_struct: Option<OpenStruct>,
    current_state: Option<String>,
    /// Set by an empty `; Example:` marker; following plain lines become examples
    capturing_example: bool,
}

impl ParseState {
    fn feed(&mut self, line_number: usize, line: &str) {
        if self.script.is_none() {
            if let Some(LineKind::Header {
                name,
                extends,
                flags,
            }) = header(line)
            {
                let mut script = Script::new(name, extends);
                for flag in flags {
                    script.add_flag(flag);
                }
                self.script = Some(script);
            }
            return;
        }

        let kind = classify(line);
        if !matches!(kind, LineKind::Example(_) | LineKind::Other(_)) {
            self.capturing_example = false;
        }

        match kind {
            LineKind::Example(rest) => self.add_example(rest),
            LineKind::ParamDoc { name, text } => {
                self.pending.params.insert(name.to_string(), text.to_string());
            }
            LineKind::Comment(text) => {
                if !text.is_empty() {
                    self.pending.lines.push(text.to_string());
                }
            }
            kind if self.open_struct.is_some() => self.feed_struct(kind, line),
            LineKind::StructStart(name) => self.open_struct(name),
            LineKind::StructEnd => trace!(line_number, "EndStruct outside of a struct"),
            LineKind::StateStart(name) => self.current_state = Some(name.to_string()),
            LineKind::StateEnd => self.current_state = None,
            LineKind::Property {
                prop_type,
                name,
                flag,
            } => self.add_property(prop_type, name, flag),
            LineKind::Function {
                return_type,
                name,
                params,
                flags,
            } => self.add_function(return_type, name, params, flags),
            LineKind::Event { name, params } => self.add_event(name, params),
            LineKind::Blank => {}
            LineKind::Other(text) => {
                if self.capturing_example && !ends_example(text) {
                    self.push_example_line(text);
                } else {
                    self.capturing_example = false;
                    trace!(line_number, line = text, "skipping unrecognized line");
                }
            }
            LineKind::Header { .. } => {}
        }
    }

    fn add_example(&mut self, rest: &str) {
        let has_function = self
            .script
            .as_ref()
            .is_some_and(|s| !s.functions.is_empty());
        if !has_function {
            self.capturing_example = false;
            return;
        }
        if rest.is_empty() {
            self.capturing_example = true;
        } else {
            self.capturing_example = false;
            self.push_example_line(rest);
        }
    }

    fn push_example_line(&mut self, text: &str) {
        let last = self.script.as_mut().and_then(|s| s.functions.last_mut());
        if let Some(function) = last {
            function.examples.push(text.to_string());
        }
    }

    fn open_struct(&mut self, name: &str) {
        self.open_struct = Some(OpenStruct {
            name: name.to_string(),
            members: Vec::new(),
        });
    }

    fn feed_struct(&mut self, kind: LineKind<'_>, line: &str) {
        match kind {
            LineKind::StructEnd => {
                let Some(open) = self.open_struct.take() else {
                    return;
                };
                let mut item = Struct::new(open.name, open.members);
                item.description = self.pending.take_description();
                if let Some(script) = self.script.as_mut() {
                    script.structs.push(item);
                }
            }
            // Nested structs are not supported; a second start restarts the member list
            LineKind::StructStart(name) => self.open_struct(name),
            LineKind::Blank => {}
            _ => {
                if let Some(open) = self.open_struct.as_mut() {
                    open.members.push(line.trim().to_string());
                }
            }
        }
    }

    fn add_property(&mut self, prop_type: &str, name: &str, flag: Option<PropertyFlag>) {
        let mut property = Property::new(name, prop_type);
        property.flag = flag;
        property.description = self.pending.take_description();
        if let Some(script) = self.script.as_mut() {
            script.properties.push(property);
        }
    }

    fn add_function(&mut self, return_type: &str, name: &str, params: &str, flags: &str) {
        let (description, param_docs) = self.pending.take_all();
        let mut function = Function::new(name, return_type, params);
        function.flags = flags.to_string();
        function.description = description;
        function.param_docs = param_docs;
        if let Some(script) = self.script.as_mut() {
            script.functions.push(function);
        }
    }

    fn add_event(&mut self, name: &str, params: &str) {
        let (description, param_docs) = self.pending.take_all();
        let mut event = Event::new(name, params);
        event.description = description;
        event.param_docs = param_docs;
        event.state = self.current_state.clone();
        if let Some(script) = self.script.as_mut() {
            script.events.push(event);
        }
    }

    fn finish(self) -> Option<Script> {
        self.script
    }
}
