//! Types for representing documented scripts
//!
//! A [`Script`] owns every entity declared in one source file. Collections keep
//! source order so rendered pages are stable between runs.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A script object: the top-level documented unit, similar to a class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    /// Script name as written in the header (case-sensitive)
    pub name: String,
    /// Parent script name, empty when the header has no `extends` clause
    pub extends: String,
    /// Header modifiers in source order, without duplicates
    pub flags: Vec<String>,
    /// Declared properties
    pub properties: Vec<Property>,
    /// Declared functions
    pub functions: Vec<Function>,
    /// Declared events
    pub events: Vec<Event>,
    /// Declared structs
    pub structs: Vec<Struct>,
}

impl Script {
    /// Create an empty script
    pub fn new(name: impl Into<String>, extends: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: extends.into(),
            ..Self::default()
        }
    }

    /// Add a header modifier, ignoring case-insensitive duplicates
    pub fn add_flag(&mut self, flag: &str) {
        if !self.has_flag(flag) {
            self.flags.push(flag.to_string());
        }
    }

    /// Check whether the header carries a modifier
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    /// Names of all functions and events, in declaration order
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.functions
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.events.iter().map(|e| e.name.as_str()))
    }

    /// Properties whose type is `GlobalVariable`
    pub fn global_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.is_global())
    }

    /// Properties that are not global variables
    pub fn script_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| !p.is_global())
    }

    /// Find a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Find an event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }
}

/// Property modifier recognized on a property declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFlag {
    Auto,
    AutoReadOnly,
    Const,
}

impl PropertyFlag {
    /// Parse a modifier token, ignoring case
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "autoreadonly" => Some(Self::AutoReadOnly),
            "const" => Some(Self::Const),
            _ => None,
        }
    }

    /// Canonical spelling of the modifier
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::AutoReadOnly => "autoReadOnly",
            Self::Const => "const",
        }
    }
}

impl fmt::Display for PropertyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script property
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    /// Declared type, e.g. `int` or `ObjectReference[]`
    pub prop_type: String,
    pub flag: Option<PropertyFlag>,
    /// Joined text of the comment lines preceding the declaration
    pub description: String,
}

impl Property {
    pub fn new(name: impl Into<String>, prop_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prop_type: prop_type.into(),
            flag: None,
            description: String::new(),
        }
    }

    /// Check if this property is a global variable
    pub fn is_global(&self) -> bool {
        self.prop_type.eq_ignore_ascii_case("GlobalVariable")
    }
}

/// A script function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Function {
    pub name: String,
    /// Return type, empty for functions that return nothing
    pub return_type: String,
    /// Raw parameter list between the parentheses
    pub params: String,
    /// Remainder of the declaration line after the parameter list
    pub flags: String,
    pub description: String,
    /// `@param` documentation keyed by parameter name
    pub param_docs: HashMap<String, String>,
    /// Type names referenced by the signature
    pub references: BTreeSet<String>,
    /// Lines collected from `; Example:` comments
    pub examples: Vec<String>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        params: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            params: params.into(),
            ..Self::default()
        }
    }

    /// Iterate the declared parameters
    pub fn parameters(&self) -> impl Iterator<Item = Parameter<'_>> {
        parameters(&self.params)
    }

    /// Check whether the function returns nothing
    pub fn returns_nothing(&self) -> bool {
        self.return_type.is_empty() || self.return_type.eq_ignore_ascii_case("none")
    }
}

/// A script event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub name: String,
    pub params: String,
    pub description: String,
    pub param_docs: HashMap<String, String>,
    pub references: BTreeSet<String>,
    /// Name of the enclosing `State` block, if any
    pub state: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            ..Self::default()
        }
    }

    /// Iterate the declared parameters
    pub fn parameters(&self) -> impl Iterator<Item = Parameter<'_>> {
        parameters(&self.params)
    }
}

/// A struct declared inside a script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Struct {
    pub name: String,
    /// Member declarations exactly as written, trimmed
    pub members: Vec<String>,
    pub description: String,
}

impl Struct {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
            description: String::new(),
        }
    }
}

/// One `type name[=default]` entry of a raw parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter<'a> {
    /// The whole trimmed declaration
    pub declaration: &'a str,
    /// The parameter name
    pub name: &'a str,
}

/// Split a raw parameter list into its declarations.
///
/// Empty entries are skipped. The name is the last word before any default
/// value, so `float afDelay = 0.5` yields `afDelay`.
pub fn parameters(raw: &str) -> impl Iterator<Item = Parameter<'_>> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|declaration| {
            let before_default = declaration.split('=').next().unwrap_or(declaration);
            let name = before_default
                .split_whitespace()
                .last()
                .unwrap_or(declaration);
            Parameter { declaration, name }
        })
}
