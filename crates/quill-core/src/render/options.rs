//! Rendering options

use std::fmt;

use chrono::{DateTime, Utc};

/// Syntax highlight element wrapped around code blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    language: String,
}

impl Highlight {
    /// Resolve a configured language name.
    ///
    /// `normal` selects the dedicated `papyrus` lexer and `fallback` selects
    /// `AutoIt`, whose keyword set is close enough to read well. Anything
    /// else is used lowercased.
    pub fn for_language(language: &str) -> Self {
        let language = match language.trim().to_ascii_lowercase().as_str() {
            "normal" | "papyrus" => "papyrus".to_string(),
            "fallback" => "AutoIt".to_string(),
            other => other.to_string(),
        };
        Self { language }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Opening tag
    pub fn open(&self) -> String {
        format!("<syntaxhighlight lang=\"{}\">", self.language)
    }

    /// Closing tag
    pub fn close(&self) -> &'static str {
        "</syntaxhighlight>"
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self::for_language("normal")
    }
}

impl fmt::Display for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)
    }
}

/// Whether and how precisely pages carry the invisible provenance comment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationMarker {
    Off,
    #[default]
    Seconds,
    Minutes,
}

impl GenerationMarker {
    /// Render the marker for a timestamp, `None` when disabled.
    pub fn render(self, at: &DateTime<Utc>) -> Option<String> {
        let stamp = match self {
            Self::Off => return None,
            Self::Seconds => at.format("%Y-%m-%dT%H:%M:%S"),
            Self::Minutes => at.format("%Y-%m-%dT%H:%M"),
        };
        Some(format!(
            "<noinclude><!-- Generated by quill at {stamp} UTC --></noinclude>"
        ))
    }
}

/// Options shared by every page a renderer produces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub highlight: Highlight,
    pub marker: GenerationMarker,
}
