//! Line classification
//!
//! Each body line is tested against [`CLASSIFIERS`] in declaration order and
//! the first match wins. Classification is pure: it never looks at parser
//! state, so every rule can be tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::model::PropertyFlag;

/// Identifier: word characters plus the namespace separator and `#`
const IDENT: &str = r"[\w:#]+";
/// Type name: an identifier with an optional array suffix
const TYPE: &str = r"[\w:#]+(?:\[\])?";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid line pattern {pattern:?}: {e}"))
}

static HEADER: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^\s*ScriptName\s+(?P<name>{IDENT})(?:\s+extends\s+(?P<extends>{IDENT}))?(?P<flags>(?:\s+(?:native|hidden|sealed|conditional|global|abstract|final)\b)*)"
    ))
});
static EXAMPLE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\s*;\s*Example:(?P<rest>.*)$"));
static COMMENT: Lazy<Regex> = Lazy::new(|| compile(r"^\s*;(?P<text>.+)$"));
static PARAM_DOC: Lazy<Regex> = Lazy::new(|| compile(r"^@param\s+(?P<name>\S+)\s*(?P<text>.*)$"));
static STRUCT_END: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\s*EndStruct\b"));
static STRUCT_START: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\s*Struct\s+(?P<name>\w+)"));
static STATE_END: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\s*EndState\b"));
static STATE_START: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^\s*(?:auto\s+)?State\s+(?P<name>\w+)"));
static PROPERTY: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^\s*(?P<type>{TYPE})\s+Property\s+(?P<name>{IDENT})(?P<rest>.*)$"
    ))
});
static FUNCTION: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^\s*(?:(?P<ret>{TYPE})\s+)?Function\s+(?P<name>{IDENT})\s*\((?P<params>[^)]*)\)(?P<flags>.*)$"
    ))
});
static BLOCK_END: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^\s*End(?:Function|Event|State|Struct|Property|Group|If|While)\b")
});
static EVENT: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^\s*Event\s+(?P<name>[\w:#.]+)\s*\((?P<params>[^)]*)\)")
});

/// What a single source line means to the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `ScriptName <name> [extends <parent>] [flags...]`
    Header {
        name: &'a str,
        extends: &'a str,
        flags: Vec<&'a str>,
    },
    /// `; Example: <rest>`
    Example(&'a str),
    /// `; @param <name> <text>`
    ParamDoc { name: &'a str, text: &'a str },
    /// Any other `;` comment, trimmed
    Comment(&'a str),
    StructStart(&'a str),
    StructEnd,
    StateStart(&'a str),
    StateEnd,
    Property {
        prop_type: &'a str,
        name: &'a str,
        flag: Option<PropertyFlag>,
    },
    Function {
        return_type: &'a str,
        name: &'a str,
        params: &'a str,
        flags: &'a str,
    },
    Event { name: &'a str, params: &'a str },
    Blank,
    /// A line no rule recognizes
    Other(&'a str),
}

impl LineKind<'_> {
    /// Whether a rule recognized the line
    pub fn is_recognized(&self) -> bool {
        !matches!(self, LineKind::Blank | LineKind::Other(_))
    }
}

type Classifier = for<'a> fn(&'a str) -> Option<LineKind<'a>>;

/// Body rules in priority order
pub const CLASSIFIERS: &[(&str, Classifier)] = &[
    ("example", example),
    ("comment", comment),
    ("struct-end", struct_end),
    ("struct-start", struct_start),
    ("state-end", state_end),
    ("state-start", state_start),
    ("property", property),
    ("function", function),
    ("event", event),
];

/// Classify a line inside a script body
pub fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    CLASSIFIERS
        .iter()
        .find_map(|(name, rule)| {
            let kind = rule(line)?;
            trace!(rule = name, "classified line");
            Some(kind)
        })
        .unwrap_or_else(|| LineKind::Other(line.trim()))
}

/// Whether an unrecognized line closes an open `; Example:` capture.
///
/// Block terminators such as `EndFunction` or `EndIf`, and bare `;` lines,
/// end the example.
pub fn ends_example(text: &str) -> bool {
    text.trim_start().starts_with(';') || BLOCK_END.is_match(text)
}

/// Match a script header line
pub fn header(line: &str) -> Option<LineKind<'_>> {
    let caps = HEADER.captures(line)?;
    let name = caps.name("name")?.as_str();
    let extends = caps.name("extends").map_or("", |m| m.as_str());
    let flags = caps
        .name("flags")
        .map(|m| m.as_str().split_whitespace().collect())
        .unwrap_or_default();
    Some(LineKind::Header {
        name,
        extends,
        flags,
    })
}

fn example(line: &str) -> Option<LineKind<'_>> {
    let caps = EXAMPLE.captures(line)?;
    Some(LineKind::Example(caps.name("rest")?.as_str().trim()))
}

fn comment(line: &str) -> Option<LineKind<'_>> {
    let caps = COMMENT.captures(line)?;
    let text = caps.name("text")?.as_str().trim();
    if let Some(doc) = PARAM_DOC.captures(text) {
        return Some(LineKind::ParamDoc {
            name: doc.name("name")?.as_str(),
            text: doc.name("text").map_or("", |m| m.as_str().trim()),
        });
    }
    Some(LineKind::Comment(text))
}

fn struct_end(line: &str) -> Option<LineKind<'_>> {
    STRUCT_END.is_match(line).then_some(LineKind::StructEnd)
}

fn struct_start(line: &str) -> Option<LineKind<'_>> {
    let caps = STRUCT_START.captures(line)?;
    Some(LineKind::StructStart(caps.name("name")?.as_str()))
}

fn state_end(line: &str) -> Option<LineKind<'_>> {
    STATE_END.is_match(line).then_some(LineKind::StateEnd)
}

fn state_start(line: &str) -> Option<LineKind<'_>> {
    let caps = STATE_START.captures(line)?;
    Some(LineKind::StateStart(caps.name("name")?.as_str()))
}

fn property(line: &str) -> Option<LineKind<'_>> {
    let caps = PROPERTY.captures(line)?;
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    let flag = strip_trailing_comment(rest)
        .split_whitespace()
        .find_map(PropertyFlag::parse);
    Some(LineKind::Property {
        prop_type: caps.name("type")?.as_str(),
        name: caps.name("name")?.as_str(),
        flag,
    })
}

fn function(line: &str) -> Option<LineKind<'_>> {
    let caps = FUNCTION.captures(line)?;
    Some(LineKind::Function {
        return_type: caps.name("ret").map_or("", |m| m.as_str()),
        name: caps.name("name")?.as_str(),
        params: caps.name("params")?.as_str().trim(),
        flags: strip_trailing_comment(caps.name("flags").map_or("", |m| m.as_str())).trim(),
    })
}

fn event(line: &str) -> Option<LineKind<'_>> {
    let caps = EVENT.captures(line)?;
    Some(LineKind::Event {
        name: caps.name("name")?.as_str(),
        params: caps.name("params")?.as_str().trim(),
    })
}

fn strip_trailing_comment(text: &str) -> &str {
    text.split(';').next().unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_with_extends_and_flags() {
        let kind = header("ScriptName Foo:Bar#Baz extends ObjectReference Native Hidden").unwrap();
        assert_eq!(
            kind,
            LineKind::Header {
                name: "Foo:Bar#Baz",
                extends: "ObjectReference",
                flags: vec!["Native", "Hidden"],
            }
        );
    }

    #[test]
    fn test_header_without_extends() {
        let kind = header("scriptname Utility native").unwrap();
        assert_eq!(
            kind,
            LineKind::Header {
                name: "Utility",
                extends: "",
                flags: vec!["native"],
            }
        );
    }

    #[test]
    fn test_header_rejects_comment() {
        assert!(header("; ScriptName Foo").is_none());
    }

    #[test]
    fn test_example_wins_over_comment() {
        assert_eq!(classify("; Example: Foo()"), LineKind::Example("Foo()"));
        assert_eq!(classify("  ;Example:"), LineKind::Example(""));
    }

    #[test]
    fn test_param_doc() {
        assert_eq!(
            classify("; @param akTarget The actor to heal"),
            LineKind::ParamDoc {
                name: "akTarget",
                text: "The actor to heal",
            }
        );
    }

    #[test]
    fn test_comment_is_trimmed() {
        assert_eq!(classify(";   Heals the actor.  "), LineKind::Comment("Heals the actor."));
        assert_eq!(classify(";"), LineKind::Other(";"));
    }

    #[test]
    fn test_property_flags() {
        assert_eq!(
            classify("int Property Count auto"),
            LineKind::Property {
                prop_type: "int",
                name: "Count",
                flag: Some(PropertyFlag::Auto),
            }
        );
        assert_eq!(
            classify("ObjectReference[] Property Refs = None AutoReadOnly"),
            LineKind::Property {
                prop_type: "ObjectReference[]",
                name: "Refs",
                flag: Some(PropertyFlag::AutoReadOnly),
            }
        );
        assert_eq!(
            classify("float Property Speed"),
            LineKind::Property {
                prop_type: "float",
                name: "Speed",
                flag: None,
            }
        );
    }

    #[test]
    fn test_property_flag_after_comment_is_ignored() {
        let kind = classify("int Property Count ; not auto");
        assert!(matches!(kind, LineKind::Property { flag: None, .. }));
    }

    #[test]
    fn test_function_forms() {
        assert_eq!(
            classify("Actor Function GetTarget(int aiIndex, bool abForce = false) native global"),
            LineKind::Function {
                return_type: "Actor",
                name: "GetTarget",
                params: "int aiIndex, bool abForce = false",
                flags: "native global",
            }
        );
        assert_eq!(
            classify("function Reset()"),
            LineKind::Function {
                return_type: "",
                name: "Reset",
                params: "",
                flags: "",
            }
        );
        assert!(matches!(
            classify("int[] Function GetValues() ; helper"),
            LineKind::Function {
                return_type: "int[]",
                flags: "",
                ..
            }
        ));
    }

    #[test]
    fn test_end_markers_are_not_declarations() {
        assert_eq!(classify("EndFunction"), LineKind::Other("EndFunction"));
        assert_eq!(classify("endEvent"), LineKind::Other("endEvent"));
        assert_eq!(classify("EndStruct"), LineKind::StructEnd);
        assert_eq!(classify("  EndState"), LineKind::StateEnd);
    }

    #[test]
    fn test_states_and_structs() {
        assert_eq!(classify("Auto State Waiting"), LineKind::StateStart("Waiting"));
        assert_eq!(classify("state Busy"), LineKind::StateStart("Busy"));
        assert_eq!(classify("Struct Point"), LineKind::StructStart("Point"));
    }

    #[test]
    fn test_property_named_state_is_a_property() {
        assert!(matches!(
            classify("int Property State auto"),
            LineKind::Property { name: "State", .. }
        ));
    }

    #[test]
    fn test_remote_event() {
        assert_eq!(
            classify("Event ObjectReference.OnActivate(ObjectReference akSender, ObjectReference akActionRef)"),
            LineKind::Event {
                name: "ObjectReference.OnActivate",
                params: "ObjectReference akSender, ObjectReference akActionRef",
            }
        );
    }

    #[test]
    fn test_blank_and_other() {
        assert_eq!(classify("   "), LineKind::Blank);
        assert_eq!(classify("  x = x + 1  "), LineKind::Other("x = x + 1"));
        assert!(!classify("x = 1").is_recognized());
    }

    #[test]
    fn test_ends_example() {
        assert!(ends_example("EndFunction"));
        assert!(ends_example("  endif"));
        assert!(ends_example(";"));
        assert!(!ends_example("Endurance.SetValue(5)"));
        assert!(!ends_example("Bar()"));
    }
}
