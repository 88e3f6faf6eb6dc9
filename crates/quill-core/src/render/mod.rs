//! Wiki page rendering
//!
//! A [`Renderer`] turns model entities into MediaWiki markup. Output depends
//! only on the entity, the shared [`TypeLinkTable`] and the [`RenderOptions`],
//! so every sink stores the same text for the same input.

mod options;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::links::{script_link, TypeLinkTable};
use crate::model::{self, Event, Function, Property, Script, Struct};

pub use options::{GenerationMarker, Highlight, RenderOptions};

static MENTIONS_RETURN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\breturn").expect("return pattern is valid"));

const CATEGORY_HEADER: [&str; 2] = ["[[Category:Scripting]]", "[[Category:Papyrus]]"];

/// Title of a function or event page, e.g. `MoveTo - ObjectReference`
pub fn member_title(member: &str, script_name: &str) -> String {
    format!("{member} - {script_name}")
}

/// Title of a script page, e.g. `Actor Script`
pub fn script_title(script_name: &str) -> String {
    format!("{script_name} Script")
}

/// Line-oriented page buffer, joined with `\n` and no trailing newline
#[derive(Default)]
struct Page {
    lines: Vec<String>,
}

impl Page {
    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Renders script, function and event pages
#[derive(Debug, Clone)]
pub struct Renderer {
    options: RenderOptions,
    links: Arc<TypeLinkTable>,
    generated_at: DateTime<Utc>,
}

impl Renderer {
    /// Create a renderer stamped with the current time.
    pub fn new(options: RenderOptions, links: Arc<TypeLinkTable>) -> Self {
        Self {
            options,
            links,
            generated_at: Utc::now(),
        }
    }

    /// Fix the generation marker timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn links(&self) -> &TypeLinkTable {
        &self.links
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// The provenance comment, if enabled
    pub fn marker(&self) -> Option<String> {
        self.options.marker.render(&self.generated_at)
    }

    /// Render the overview page of a script.
    pub fn script_page(&self, script: &Script) -> String {
        let highlight = &self.options.highlight;
        let mut page = Page::default();

        if !script.extends.is_empty() {
            page.line(format!("'''Extends:''' {}", script_link(&script.extends)));
            page.blank();
        }
        page.line(format!("Script for manipulating {} instances.", script.name));
        page.blank();

        page.line("== Definition ==");
        page.line(highlight.open());
        page.line(Self::header_line(script));
        page.line(highlight.close());
        page.blank();

        if !script.extends.is_empty() {
            let chain = if self.links.contains(&script.extends) {
                format!("{} → {}", script.extends, script.name)
            } else {
                script.name.clone()
            };
            page.extend(["== Inheritance ==".to_string(), chain, String::new()]);
        }

        page.extend([
            "== Summary ==".to_string(),
            "{| class=\"wikitable\"".to_string(),
            "! Category !! Count".to_string(),
            format!("|-\n| Properties || {}", script.properties.len()),
            format!("|-\n| Functions || {}", script.functions.len()),
            format!("|-\n| Events || {}", script.events.len()),
            "|}".to_string(),
            String::new(),
        ]);

        if !script.structs.is_empty() {
            page.line("== Structs ==");
            for item in &script.structs {
                page.line(self.struct_section(item));
            }
            page.blank();
        }

        if !script.properties.is_empty() {
            page.line("== Properties ==");
            let globals: Vec<_> = script.global_properties().collect();
            if !globals.is_empty() {
                page.line("=== Global Properties ===");
                page.extend(globals.into_iter().map(|p| self.property_line(p)));
                page.blank();
            }
            let locals: Vec<_> = script.script_properties().collect();
            if !locals.is_empty() {
                page.line("=== Script Properties ===");
                page.extend(locals.into_iter().map(|p| self.property_line(p)));
                page.blank();
            }
        }

        if !script.functions.is_empty() {
            page.line("== Member Functions ==");
            for function in &script.functions {
                page.line(format!(
                    "*Function [[{}|{}]]({})",
                    member_title(&function.name, &script.name),
                    function.name,
                    function.params
                ));
                if !function.description.is_empty() {
                    page.line(format!("**{}", function.description));
                }
            }
            page.blank();
        }

        if !script.events.is_empty() {
            page.line("== Events ==");
            for event in &script.events {
                page.line(format!(
                    "*Event [[{}|{}]]({})",
                    member_title(&event.name, &script.name),
                    event.name,
                    event.params
                ));
                if !event.description.is_empty() {
                    page.line(format!("**{}", event.description));
                }
            }
            page.blank();
        }

        page.extend(CATEGORY_HEADER);
        page.line("[[Category:Script Objects]]");
        page.extend(self.marker());
        page.finish()
    }

    /// Render the page of a single function.
    pub fn function_page(&self, script_name: &str, function: &Function) -> String {
        let highlight = &self.options.highlight;
        let mut page = Page::default();

        let description = function.description.trim();
        let description = if description.is_empty() {
            format!("Documentation for {}.", function.name)
        } else {
            self.links.link(description)
        };

        page.extend(CATEGORY_HEADER);
        page.line(format!("'''Member of:''' {}", script_link(script_name)));
        page.blank();
        page.line(description);
        page.blank();

        let mut syntax = format!(
            "{} Function {}({})",
            function.return_type, function.name, function.params
        )
        .trim()
        .to_string();
        let flags = function.flags.trim();
        if !flags.is_empty() {
            syntax.push(' ');
            syntax.push_str(flags);
        }
        page.extend(["== Syntax ==".to_string(), highlight.open(), syntax]);
        page.line(highlight.close());

        if !flags.is_empty() && !flags.eq_ignore_ascii_case("native") {
            page.blank();
            page.line("== Flags ==");
            page.extend(
                flags
                    .split_whitespace()
                    .map(|flag| format!("*'''{}'''", capitalize(flag))),
            );
        }

        page.blank();
        page.line("== Parameters ==");
        Self::push_parameters(&mut page, &function.params, &function.param_docs);

        page.blank();
        page.line("== Return Value ==");
        page.line(self.return_value(function));

        page.blank();
        page.line("== Examples ==");
        page.line(highlight.open());
        if function.examples.is_empty() {
            let args: Vec<_> = function.parameters().map(|p| p.name).collect();
            page.line(format!("; Example usage of {}", function.name));
            page.line(format!("result = {}({})", function.name, args.join(", ")));
        } else {
            page.extend(function.examples.iter().map(String::as_str));
        }
        page.line(highlight.close());

        page.blank();
        page.line("== See Also ==");
        page.line(format!("*{}", script_link(script_name)));
        page.extend(function.references.iter().map(|r| format!("*{}", script_link(r))));
        page.extend(self.marker());
        page.finish()
    }

    /// Render the page of a single event.
    pub fn event_page(&self, script_name: &str, event: &Event) -> String {
        let highlight = &self.options.highlight;
        let mut page = Page::default();

        page.extend(CATEGORY_HEADER);
        page.line("[[Category:Events]]");
        page.line(format!("'''Member of:''' {}", script_link(script_name)));
        page.blank();
        if event.description.is_empty() {
            page.line(format!("Event called when {} occurs.", event.name));
        } else {
            page.line(event.description.as_str());
        }
        page.blank();
        if let Some(state) = &event.state {
            page.line(format!("'''State:''' {state}"));
            page.blank();
        }

        let signature = format!("Event {}({})", event.name, event.params);
        page.extend([
            "== Syntax ==".to_string(),
            highlight.open(),
            signature.clone(),
        ]);
        page.line(highlight.close());

        page.blank();
        page.line("== Parameters ==");
        Self::push_parameters(&mut page, &event.params, &event.param_docs);

        page.blank();
        page.extend([
            "== Examples ==".to_string(),
            highlight.open(),
            signature,
            format!(" Debug.Trace(\"{} triggered\")", event.name),
            "endEvent".to_string(),
        ]);
        page.line(highlight.close());

        page.blank();
        page.line("== See Also ==");
        page.line(format!("*{}", script_link(script_name)));
        page.extend(event.references.iter().map(|r| format!("*{}", script_link(r))));
        page.extend(self.marker());
        page.finish()
    }

    /// Render a struct as a section of its script page.
    pub fn struct_section(&self, item: &Struct) -> String {
        let highlight = &self.options.highlight;
        let mut page = Page::default();
        page.line(format!("=== {} ===", item.name));
        if !item.description.is_empty() {
            page.line(item.description.as_str());
        }
        page.line(highlight.open());
        page.line(format!("Struct {}", item.name));
        page.extend(item.members.iter().map(|m| format!(" {m}")));
        page.line("EndStruct");
        page.line(highlight.close());
        page.blank();
        page.extend(item.members.iter().map(|m| format!("*'''{m}'''")));
        page.finish()
    }

    /// Render a property as a bullet line.
    pub fn property_line(&self, property: &Property) -> String {
        let mut line = format!(
            "*{} {}",
            self.links.link(&property.prop_type),
            property.name
        );
        if let Some(flag) = property.flag {
            line.push_str(&format!(" [{flag}]"));
        }
        if !property.description.is_empty() {
            line.push_str(": ");
            line.push_str(&property.description);
        }
        line
    }

    fn header_line(script: &Script) -> String {
        let mut line = format!("ScriptName {}", script.name);
        if !script.extends.is_empty() {
            line.push_str(" extends ");
            line.push_str(&script.extends);
        }
        for flag in &script.flags {
            line.push(' ');
            line.push_str(flag);
        }
        line
    }

    fn push_parameters(page: &mut Page, raw: &str, docs: &HashMap<String, String>) {
        let mut any = false;
        for param in model::parameters(raw) {
            any = true;
            match docs.get(param.name).filter(|d| !d.is_empty()) {
                Some(doc) => page.line(format!("*'''{}''': {}", param.declaration, doc)),
                None => page.line(format!("*'''{}'''", param.declaration)),
            }
        }
        if !any {
            page.line("None.");
        }
    }

    fn return_value(&self, function: &Function) -> String {
        if function.returns_nothing() {
            return "None.".to_string();
        }
        let linked = self.links.link(&function.return_type);
        if MENTIONS_RETURN.is_match(&function.description) {
            format!("The function returns a {linked}.")
        } else {
            format!("The {linked} that this function returns.")
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyFlag;
    use chrono::TimeZone;

    fn renderer(marker: GenerationMarker) -> Renderer {
        let options = RenderOptions {
            marker,
            ..RenderOptions::default()
        };
        Renderer::new(options, Arc::new(TypeLinkTable::with_builtins()))
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
    }

    fn sample_function() -> Function {
        let mut function = Function::new("MoveTo", "", "ObjectReference akTarget, float afOffset = 0.0");
        function.flags = "native".to_string();
        function.param_docs.insert("akTarget".to_string(), "Where to go".to_string());
        function.references.insert("ObjectReference".to_string());
        function
    }

    #[test]
    fn test_function_page_layout() {
        let page = renderer(GenerationMarker::Off).function_page("Actor", &sample_function());
        let expected = "\
[[Category:Scripting]]
[[Category:Papyrus]]
'''Member of:''' [[Actor Script]]

Documentation for MoveTo.

== Syntax ==
<syntaxhighlight lang=\"papyrus\">
Function MoveTo(ObjectReference akTarget, float afOffset = 0.0) native
</syntaxhighlight>

== Parameters ==
*'''ObjectReference akTarget''': Where to go
*'''float afOffset = 0.0'''

== Return Value ==
None.

== Examples ==
<syntaxhighlight lang=\"papyrus\">
; Example usage of MoveTo
result = MoveTo(akTarget, afOffset)
</syntaxhighlight>

== See Also ==
*[[Actor Script]]
*[[ObjectReference Script]]";
        assert_eq!(page, expected);
    }

    #[test]
    fn test_function_flags_and_return() {
        let mut function = Function::new("GetTarget", "Actor", "");
        function.flags = "global native".to_string();
        function.description = "Returns the current target.".to_string();
        let page = renderer(GenerationMarker::Off).function_page("Quest", &function);
        assert!(page.contains("Actor Function GetTarget() global native"));
        assert!(page.contains("== Flags ==\n*'''Global'''\n*'''Native'''"));
        assert!(page.contains("== Parameters ==\nNone."));
        assert!(page.contains("The function returns a [[Actor Script]]."));
    }

    #[test]
    fn test_return_phrasing_without_mention() {
        let function = Function::new("GetCount", "int", "");
        let page = renderer(GenerationMarker::Off).function_page("Quest", &function);
        assert!(page.contains("The int that this function returns."));
        assert!(!page.contains("== Flags =="));
    }

    #[test]
    fn test_function_description_is_linked() {
        let mut function = Function::new("Kill", "", "");
        function.description = "Kills the Actor outright.".to_string();
        let page = renderer(GenerationMarker::Off).function_page("Actor", &function);
        assert!(page.contains("\nKills the [[Actor Script]] outright.\n"));
    }

    #[test]
    fn test_collected_examples_used() {
        let mut function = Function::new("Kill", "", "");
        function.examples = vec!["Game.GetPlayer().Kill()".to_string()];
        let page = renderer(GenerationMarker::Off).function_page("Actor", &function);
        assert!(page.contains(
            "<syntaxhighlight lang=\"papyrus\">\nGame.GetPlayer().Kill()\n</syntaxhighlight>"
        ));
        assert!(!page.contains("Example usage"));
    }

    #[test]
    fn test_marker_appended() {
        let page = renderer(GenerationMarker::Seconds).function_page("Actor", &sample_function());
        assert!(page.ends_with(
            "*[[ObjectReference Script]]\n<noinclude><!-- Generated by quill at 2025-01-02T03:04:05 UTC --></noinclude>"
        ));
    }

    #[test]
    fn test_event_page() {
        let mut event = Event::new("OnHit", "ObjectReference akAggressor");
        event.state = Some("Busy".to_string());
        event.param_docs.insert("akAggressor".to_string(), "Who hit us".to_string());
        let page = renderer(GenerationMarker::Minutes).event_page("Actor", &event);
        assert!(page.starts_with("[[Category:Scripting]]\n[[Category:Papyrus]]\n[[Category:Events]]"));
        assert!(page.contains("Event called when OnHit occurs."));
        assert!(page.contains("'''State:''' Busy"));
        assert!(page.contains("*'''ObjectReference akAggressor''': Who hit us"));
        assert!(page.contains(" Debug.Trace(\"OnHit triggered\")\nendEvent"));
        assert!(page.ends_with("at 2025-01-02T03:04 UTC --></noinclude>"));
    }

    #[test]
    fn test_script_page_sections() {
        let mut script = Script::new("MyQuest", "Quest");
        script.add_flag("conditional");
        let mut global = Property::new("GameHour", "GlobalVariable");
        global.flag = Some(PropertyFlag::Auto);
        script.properties.push(global);
        let mut count = Property::new("Count", "int");
        count.description = "Times run".to_string();
        script.properties.push(count);
        let mut start = Function::new("Begin", "", "");
        start.description = "Starts things.".to_string();
        script.functions.push(start);
        script.events.push(Event::new("OnInit", ""));
        script.structs.push(Struct::new("Entry", vec!["int Value".to_string()]));

        let page = renderer(GenerationMarker::Off).script_page(&script);
        assert!(page.starts_with("'''Extends:''' [[Quest Script]]\n\nScript for manipulating MyQuest instances."));
        assert!(page.contains("ScriptName MyQuest extends Quest conditional"));
        assert!(page.contains("== Inheritance ==\nQuest → MyQuest"));
        assert!(page.contains("| Properties || 2"));
        assert!(page.contains("=== Global Properties ===\n*[[GlobalVariable Script]] GameHour [auto]"));
        assert!(page.contains("=== Script Properties ===\n*int Count: Times run"));
        assert!(page.contains("*Function [[Begin - MyQuest|Begin]]()\n**Starts things."));
        assert!(page.contains("*Event [[OnInit - MyQuest|OnInit]]()"));
        assert!(page.contains("=== Entry ===\n<syntaxhighlight lang=\"papyrus\">\nStruct Entry\n int Value\nEndStruct"));
        assert!(page.ends_with("[[Category:Script Objects]]"));
    }

    #[test]
    fn test_unknown_parent_has_no_chain() {
        let script = Script::new("Child", "CustomBase");
        let page = renderer(GenerationMarker::Off).script_page(&script);
        assert!(page.contains("== Inheritance ==\nChild\n"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let a = renderer(GenerationMarker::Seconds);
        let b = a.clone();
        let function = sample_function();
        assert_eq!(a.function_page("Actor", &function), b.function_page("Actor", &function));
    }

    #[test]
    fn test_fallback_highlight() {
        let options = RenderOptions {
            highlight: Highlight::for_language("fallback"),
            marker: GenerationMarker::Off,
        };
        let r = Renderer::new(options, Arc::new(TypeLinkTable::new()));
        let page = r.event_page("Actor", &Event::new("OnLoad", ""));
        assert!(page.contains("<syntaxhighlight lang=\"AutoIt\">\nEvent OnLoad()"));
    }
}
