//! Type-link table for cross-linking rendered pages
//!
//! The table maps bare type names to wiki link markup. [`TypeLinkTable::link`]
//! rewrites whole-word occurrences of known names and leaves everything else
//! untouched, so `Actor` is linked but `ActorValueInfo` is not.

use std::collections::HashMap;
use std::path::Path;

use crate::error::TypeListError;

/// Engine types documented out of the box
const BUILTIN_TYPES: &[&str] = &[
    "TopicInfo", "Potion", "Faction", "Math", "Flora", "InstanceNamingRules", "Note", "Game",
    "PackIn", "Class", "Perk", "IdleMarker", "Armor", "Weapon", "Container", "Terminal",
    "SpaceshipReference", "InputEnableLayer", "Form", "Actor", "Static", "MovableStatic",
    "ReferenceAlias", "ConditionForm", "LeveledItem", "TalkingActivator", "Projectile", "Race",
    "Ingredient", "Key", "LocationRefType", "Curve", "Scene", "MagicEffect", "CameraShot",
    "SoulGem", "TerminalMenu", "AssociationType", "LeveledActor", "Door", "Message",
    "GlobalVariable", "HeadPart", "SpeechChallengeObject", "Alias", "FormList",
    "ObjectReference", "Book", "WordOfPower", "Enchantment", "ActiveMagicEffect", "Package",
    "WorldSpace", "ObjectMod", "Ammo", "ImpactDataSet", "AffinityEvent", "LeveledSpaceshipBase",
    "Resource", "Hazard", "Weather", "SpaceshipBase", "Keyword", "MiscObject", "VoiceType",
    "GameplayOption", "Utility", "VisualEffect", "LocationAlias", "CombatStyle", "EffectShader",
    "ConstructibleObject", "ActorBase", "Furniture", "LeveledSpell", "Location", "Scroll",
    "Activator", "Cell", "Quest", "Planet", "Shout", "Action", "ShaderParticleGeometry",
    "WwiseEvent", "ActorValue", "Spell", "Topic", "ImageSpaceModifier", "RefCollectionAlias",
    "Outfit", "Light", "MusicType", "ResearchProject", "ScriptObject", "Idle", "Explosion",
];

/// Link markup for a script page
pub fn script_link(name: &str) -> String {
    format!("[[{} Script]]", name)
}

/// Maps type names to cross-reference markup
#[derive(Debug, Clone, Default)]
pub struct TypeLinkTable {
    entries: HashMap<String, String>,
}

impl TypeLinkTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding the built-in engine types
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.merge(BUILTIN_TYPES.iter().map(|name| (name.to_string(), script_link(name))));
        table
    }

    /// Add or overwrite entries; later merges take precedence
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.entries.extend(entries);
    }

    /// Merge a list of type names, each linked to its script page
    pub fn merge_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.merge(
            names
                .into_iter()
                .map(|n| (n.as_ref().to_string(), script_link(n.as_ref()))),
        );
    }

    /// Merge a JSON array of type names from a file.
    ///
    /// A missing file is not an error; nothing is merged. Returns the number
    /// of names read.
    pub fn merge_json_file(&mut self, path: &Path) -> Result<usize, TypeListError> {
        if !path.exists() {
            return Ok(0);
        }
        let text = std::fs::read_to_string(path)?;
        let names: Vec<String> = serde_json::from_str(&text)?;
        let count = names.len();
        self.merge_names(names);
        Ok(count)
    }

    /// Markup for a known type name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Check if a type name is known
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace whole-word occurrences of known type names with their markup.
    ///
    /// Words are runs of alphanumerics and `_`; a `:` or `#` joins two runs
    /// into one namespaced word. Text is scanned once, so inserted markup is
    /// never linked again.
    pub fn link(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut word = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            let joins_word = (c == ':' || c == '#')
                && !word.is_empty()
                && chars.peek().is_some_and(|&next| is_word_char(next));
            if is_word_char(c) || joins_word {
                word.push(c);
                continue;
            }
            self.flush_word(&mut word, &mut result);
            result.push(c);
        }
        self.flush_word(&mut word, &mut result);

        result
    }

    fn flush_word(&self, word: &mut String, out: &mut String) {
        if word.is_empty() {
            return;
        }
        match self.entries.get(word.as_str()) {
            Some(markup) => out.push_str(markup),
            None => out.push_str(word),
        }
        word.clear();
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_known_type() {
        let table = TypeLinkTable::with_builtins();
        assert_eq!(table.link("Actor"), "[[Actor Script]]");
        assert_eq!(
            table.link("Moves the Actor to a Location."),
            "Moves the [[Actor Script]] to a [[Location Script]]."
        );
    }

    #[test]
    fn test_link_requires_word_boundary() {
        let table = TypeLinkTable::with_builtins();
        assert_eq!(table.link("ActorValueInfo"), "ActorValueInfo");
        assert_eq!(table.link("MyActor_2"), "MyActor_2");
        assert_eq!(table.link("Actor[]"), "[[Actor Script]][]");
    }

    #[test]
    fn test_link_does_not_relink_markup() {
        let mut table = TypeLinkTable::new();
        table.merge([
            ("Actor".to_string(), "[[Actor Script]]".to_string()),
            ("Script".to_string(), "[[Script Script]]".to_string()),
        ]);
        assert_eq!(table.link("Actor"), "[[Actor Script]]");
    }

    #[test]
    fn test_namespaced_words() {
        let mut table = TypeLinkTable::new();
        table.merge_names(["Mod:Widget"]);
        assert_eq!(table.link("Uses Mod:Widget here"), "Uses [[Mod:Widget Script]] here");
        // a trailing colon ends the word
        table.merge_names(["Widget"]);
        assert_eq!(table.link("Widget: a thing"), "[[Widget Script]]: a thing");
    }

    #[test]
    fn test_merge_overrides_builtins() {
        let mut table = TypeLinkTable::with_builtins();
        table.merge([("Actor".to_string(), "[[Custom Actor]]".to_string())]);
        assert_eq!(table.link("Actor"), "[[Custom Actor]]");
    }

    #[test]
    fn test_merge_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("types.json");
        std::fs::write(&path, r#"["Starship", "DockingPort"]"#).unwrap();

        let mut table = TypeLinkTable::new();
        assert_eq!(table.merge_json_file(&path).unwrap(), 2);
        assert_eq!(table.link("Starship"), "[[Starship Script]]");

        let missing = dir.path().join("missing.json");
        assert_eq!(table.merge_json_file(&missing).unwrap(), 0);

        std::fs::write(&path, r#"{"not": "a list"}"#).unwrap();
        assert!(matches!(table.merge_json_file(&path), Err(TypeListError::Json(_))));
    }
}
