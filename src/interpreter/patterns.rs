//! Locale metadata and the command pattern table
//!
//! Both tables are static configuration: the locale list is a `const`, and
//! the compiled regex table is built once on first use and shared by
//! reference afterwards.

use std::sync::LazyLock;

use regex::Regex;

use super::command::CommandKind;

/// Locale used when nothing else is configured
pub const DEFAULT_LOCALE: &str = "en-US";

/// Example phrases shown to the user for each command category
#[derive(Debug, Clone, Copy)]
pub struct LocaleHints {
    pub add: &'static str,
    pub remove: &'static str,
    pub search: &'static str,
    pub clear: &'static str,
}

/// A supported recognition locale
#[derive(Debug, Clone, Copy)]
pub struct LocaleInfo {
    /// BCP-47 code handed to the recognizer and speech output
    pub code: &'static str,
    /// Display name
    pub name: &'static str,
    pub hints: LocaleHints,
}

/// Every locale the recognizer can be switched to
pub const LOCALES: [LocaleInfo; 5] = [
    LocaleInfo {
        code: "en-US",
        name: "English",
        hints: LocaleHints {
            add: r#"Try: "add milk", "buy bread", "need eggs""#,
            remove: r#"Try: "remove milk", "delete apples""#,
            search: r#"Try: "find milk", "search for bread""#,
            clear: r#"Try: "clear list", "empty list""#,
        },
    },
    LocaleInfo {
        code: "es-ES",
        name: "Spanish",
        hints: LocaleHints {
            add: r#"Try: "añadir leche", "comprar pan", "necesito huevos""#,
            remove: r#"Try: "eliminar leche", "borrar manzanas""#,
            search: r#"Try: "buscar leche", "encontrar pan""#,
            clear: r#"Try: "limpiar lista", "vaciar lista""#,
        },
    },
    LocaleInfo {
        code: "fr-FR",
        name: "French",
        hints: LocaleHints {
            add: r#"Try: "acheter lait", "ajouter pain", "j'ai besoin d'œufs""#,
            remove: r#"Try: "supprimer lait", "enlever pommes""#,
            search: r#"Try: "trouver lait", "chercher pain""#,
            clear: r#"Try: "vider liste", "effacer liste""#,
        },
    },
    LocaleInfo {
        code: "de-DE",
        name: "German",
        hints: LocaleHints {
            add: r#"Try: "kaufen Milch", "hinzufügen Brot", "brauche Eier""#,
            remove: r#"Try: "entfernen Milch", "löschen Äpfel""#,
            search: r#"Try: "finden Milch", "suchen Brot""#,
            clear: r#"Try: "Liste leeren", "Liste löschen""#,
        },
    },
    LocaleInfo {
        code: "hi-IN",
        name: "Hindi",
        hints: LocaleHints {
            add: r#"Try: "खरीदना दूध", "जोड़ना रोटी", "चाहिए अंडे""#,
            remove: r#"Try: "हटाना दूध", "मिटाना सेब""#,
            search: r#"Try: "ढूंढना दूध", "खोजना रोटी""#,
            clear: r#"Try: "सूची साफ़ करना", "सूची खाली करना""#,
        },
    },
];

/// Look up a supported locale by code
pub fn locale(code: &str) -> Option<&'static LocaleInfo> {
    LOCALES.iter().find(|info| info.code.eq_ignore_ascii_case(code))
}

/// Display name for a locale code, falling back to English
pub fn locale_name(code: &str) -> &'static str {
    locale(code).map_or(LOCALES[0].name, |info| info.name)
}

/// Add-shaped patterns in priority order. Each captures the tail after the
/// verb as `details`; the first entry keeps a leading digit quantity inside
/// the tail so quantity extraction treats it like every other pattern.
const ADD_PATTERNS: &[(&str, &str)] = &[
    ("en-US", r"add\s+(?P<details>[0-9]+\s+.+)"),
    ("en-US", r"add\s+(?P<details>.+)"),
    ("en-US", r"i\s+need\s+(?P<details>.+)"),
    ("en-US", r"buy\s+(?P<details>.+)"),
    ("en-US", r"i\s+want\s+to\s+buy\s+(?P<details>.+)"),
    ("en-US", r"get\s+(?P<details>.+)"),
    ("en-US", r"purchase\s+(?P<details>.+)"),
    ("en-US", r"need\s+(?P<details>.+)"),
    ("en-US", r"want\s+(?P<details>.+)"),
    ("es-ES", r"añadir\s+(?P<details>.+)"),
    ("es-ES", r"comprar\s+(?P<details>.+)"),
    ("fr-FR", r"acheter\s+(?P<details>.+)"),
    ("de-DE", r"kaufen\s+(?P<details>.+)"),
    ("hi-IN", r"खरीदना\s+(?P<details>.+)"),
];

const REMOVE_PATTERNS: &[(&str, &str)] = &[
    ("en-US", r"remove\s+(?P<item>.+)"),
    ("en-US", r"delete\s+(?P<item>.+)"),
    ("es-ES", r"eliminar\s+(?P<item>.+)"),
];

const SEARCH_PATTERNS: &[(&str, &str)] = &[
    ("en-US", r"find\s+(?P<item>.+)"),
    ("en-US", r"search\s+for\s+(?P<item>.+)"),
    ("es-ES", r"buscar\s+(?P<item>.+)"),
];

const CLEAR_PATTERNS: &[(&str, &str)] = &[
    ("en-US", r"clear\s+list"),
    ("en-US", r"empty\s+list"),
    ("es-ES", r"limpiar\s+lista"),
];

const HELP_PATTERNS: &[(&str, &str)] = &[("en-US", "help"), ("es-ES", "ayuda")];

/// One compiled matcher
#[derive(Debug)]
pub struct Matcher {
    /// Locale the phrase belongs to
    pub locale: &'static str,
    /// Regex used when parsing; anchored only for add patterns
    pub parse: Regex,
    /// Regex anchored at the start, used for the recognizability check
    pub anchored: Regex,
}

impl Matcher {
    fn compile(locale: &'static str, source: &str, anchor_parse: bool) -> Self {
        let anchored = compile(&format!("(?i)^{source}"));
        let parse = if anchor_parse {
            anchored.clone()
        } else {
            compile(&format!("(?i){source}"))
        };
        Self {
            locale,
            parse,
            anchored,
        }
    }
}

/// Compiled matchers for every command category
#[derive(Debug)]
pub struct PatternTable {
    pub add: Vec<Matcher>,
    pub remove: Vec<Matcher>,
    pub search: Vec<Matcher>,
    pub clear: Vec<Matcher>,
    pub help: Vec<Matcher>,
    /// Leading `<digits><space><rest>` inside an add tail
    pub digit_quantity: Regex,
    /// Leading `<number word><space><rest>` inside an add tail
    pub word_quantity: Regex,
}

static TABLE: LazyLock<PatternTable> = LazyLock::new(PatternTable::build);

impl PatternTable {
    /// The process-wide table
    pub fn shared() -> &'static PatternTable {
        &TABLE
    }

    fn build() -> Self {
        Self {
            add: category(ADD_PATTERNS, true),
            remove: category(REMOVE_PATTERNS, false),
            search: category(SEARCH_PATTERNS, false),
            clear: category(CLEAR_PATTERNS, false),
            help: category(HELP_PATTERNS, false),
            digit_quantity: compile(r"^(?P<qty>[0-9]+)\s+(?P<rest>.*)"),
            word_quantity: compile(&format!(
                r"(?i)^(?P<qty>{})\s+(?P<rest>.*)",
                super::quantity::number_word_alternation()
            )),
        }
    }

    /// Matchers of one category, in priority order
    pub fn matchers(&self, kind: CommandKind) -> &[Matcher] {
        match kind {
            CommandKind::Add => &self.add,
            CommandKind::Remove => &self.remove,
            CommandKind::Search => &self.search,
            CommandKind::Clear => &self.clear,
            CommandKind::Help => &self.help,
            CommandKind::Unknown => &[],
        }
    }

    /// Every matcher of every category
    pub fn all(&self) -> impl Iterator<Item = &Matcher> {
        self.add
            .iter()
            .chain(&self.remove)
            .chain(&self.search)
            .chain(&self.clear)
            .chain(&self.help)
    }
}

fn category(patterns: &[(&'static str, &str)], anchor_parse: bool) -> Vec<Matcher> {
    patterns
        .iter()
        .map(|&(locale, source)| Matcher::compile(locale, source, anchor_parse))
        .collect()
}

fn compile(source: &str) -> Regex {
    Regex::new(source).expect("built-in command pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builds() {
        let table = PatternTable::shared();
        assert_eq!(table.add.len(), 14);
        assert_eq!(table.remove.len(), 3);
        assert_eq!(table.search.len(), 3);
        assert_eq!(table.clear.len(), 3);
        assert_eq!(table.help.len(), 2);
        assert!(table.matchers(CommandKind::Unknown).is_empty());
    }

    #[test]
    fn test_every_non_english_locale_has_an_add_verb() {
        let table = PatternTable::shared();
        for info in LOCALES.iter().filter(|info| info.code != DEFAULT_LOCALE) {
            assert!(
                table.add.iter().any(|m| m.locale == info.code),
                "no add pattern for {}",
                info.code
            );
        }
    }

    #[test]
    fn test_locale_lookup() {
        assert_eq!(locale("es-ES").map(|l| l.name), Some("Spanish"));
        assert_eq!(locale("de-de").map(|l| l.code), Some("de-DE"));
        assert!(locale("pt-BR").is_none());
        assert_eq!(locale_name("pt-BR"), "English");
        assert_eq!(locale_name("hi-IN"), "Hindi");
    }
}
