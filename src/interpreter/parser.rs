//! Transcript to command parsing

use tracing::trace;

use super::command::{Command, CommandKind};
use super::patterns::PatternTable;
use super::quantity::normalize_quantity;

/// Deterministic pattern matcher over lower-cased transcripts
#[derive(Debug, Clone, Copy)]
pub struct Interpreter {
    table: &'static PatternTable,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter over the shared pattern table
    pub fn new() -> Self {
        Self {
            table: PatternTable::shared(),
        }
    }

    /// Parse a transcript into a command.
    ///
    /// Categories are tried in the order add, remove, search, clear, help;
    /// inside a category the first matching pattern wins. Anything that
    /// matches nothing is `Command::Unknown`.
    pub fn parse(&self, transcript: &str) -> Command {
        let command = self
            .parse_add(transcript)
            .or_else(|| self.capture_item(CommandKind::Remove, transcript).map(|item| Command::remove(&item)))
            .or_else(|| self.capture_item(CommandKind::Search, transcript).map(|item| Command::search(&item)))
            .or_else(|| self.contains(CommandKind::Clear, transcript).then_some(Command::Clear))
            .or_else(|| self.contains(CommandKind::Help, transcript).then_some(Command::Help))
            .unwrap_or(Command::Unknown);

        trace!(transcript, kind = %command.kind(), "transcript parsed");
        command
    }

    /// Whether the transcript starts with any known command phrase
    pub fn is_recognized(&self, transcript: &str) -> bool {
        self.table.all().any(|m| m.anchored.is_match(transcript))
    }

    fn parse_add(&self, transcript: &str) -> Option<Command> {
        let details = self
            .table
            .add
            .iter()
            .find_map(|m| m.parse.captures(transcript))?
            .name("details")?
            .as_str();

        let (quantity, item) = self.split_quantity(details);
        Some(Command::add(item, quantity))
    }

    /// Split a leading quantity off an add tail. Digits are checked before
    /// number words, and a prefix that does not normalize to a positive
    /// quantity stays part of the item.
    fn split_quantity<'a>(&self, details: &'a str) -> (u32, &'a str) {
        for regex in [&self.table.digit_quantity, &self.table.word_quantity] {
            let Some(caps) = regex.captures(details) else {
                continue;
            };
            let (Some(qty), Some(rest)) = (caps.name("qty"), caps.name("rest")) else {
                continue;
            };
            match normalize_quantity(qty.as_str()) {
                Some(quantity) if quantity > 0 => return (quantity, rest.as_str()),
                _ => continue,
            }
        }
        (1, details)
    }

    fn capture_item(&self, kind: CommandKind, transcript: &str) -> Option<String> {
        self.table
            .matchers(kind)
            .iter()
            .find_map(|m| m.parse.captures(transcript))
            .and_then(|caps| caps.name("item").map(|item| item.as_str().to_owned()))
    }

    fn contains(&self, kind: CommandKind, transcript: &str) -> bool {
        self.table
            .matchers(kind)
            .iter()
            .any(|m| m.parse.is_match(transcript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(transcript: &str) -> Command {
        Interpreter::new().parse(transcript)
    }

    fn add(item: &str, quantity: u32) -> Command {
        Command::Add {
            item: item.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_add_without_quantity() {
        for s in ["milk", "  milk  ", "whole grain bread", "ice cream "] {
            assert_eq!(parse(&format!("add {s}")), add(s.trim(), 1), "add {s:?}");
        }
    }

    #[test]
    fn test_add_with_digit_quantity() {
        assert_eq!(parse("add 2 apples"), add("apples", 2));
        assert_eq!(parse("add 12 eggs"), add("eggs", 12));
        assert_eq!(parse("buy 3 bananas"), add("bananas", 3));
    }

    #[test]
    fn test_add_with_word_quantity() {
        assert_eq!(parse("add three apples"), add("apples", 3));
        assert_eq!(parse("i need ten eggs"), add("eggs", 10));
        assert_eq!(parse("purchase one cheese"), add("cheese", 1));
    }

    #[test]
    fn test_quantity_only_as_prefix() {
        assert_eq!(parse("add milk 2"), add("milk 2", 1));
        assert_eq!(parse("add milk two"), add("milk two", 1));
    }

    #[test]
    fn test_digit_quantity_wins_over_word() {
        assert_eq!(parse("add 2 three apples"), add("three apples", 2));
    }

    #[test]
    fn test_non_positive_or_oversized_quantity_stays_in_item() {
        assert_eq!(parse("add 0 apples"), add("0 apples", 1));
        assert_eq!(parse("add 99999999999 apples"), add("99999999999 apples", 1));
    }

    #[test]
    fn test_add_synonyms() {
        assert_eq!(parse("i need apples"), add("apples", 1));
        assert_eq!(parse("buy bread"), add("bread", 1));
        assert_eq!(parse("i want to buy oranges"), add("oranges", 1));
        assert_eq!(parse("get bread"), add("bread", 1));
        assert_eq!(parse("purchase eggs"), add("eggs", 1));
        assert_eq!(parse("need eggs"), add("eggs", 1));
        assert_eq!(parse("want cheese"), add("cheese", 1));
    }

    #[test]
    fn test_add_is_anchored() {
        // "add" mid-sentence is not an add command
        assert_eq!(parse("please add milk"), Command::Unknown);
        assert_eq!(parse("address book"), Command::Unknown);
    }

    #[test]
    fn test_locale_add_verbs() {
        assert_eq!(parse("añadir leche"), add("leche", 1));
        assert_eq!(parse("comprar pan"), add("pan", 1));
        assert_eq!(parse("acheter lait"), add("lait", 1));
        assert_eq!(parse("kaufen brot"), add("brot", 1));
        assert_eq!(parse("खरीदना दूध"), add("दूध", 1));
    }

    #[test]
    fn test_locale_add_verbs_take_quantities() {
        assert_eq!(parse("comprar 4 manzanas"), add("manzanas", 4));
    }

    #[test]
    fn test_blank_add_item_is_unknown() {
        assert_eq!(parse("add   "), Command::Unknown);
        assert_eq!(parse("add 2  "), Command::Unknown);
    }

    #[test]
    fn test_remove() {
        let milk = Command::Remove {
            item: "milk".to_string(),
        };
        assert_eq!(parse("remove milk"), milk);
        assert_eq!(parse("delete milk"), milk);
        assert_eq!(parse("eliminar leche").item(), Some("leche"));
        assert_eq!(parse("please remove milk"), milk);
    }

    #[test]
    fn test_search() {
        let milk = Command::Search {
            item: "milk".to_string(),
        };
        assert_eq!(parse("find milk"), milk);
        assert_eq!(parse("search for milk"), milk);
        assert_eq!(parse("buscar leche").item(), Some("leche"));
    }

    #[test]
    fn test_add_beats_remove() {
        assert_eq!(parse("buy remove milk").kind(), CommandKind::Add);
    }

    #[test]
    fn test_clear() {
        assert_eq!(parse("clear list"), Command::Clear);
        assert_eq!(parse("empty list"), Command::Clear);
        assert_eq!(parse("limpiar lista"), Command::Clear);
        assert_eq!(parse("please clear list now"), Command::Clear);
    }

    #[test]
    fn test_help() {
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("ayuda"), Command::Help);
        assert_eq!(parse("can you help me"), Command::Help);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(parse(""), Command::Unknown);
        assert_eq!(parse("xyz nonsense"), Command::Unknown);
        assert_eq!(parse("supprimer lait"), Command::Unknown);
    }

    #[test]
    fn test_parse_is_deterministic() {
        for t in ["add 2 apples", "remove milk", "xyz", "clear list", ""] {
            assert_eq!(parse(t), parse(t));
        }
    }

    #[test]
    fn test_is_recognized() {
        let interpreter = Interpreter::new();
        assert!(interpreter.is_recognized("add milk"));
        assert!(interpreter.is_recognized("remove milk"));
        assert!(interpreter.is_recognized("help me"));
        assert!(interpreter.is_recognized("limpiar lista"));
        // Unanchored matches still parse, but are not "recognized"
        assert!(!interpreter.is_recognized("please remove milk"));
        assert!(!interpreter.is_recognized("xyz nonsense"));
        assert!(!interpreter.is_recognized(""));
    }
}
