//! Typed commands produced by the interpreter

use serde::{Deserialize, Serialize};

/// Category of a parsed command, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Add,
    Remove,
    Search,
    Clear,
    Help,
    Unknown,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandKind::Add => "add",
            CommandKind::Remove => "remove",
            CommandKind::Search => "search",
            CommandKind::Clear => "clear",
            CommandKind::Help => "help",
            CommandKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A shopping command extracted from one transcript.
///
/// The payload lives on the variant, so an `Add` always carries an item and
/// a quantity while `Clear`, `Help` and `Unknown` never carry an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Put `quantity` of `item` on the list
    Add { item: String, quantity: u32 },
    /// Take `item` off the list
    Remove { item: String },
    /// Look `item` up in the product catalog
    Search { item: String },
    /// Empty the list
    Clear,
    /// Explain the available commands
    Help,
    /// Nothing matched
    Unknown,
}

impl Command {
    /// Build an `Add`, or `Unknown` when the item is blank or the quantity is zero
    pub fn add(item: &str, quantity: u32) -> Self {
        let item = item.trim();
        if item.is_empty() || quantity == 0 {
            return Command::Unknown;
        }
        Command::Add {
            item: item.to_lowercase(),
            quantity,
        }
    }

    /// Build a `Remove`, or `Unknown` when the item is blank
    pub fn remove(item: &str) -> Self {
        match normalize_item(item) {
            Some(item) => Command::Remove { item },
            None => Command::Unknown,
        }
    }

    /// Build a `Search`, or `Unknown` when the item is blank
    pub fn search(item: &str) -> Self {
        match normalize_item(item) {
            Some(item) => Command::Search { item },
            None => Command::Unknown,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Add { .. } => CommandKind::Add,
            Command::Remove { .. } => CommandKind::Remove,
            Command::Search { .. } => CommandKind::Search,
            Command::Clear => CommandKind::Clear,
            Command::Help => CommandKind::Help,
            Command::Unknown => CommandKind::Unknown,
        }
    }

    /// Item phrase for `Add`, `Remove` and `Search`
    pub fn item(&self) -> Option<&str> {
        match self {
            Command::Add { item, .. } | Command::Remove { item } | Command::Search { item } => {
                Some(item)
            }
            Command::Clear | Command::Help | Command::Unknown => None,
        }
    }

    /// Quantity, only present on `Add`
    pub fn quantity(&self) -> Option<u32> {
        match self {
            Command::Add { quantity, .. } => Some(*quantity),
            _ => None,
        }
    }
}

fn normalize_item(item: &str) -> Option<String> {
    let item = item.trim();
    (!item.is_empty()).then(|| item.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_items_collapse_to_unknown() {
        assert_eq!(Command::add("   ", 2), Command::Unknown);
        assert_eq!(Command::add("milk", 0), Command::Unknown);
        assert_eq!(Command::remove(""), Command::Unknown);
        assert_eq!(Command::search(" \t"), Command::Unknown);
    }

    #[test]
    fn test_accessors() {
        let cmd = Command::add("  Green Apples ", 4);
        assert_eq!(cmd.kind(), CommandKind::Add);
        assert_eq!(cmd.item(), Some("green apples"));
        assert_eq!(cmd.quantity(), Some(4));

        assert_eq!(Command::Clear.item(), None);
        assert_eq!(Command::remove("milk").quantity(), None);
    }

    #[test]
    fn test_command_serialization() {
        let json = serde_json::to_string(&Command::add("bread", 2)).unwrap();
        assert_eq!(json, r#"{"kind":"add","item":"bread","quantity":2}"#);

        let cmd: Command = serde_json::from_str(r#"{"kind":"clear"}"#).unwrap();
        assert_eq!(cmd, Command::Clear);
    }
}
