//! Command execution against the shopping list and product catalog
//!
//! The session controller hands every interpreted [`Command`] to an
//! [`ActionDispatcher`]. [`ShoppingDispatcher`] is the daemon's
//! implementation: it edits the list, searches the catalog, persists
//! changes and reports everything through [`Feedback`].

mod catalog;
mod list;
mod store;

use chrono::Local;
use tracing::{debug, error, info};

use crate::events::{AssistantEvent, Feedback, NoticeKind};
use crate::interpreter::Command;

pub use catalog::{categorize, Catalog, Product};
pub use list::{AddOutcome, ListItem, ShoppingList};
pub use store::{ListStore, StoreError};

/// Executes interpreted commands
pub trait ActionDispatcher: Send {
    fn dispatch(&mut self, command: &Command, locale: &str);

    /// Remove one list entry by id, e.g. from a remove button
    fn remove_item(&mut self, id: u64, locale: &str);
}

const HELP_TEXT: &str = "\
Available voice commands:

Add items:
  \"add milk\" or \"add 2 apples\"
  \"buy bread\" or \"purchase eggs\"
  \"i need apples\" or \"i want to buy oranges\"
  \"get bread\" or \"want cheese\"

Add in other languages:
  Spanish: \"añadir leche\", \"comprar pan\"
  French: \"acheter lait\"
  German: \"kaufen Brot\"
  Hindi: \"खरीदना दूध\"

Remove items:
  \"remove milk\" or \"delete apples\"
  Spanish: \"eliminar leche\"

Search:
  \"find milk\" or \"search for bread\"
  Spanish: \"buscar leche\"

Manage the list:
  \"clear list\" or \"empty list\"
  Spanish: \"limpiar lista\"

Help:
  \"help\" or \"ayuda\"

Tips:
  Speak clearly and wait for \"Listening...\"
  Use quantities: \"add 3 bananas\"
  \"need milk\" works the same as \"add milk\"";

/// Shopping list dispatcher backed by a JSON file
pub struct ShoppingDispatcher {
    list: ShoppingList,
    catalog: Catalog,
    store: ListStore,
    feedback: Feedback,
}

impl ShoppingDispatcher {
    /// Create a dispatcher, loading the saved list from `store`
    pub fn open(store: ListStore, catalog: Catalog, feedback: Feedback) -> Result<Self, StoreError> {
        let list = store.load()?;
        Ok(Self {
            list,
            catalog,
            store,
            feedback,
        })
    }

    pub fn list(&self) -> &ShoppingList {
        &self.list
    }

    /// Publish the current list and suggestions
    pub fn publish(&self) {
        self.feedback.emit(AssistantEvent::ListChanged {
            items: self.list.items().to_vec(),
        });
        self.feedback.emit(AssistantEvent::Suggestions {
            tips: self.list.suggestions(Local::now().date_naive()),
        });
    }

    fn add(&mut self, item: &str, quantity: u32, locale: &str) {
        match self.list.add(item, quantity) {
            AddOutcome::Added { quantity } => {
                let category = categorize(item);
                info!(item, quantity, category, "item added");
                self.feedback
                    .speak(format!("Added {quantity} {item} to your shopping list"), locale);
                self.feedback
                    .status(format!("Added: {quantity} {item} ({category})"));
            }
            AddOutcome::Updated { total } => {
                info!(item, total, "item quantity updated");
                self.feedback
                    .speak(format!("Updated quantity of {item} to {total}"), locale);
                self.feedback.status(format!("Updated: {total} {item}"));
            }
        }
        self.save_and_publish();
    }

    fn remove(&mut self, item: &str, locale: &str) {
        match self.list.remove(item) {
            Some(removed) => {
                info!(item = %removed.name, "item removed");
                self.feedback.speak(
                    format!("Removed {} from your shopping list", removed.name),
                    locale,
                );
                self.save_and_publish();
            }
            None => {
                self.feedback
                    .speak(format!("I couldn't find {item} in your shopping list"), locale);
            }
        }
    }

    fn search(&mut self, query: &str, locale: &str) {
        let results = self.catalog.search(query);
        info!(query, results = results.len(), "catalog searched");

        let spoken = if results.is_empty() {
            format!("No products found matching \"{query}\"")
        } else {
            format!("Found {} products matching \"{query}\"", results.len())
        };
        self.feedback.emit(AssistantEvent::SearchResults {
            query: query.to_string(),
            results,
        });
        self.feedback.speak(spoken, locale);
    }

    fn clear(&mut self, locale: &str) {
        if self.list.clear() {
            info!("shopping list cleared");
            self.save_and_publish();
            self.feedback.speak("Shopping list cleared", locale);
        } else {
            self.feedback
                .speak("Your shopping list is already empty", locale);
        }
    }

    fn save_and_publish(&mut self) {
        if let Err(e) = self.store.save(&self.list) {
            error!(?e, "failed to save shopping list");
        }
        self.publish();
    }
}

impl ActionDispatcher for ShoppingDispatcher {
    fn remove_item(&mut self, id: u64, locale: &str) {
        let Some(removed) = self.list.remove_by_id(id) else {
            debug!(id, "no list entry with this id");
            return;
        };
        info!(id, item = %removed.name, "item removed by id");
        self.feedback.speak(
            format!("Removed {} from your shopping list", removed.name),
            locale,
        );
        self.save_and_publish();
    }

    fn dispatch(&mut self, command: &Command, locale: &str) {
        match command {
            Command::Add { item, quantity } => self.add(item, *quantity, locale),
            Command::Remove { item } => self.remove(item, locale),
            Command::Search { item } => self.search(item, locale),
            Command::Clear => self.clear(locale),
            Command::Help => {
                self.feedback.emit(AssistantEvent::Help {
                    text: HELP_TEXT.to_string(),
                });
                self.feedback
                    .speak("Here are the available voice commands", locale);
            }
            Command::Unknown => {
                self.feedback.notice(
                    NoticeKind::UserInputUnrecognized,
                    "Unknown command. Try \"Add milk\" or \"Help\"",
                );
                self.feedback.speak(
                    "I didn't understand that command. Try saying \"add milk\" or \"help\"",
                    locale,
                );
            }
        }
    }
}
