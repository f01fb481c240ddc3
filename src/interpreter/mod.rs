//! Command interpreter
//!
//! Turns a lower-cased transcript into a typed [`Command`]:
//! - add phrases in English, Spanish, French, German and Hindi
//! - remove, search, clear and help phrases
//! - leading quantities as digits or as the words one..ten

mod command;
mod parser;
mod patterns;
mod quantity;

pub use command::Command;
pub use parser::Interpreter;
pub use patterns::{locale, locale_name, LocaleInfo, DEFAULT_LOCALE};
