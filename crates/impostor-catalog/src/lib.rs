//! Impostor party game — word corpus.
//!
//! Holds the word pairs handed out to civils and impostors and the list of
//! selectable game definitions. The built-in corpus can be replaced by a
//! YAML file.

pub mod builtin;
pub mod corpus;
pub mod loader;

pub use corpus::{Catalog, Corpus, GameDefinition, WordPair};
