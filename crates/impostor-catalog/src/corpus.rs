//! Corpus types and the `Catalog` lookup trait.

use impostor_core::error::GameError;
use impostor_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

/// A civil word and its related impostor word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    /// Word shown to civils.
    pub civil: String,
    /// Word shown to impostors.
    pub impostor: String,
    /// Topic shared by both words.
    pub category: String,
}

/// A selectable game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDefinition {
    /// Stable identifier used by `create_session`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Smallest supported table.
    pub min_players: usize,
    /// Largest supported table.
    pub max_players: usize,
}

impl GameDefinition {
    /// Returns `true` if `player_count` is within this game's bounds.
    #[must_use]
    pub fn supports(&self, player_count: usize) -> bool {
        (self.min_players..=self.max_players).contains(&player_count)
    }
}

/// Read access to word pairs and game definitions.
pub trait Catalog: Send + Sync {
    /// All word pairs, in corpus order.
    fn word_pairs(&self) -> &[WordPair];

    /// All selectable games, in corpus order.
    fn games(&self) -> &[GameDefinition];

    /// Draws one word pair uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Catalog` if the corpus has no word pairs.
    #[allow(clippy::cast_possible_truncation)]
    fn pick_random_word_pair(&self, rng: &mut dyn DeterministicRng) -> Result<WordPair, GameError> {
        let pairs = self.word_pairs();
        if pairs.is_empty() {
            return Err(GameError::Catalog("corpus has no word pairs".to_owned()));
        }
        let index = rng.next_u32_range(0, (pairs.len() - 1) as u32) as usize;
        pairs
            .get(index)
            .cloned()
            .ok_or_else(|| GameError::Catalog(format!("word pair index {index} out of range")))
    }

    /// Resolves a game definition by id.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotFound` if no game has the given id.
    fn lookup_game(&self, id: &str) -> Result<GameDefinition, GameError> {
        self.games()
            .iter()
            .find(|game| game.id == id)
            .cloned()
            .ok_or_else(|| GameError::NotFound {
                kind: "game",
                id: id.to_owned(),
            })
    }
}

/// An in-memory corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    /// Word pairs to draw from.
    pub word_pairs: Vec<WordPair>,
    /// Selectable games.
    pub games: Vec<GameDefinition>,
}

impl Corpus {
    /// Checks that the corpus can actually be played.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Catalog` describing the first problem found.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.word_pairs.is_empty() {
            return Err(GameError::Catalog("corpus has no word pairs".to_owned()));
        }
        if self.games.is_empty() {
            return Err(GameError::Catalog("corpus has no games".to_owned()));
        }
        for (index, pair) in self.word_pairs.iter().enumerate() {
            if pair.civil.trim().is_empty() || pair.impostor.trim().is_empty() {
                return Err(GameError::Catalog(format!(
                    "word pair {index} has an empty word"
                )));
            }
            if pair.civil == pair.impostor {
                return Err(GameError::Catalog(format!(
                    "word pair {index} uses the same word for both roles"
                )));
            }
        }
        for game in &self.games {
            if game.min_players > game.max_players {
                return Err(GameError::Catalog(format!(
                    "game '{}' has min_players greater than max_players",
                    game.id
                )));
            }
        }
        Ok(())
    }
}

impl Catalog for Corpus {
    fn word_pairs(&self) -> &[WordPair] {
        &self.word_pairs
    }

    fn games(&self) -> &[GameDefinition] {
        &self.games
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impostor_test_support::SequenceRng;

    fn corpus() -> Corpus {
        Corpus {
            word_pairs: vec![
                WordPair {
                    civil: "sol".to_owned(),
                    impostor: "luna".to_owned(),
                    category: "cielo".to_owned(),
                },
                WordPair {
                    civil: "pan".to_owned(),
                    impostor: "galleta".to_owned(),
                    category: "comida".to_owned(),
                },
            ],
            games: vec![GameDefinition {
                id: "impostor".to_owned(),
                name: "El Impostor".to_owned(),
                description: "test".to_owned(),
                min_players: 3,
                max_players: 12,
            }],
        }
    }

    #[test]
    fn test_pick_random_word_pair_uses_rng_index() {
        let mut rng = SequenceRng::new(vec![1]);

        let pair = corpus().pick_random_word_pair(&mut rng).unwrap();

        assert_eq!(pair.civil, "pan");
    }

    #[test]
    fn test_pick_random_word_pair_on_empty_corpus_returns_error() {
        let mut empty = corpus();
        empty.word_pairs.clear();
        let mut rng = SequenceRng::new(vec![0]);

        let result = empty.pick_random_word_pair(&mut rng);

        match result.unwrap_err() {
            GameError::Catalog(msg) => assert_eq!(msg, "corpus has no word pairs"),
            other => panic!("expected Catalog, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_game_finds_known_id() {
        let game = corpus().lookup_game("impostor").unwrap();

        assert_eq!(game.name, "El Impostor");
        assert!(game.supports(3));
        assert!(game.supports(12));
        assert!(!game.supports(13));
    }

    #[test]
    fn test_lookup_game_unknown_id_returns_not_found() {
        match corpus().lookup_game("werewolf").unwrap_err() {
            GameError::NotFound { kind, id } => {
                assert_eq!(kind, "game");
                assert_eq!(id, "werewolf");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_identical_words() {
        let mut bad = corpus();
        bad.word_pairs[0].impostor = "sol".to_owned();

        assert!(matches!(bad.validate(), Err(GameError::Catalog(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_player_bounds() {
        let mut bad = corpus();
        bad.games[0].min_players = 13;

        assert!(matches!(bad.validate(), Err(GameError::Catalog(_))));
    }
}
