//! Players, roles and name rules.

use std::fmt;

use impostor_core::error::GameError;
use serde::{Deserialize, Serialize};

/// Shortest accepted player name, in characters, after trimming.
pub const MIN_NAME_CHARS: usize = 2;
/// Longest accepted player name, in characters, after trimming.
pub const MAX_NAME_CHARS: usize = 20;

/// Secret role of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Majority role; knows the common word.
    Civil,
    /// Minority role; knows the related word.
    Impostor,
}

impl Role {
    /// Lowercase role name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Civil => "civil",
            Self::Impostor => "impostor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier (`player-<n>`, 1-based).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role; `Civil` until words are assigned.
    pub role: Role,
    /// Secret word; empty until words are assigned.
    pub word: String,
    /// Set once the player has been voted out.
    pub is_eliminated: bool,
}

impl Player {
    /// Creates the default player for a 0-based seat index.
    #[must_use]
    pub fn seated(index: usize) -> Self {
        Self {
            id: player_id(index),
            name: default_name(index),
            role: Role::Civil,
            word: String::new(),
            is_eliminated: false,
        }
    }

    /// Returns `true` if the player has not been eliminated.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.is_eliminated
    }
}

/// Identifier for a 0-based seat index.
#[must_use]
pub fn player_id(index: usize) -> String {
    format!("player-{}", index + 1)
}

/// Default display name for a 0-based seat index.
#[must_use]
pub fn default_name(index: usize) -> String {
    format!("Jugador {}", index + 1)
}

/// Checks names typed on the name-collection screen.
///
/// Each name is trimmed and must be between 2 and 20 characters. On success
/// the trimmed names are returned in order.
///
/// # Errors
///
/// Returns `GameError::Validation` listing every offending 1-based position.
pub fn validate_player_names(names: &[String]) -> Result<Vec<String>, GameError> {
    let trimmed: Vec<String> = names.iter().map(|name| name.trim().to_owned()).collect();
    let invalid: Vec<String> = trimmed
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let chars = name.chars().count();
            !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&chars)
        })
        .map(|(index, _)| (index + 1).to_string())
        .collect();

    if invalid.is_empty() {
        Ok(trimmed)
    } else {
        Err(GameError::Validation(format!(
            "player names must be {MIN_NAME_CHARS}-{MAX_NAME_CHARS} characters (positions {})",
            invalid.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn test_seated_player_uses_one_based_defaults() {
        let player = Player::seated(0);

        assert_eq!(player.id, "player-1");
        assert_eq!(player.name, "Jugador 1");
        assert_eq!(player.role, Role::Civil);
        assert!(player.word.is_empty());
        assert!(player.is_alive());
    }

    #[test]
    fn test_validate_player_names_trims_valid_names() {
        let result = validate_player_names(&names(&["  Ana ", "Luis", "Mó"])).unwrap();

        assert_eq!(result, names(&["Ana", "Luis", "Mó"]));
    }

    #[test]
    fn test_validate_player_names_reports_short_and_long_positions() {
        let long = "x".repeat(21);
        let result = validate_player_names(&names(&["Ana", " A ", "Eva", &long]));

        match result.unwrap_err() {
            GameError::Validation(msg) => {
                assert_eq!(
                    msg,
                    "player names must be 2-20 characters (positions 2, 4)"
                );
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Impostor).unwrap(), "impostor");
        assert_eq!(Role::Civil.to_string(), "civil");
    }
}
