//! Built-in Spanish corpus.

use crate::corpus::{Corpus, GameDefinition, WordPair};

/// Identifier of the only built-in game.
pub const DEFAULT_GAME_ID: &str = "impostor";

/// `(civil, impostor, category)` triples.
const WORD_PAIRS: &[(&str, &str, &str)] = &[
    ("playa", "piscina", "lugares"),
    ("cuchara", "tenedor", "cubiertos"),
    ("coche", "moto", "transporte"),
    ("gato", "perro", "animales"),
    ("té", "café", "bebidas"),
    ("libro", "revista", "lectura"),
    ("montaña", "colina", "geografía"),
    ("fútbol", "baloncesto", "deportes"),
    ("pizza", "hamburguesa", "comida"),
    ("guitarra", "piano", "instrumentos"),
    ("invierno", "otoño", "estaciones"),
    ("médico", "enfermero", "profesiones"),
    ("rojo", "rosa", "colores"),
    ("mar", "lago", "agua"),
    ("avión", "helicóptero", "transporte aéreo"),
];

impl Corpus {
    /// The corpus shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let word_pairs = WORD_PAIRS
            .iter()
            .map(|&(civil, impostor, category)| WordPair {
                civil: civil.to_owned(),
                impostor: impostor.to_owned(),
                category: category.to_owned(),
            })
            .collect();

        Self {
            word_pairs,
            games: vec![GameDefinition {
                id: DEFAULT_GAME_ID.to_owned(),
                name: "El Impostor".to_owned(),
                description: "Los jugadores reciben palabras similares. Los impostores deben pasar desapercibidos.".to_owned(),
                min_players: 3,
                max_players: 12,
            }],
        }
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::builtin()
    }
}
