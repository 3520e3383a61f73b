//! Line-oriented terminal front-end.
//!
//! Each pass of [`Terminal::run`] reads the engine's current phase, renders
//! the matching screen and turns the player's answer into one engine call.
//! End of input quits at any prompt.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use impostor_catalog::builtin::DEFAULT_GAME_ID;
use impostor_catalog::{Corpus, loader};
use impostor_core::clock::SystemClock;
use impostor_core::error::GameError;
use impostor_core::rng::SeededRng;
use impostor_session::domain::players::validate_player_names;
use impostor_session::domain::voting::{RoundOutcome, determine_winner};
use impostor_session::{GamePhase, GameSession, SessionEngine, Winner};
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::error::CliError;

const DEFAULT_PLAYER_COUNT: usize = 4;
const DEFAULT_IMPOSTOR_COUNT: usize = 1;

/// ANSI "clear screen and home cursor", used to hide a revealed word.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Builds the engine described by `config`.
///
/// # Errors
///
/// Returns `CliError::Corpus` if the custom corpus cannot be loaded.
pub fn build_engine(config: &CliConfig) -> Result<SessionEngine, CliError> {
    let corpus = match &config.corpus_path {
        Some(path) => loader::from_yaml_file(path)?,
        None => Corpus::builtin(),
    };
    let rng = config
        .seed
        .map_or_else(SeededRng::from_entropy, SeededRng::from_seed);
    info!(
        word_pairs = corpus.word_pairs.len(),
        games = corpus.games.len(),
        seeded = config.seed.is_some(),
        "engine ready"
    );
    Ok(SessionEngine::new(
        Arc::new(corpus),
        Arc::new(SystemClock),
        Box::new(rng),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A terminal bound to an input and an output stream.
#[derive(Debug)]
pub struct Terminal<R, W> {
    input: R,
    output: W,
    pass_delay: Duration,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Creates a terminal. `pass_delay` is slept before the device moves on
    /// to the next player during the reveal.
    pub fn new(input: R, output: W, pass_delay: Duration) -> Self {
        Self {
            input,
            output,
            pass_delay,
        }
    }

    /// Consumes the terminal, returning the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs screens until the player quits or input ends.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Io` on terminal failures and `CliError::Game` if
    /// the engine rejects a call the current screen should always allow.
    pub fn run(&mut self, engine: &mut SessionEngine) -> Result<(), CliError> {
        loop {
            let flow = match engine.session().map(GameSession::phase) {
                None => self.home(engine)?,
                Some(GamePhase::Setup) => self.setup(engine)?,
                Some(GamePhase::Names) => self.names(engine)?,
                Some(GamePhase::Assigning) => self.reveal(engine)?,
                Some(GamePhase::Playing) => self.discussion(engine)?,
                Some(GamePhase::Voting) => self.voting(engine)?,
                Some(GamePhase::Results) => self.results(engine)?,
            };
            if flow == Flow::Quit {
                debug!("terminal closed");
                return Ok(());
            }
        }
    }

    /// Prints `text` and reads one trimmed line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>, CliError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Reads a count, re-asking until it parses. Blank picks `default`.
    fn prompt_count(&mut self, label: &str, default: usize) -> Result<Option<usize>, CliError> {
        loop {
            let Some(answer) = self.prompt(&format!("{label} [{default}]: "))? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match answer.parse() {
                Ok(count) => return Ok(Some(count)),
                Err(_) => writeln!(self.output, "Introduce un número.")?,
            }
        }
    }

    /// Shows a rejection the player can fix; anything else is a flow bug.
    fn report<T>(&mut self, result: Result<T, GameError>) -> Result<Option<T>, CliError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err @ (GameError::Validation(_) | GameError::NotFound { .. })) => {
                writeln!(self.output, "✗ {err}")?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn home(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        writeln!(self.output)?;
        writeln!(self.output, "=== El Impostor ===")?;
        let Some(answer) =
            self.prompt("Pulsa Enter para preparar una partida o escribe 'q' para salir: ")?
        else {
            return Ok(Flow::Quit);
        };
        if answer.eq_ignore_ascii_case("q") {
            return Ok(Flow::Quit);
        }

        let games: Vec<(String, String)> = engine
            .catalog()
            .games()
            .iter()
            .map(|game| (game.id.clone(), game.name.clone()))
            .collect();
        let default_game = games
            .first()
            .map_or_else(|| DEFAULT_GAME_ID.to_owned(), |(id, _)| id.clone());
        let game_id = if games.len() > 1 {
            for (id, name) in &games {
                writeln!(self.output, "  {id}: {name}")?;
            }
            let Some(answer) = self.prompt(&format!("Juego [{default_game}]: "))? else {
                return Ok(Flow::Quit);
            };
            if answer.is_empty() { default_game } else { answer }
        } else {
            default_game
        };

        let Some(player_count) = self.prompt_count("Número de jugadores", DEFAULT_PLAYER_COUNT)?
        else {
            return Ok(Flow::Quit);
        };
        let Some(impostor_count) =
            self.prompt_count("Número de impostores", DEFAULT_IMPOSTOR_COUNT)?
        else {
            return Ok(Flow::Quit);
        };

        let created = engine.create_session(player_count, &game_id, impostor_count);
        self.report(created)?;
        Ok(Flow::Continue)
    }

    fn setup(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        let Some(session) = engine.session() else {
            return Ok(Flow::Continue);
        };
        writeln!(
            self.output,
            "{}: {} jugadores, {} impostor(es).",
            session.game().name,
            session.players().len(),
            session.number_of_impostors()
        )?;
        let Some(answer) = self
            .prompt("Pulsa Enter para introducir los nombres o escribe 'r' para volver: ")?
        else {
            return Ok(Flow::Quit);
        };
        if answer.eq_ignore_ascii_case("r") {
            engine.reset_game();
        } else {
            engine.advance_to_names()?;
        }
        Ok(Flow::Continue)
    }

    fn names(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        let Some(session) = engine.session() else {
            return Ok(Flow::Continue);
        };
        let defaults: Vec<String> = session.players().iter().map(|p| p.name.clone()).collect();

        writeln!(self.output, "Nombres de los jugadores (Enter deja el nombre actual).")?;
        let mut names = Vec::with_capacity(defaults.len());
        for (index, default) in defaults.iter().enumerate() {
            let Some(answer) = self.prompt(&format!("Jugador {} [{default}]: ", index + 1))?
            else {
                return Ok(Flow::Quit);
            };
            names.push(if answer.is_empty() {
                default.clone()
            } else {
                answer
            });
        }

        let Some(names) = self.report(validate_player_names(&names))? else {
            return Ok(Flow::Continue);
        };
        engine.set_player_names(&names)?;
        engine.assign_words()?;
        Ok(Flow::Continue)
    }

    fn reveal(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        let Some(session) = engine.session() else {
            return Ok(Flow::Continue);
        };
        let index = session.current_player_index();
        let total = session.players().len();
        let Some(player) = session.current_player() else {
            return Ok(Flow::Continue);
        };
        let (name, word) = (player.name.clone(), player.word.clone());
        let next_name = session.players().get(index + 1).map(|p| p.name.clone());

        writeln!(self.output)?;
        writeln!(self.output, "Jugador {} de {total}", index + 1)?;
        if self
            .prompt(&format!("{name}, pulsa Enter para ver tu palabra: "))?
            .is_none()
        {
            return Ok(Flow::Quit);
        }
        writeln!(self.output, "Tu palabra es: {word}")?;
        if self
            .prompt("Memorízala y pulsa Enter para ocultarla: ")?
            .is_none()
        {
            return Ok(Flow::Quit);
        }

        write!(self.output, "{CLEAR_SCREEN}")?;
        writeln!(self.output, "Pasa el dispositivo al siguiente jugador.")?;
        match next_name {
            Some(next) => writeln!(self.output, "Siguiente: {next}")?,
            None => writeln!(self.output, "¡Último jugador!")?,
        }
        self.output.flush()?;
        if !self.pass_delay.is_zero() {
            thread::sleep(self.pass_delay);
        }

        engine.next_player()?;
        Ok(Flow::Continue)
    }

    fn discussion(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        writeln!(self.output)?;
        writeln!(self.output, "Todos conocen su palabra.")?;
        writeln!(
            self.output,
            "Por turnos, describid vuestra palabra sin decirla. Los civiles buscan al impostor; \
             el impostor intenta pasar desapercibido."
        )?;
        if self
            .prompt("Pulsa Enter para empezar la votación: ")?
            .is_none()
        {
            return Ok(Flow::Quit);
        }
        engine.start_voting()?;
        Ok(Flow::Continue)
    }

    fn voting(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        let Some(session) = engine.session() else {
            return Ok(Flow::Continue);
        };
        let round = session.current_round();
        let first_ballot = session.votes().is_empty();
        let voter = session
            .alive_players()
            .find(|player| !session.votes().contains_key(&player.id))
            .map(|player| (player.id.clone(), player.name.clone()));

        let Some((voter_id, voter_name)) = voter else {
            return self.close_round(engine);
        };
        let candidates: Vec<(String, String)> = session
            .alive_players()
            .filter(|player| player.id != voter_id)
            .map(|player| (player.id.clone(), player.name.clone()))
            .collect();

        if first_ballot {
            writeln!(self.output)?;
            writeln!(self.output, "--- Votación, ronda {round} ---")?;
        }
        writeln!(self.output, "{voter_name}, ¿quién crees que es el impostor?")?;
        for (number, (_, name)) in candidates.iter().enumerate() {
            writeln!(self.output, "  {}) {name}", number + 1)?;
        }
        let Some(answer) = self.prompt("Voto: ")? else {
            return Ok(Flow::Quit);
        };

        let choice = answer
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| candidates.get(index));
        match choice {
            Some((target_id, _)) => {
                let cast = engine.cast_vote(&voter_id, target_id);
                self.report(cast)?;
            }
            None => writeln!(self.output, "Elige un número de la lista.")?,
        }
        Ok(Flow::Continue)
    }

    fn close_round(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        let resolution = engine.resolve_voting_round()?;
        let Some(session) = engine.session() else {
            return Ok(Flow::Continue);
        };
        let name_of = |id: &str| {
            session
                .player(id)
                .map_or_else(|| id.to_owned(), |player| player.name.clone())
        };

        let mut lines = vec![format!(
            "Resultado de la ronda {} ({} votos):",
            resolution.round, resolution.total_votes
        )];
        lines.extend(
            resolution
                .tally
                .iter()
                .filter(|count| count.votes > 0)
                .map(|count| format!("  {}: {}", name_of(&count.player_id), count.votes)),
        );
        let eliminated = resolution
            .eliminated_player_id
            .as_deref()
            .map(name_of)
            .unwrap_or_default();
        lines.push(match resolution.outcome {
            RoundOutcome::NoMajority => {
                "Nadie obtuvo la mayoría. Se repite la votación.".to_owned()
            }
            RoundOutcome::CivilEliminated | RoundOutcome::ImpostorsReachedParity => {
                format!("{eliminated} ha sido eliminado. Era civil.")
            }
            RoundOutcome::ImpostorCaught => {
                format!("{eliminated} ha sido eliminado. ¡Era impostor!")
            }
        });

        writeln!(self.output)?;
        for line in lines {
            writeln!(self.output, "{line}")?;
        }
        if !resolution.outcome.ends_game()
            && self
                .prompt("Pulsa Enter para la siguiente ronda: ")?
                .is_none()
        {
            return Ok(Flow::Quit);
        }
        Ok(Flow::Continue)
    }

    fn results(&mut self, engine: &mut SessionEngine) -> Result<Flow, CliError> {
        let Some(session) = engine.session() else {
            return Ok(Flow::Continue);
        };
        let headline = match determine_winner(session) {
            Winner::Civils => "¡Ganan los civiles! El impostor ha sido descubierto.",
            Winner::Impostors => "¡Ganan los impostores! Los civiles eliminaron a uno de los suyos.",
            Winner::Inconclusive => "Partida terminada sin un ganador claro.",
        };
        let mut lines = vec![String::new(), "=== Resultados ===".to_owned(), headline.to_owned()];
        if let Some(pair) = session.word_pair() {
            lines.push(format!(
                "Palabra civil: {} | Palabra impostora: {} ({})",
                pair.civil, pair.impostor, pair.category
            ));
        }
        lines.extend(session.players().iter().map(|player| {
            let status = if player.is_eliminated { ", eliminado" } else { "" };
            format!("  {}: {} ({}){status}", player.name, player.role, player.word)
        }));
        lines.push(format!("Rondas de votación: {}", session.rounds().len()));

        for line in lines {
            writeln!(self.output, "{line}")?;
        }
        let Some(answer) = self.prompt(
            "Escribe 'n' para otra partida con los mismos jugadores, 'q' para salir \
             o pulsa Enter para volver al inicio: ",
        )?
        else {
            return Ok(Flow::Quit);
        };

        if answer.eq_ignore_ascii_case("n") {
            engine.assign_words()?;
        } else if answer.eq_ignore_ascii_case("q") {
            return Ok(Flow::Quit);
        } else {
            engine.reset_game();
        }
        Ok(Flow::Continue)
    }
}
