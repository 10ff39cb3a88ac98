//! Command interpreter.
//!
//! Turns a parsed command into the chain of tournament API reads it needs
//! and folds the results into one reply. Any failed read fails the whole
//! reply; nothing is built from partial results.

use tracing::debug;

use crate::bot::commands::{Command, HELP_TEXT};
use crate::bot::formatter;
use crate::challonge::{Id, Match, TournamentApi};
use crate::common::error::{CommandError, CommandResult};

/// Reply to `matches` when the account has no tournaments at all.
pub const NO_TOURNAMENTS_TEXT: &str = "No tournaments found.";

/// Separator between tournament blocks in the all-tournaments listing.
const BLOCK_SEPARATOR: &str = "\n\n";

pub struct Interpreter<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A> Interpreter<'a, A>
where
    A: TournamentApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Parse and execute a lower-cased command string.
    pub async fn respond(&self, command: &str) -> CommandResult<String> {
        self.execute(Command::parse(command)).await
    }

    pub async fn execute(&self, command: Command) -> CommandResult<String> {
        debug!("Executing {:?}", command);
        match command {
            Command::ListTournaments => self.list_tournaments().await,
            Command::ListMatches(Some(id)) => self.list_matches(&id).await,
            Command::ListMatches(None) => self.all_open_matches().await,
            Command::Unrecognized => Ok(HELP_TEXT.to_string()),
        }
    }

    /// One line per tournament, in API order, under a header.
    pub async fn list_tournaments(&self) -> CommandResult<String> {
        let tournaments = self.api.tournaments().await?;

        let mut lines = vec![formatter::tournaments_header().to_string()];
        lines.extend(tournaments.iter().map(formatter::tournament_line));
        Ok(lines.join("\n"))
    }

    /// Open matches of one tournament with both players resolved to names.
    ///
    /// Reads the tournament, then its matches, then two participants per
    /// open match. A tournament with no open matches gives just the header.
    pub async fn list_matches(&self, tournament_id: &Id) -> CommandResult<String> {
        let tournament = self.api.tournament(tournament_id).await?;
        let matches = self.api.matches(tournament_id).await?;

        let mut lines = vec![formatter::open_matches_header(&tournament.name)];
        for open in matches.iter().filter(|m| m.is_open()) {
            lines.push(self.describe_match(tournament_id, open).await?);
        }
        Ok(lines.join("\n"))
    }

    /// Open matches of every tournament, one block per tournament.
    pub async fn all_open_matches(&self) -> CommandResult<String> {
        let tournaments = self.api.tournaments().await?;
        if tournaments.is_empty() {
            return Ok(NO_TOURNAMENTS_TEXT.to_string());
        }

        let mut blocks = Vec::with_capacity(tournaments.len());
        for tournament in &tournaments {
            blocks.push(self.list_matches(&tournament.id).await?);
        }
        Ok(blocks.join(BLOCK_SEPARATOR))
    }

    async fn describe_match(&self, tournament_id: &Id, open: &Match) -> CommandResult<String> {
        let player_one = player_ref(tournament_id, open, open.player1_id.as_ref(), "player1_id")?;
        let player_two = player_ref(tournament_id, open, open.player2_id.as_ref(), "player2_id")?;

        let one = self.api.participant(tournament_id, player_one).await?;
        let two = self.api.participant(tournament_id, player_two).await?;
        Ok(formatter::match_line(&one.name, &two.name))
    }
}

fn player_ref<'m>(
    tournament_id: &Id,
    open: &Match,
    player: Option<&'m Id>,
    slot: &'static str,
) -> CommandResult<&'m Id> {
    player.ok_or_else(|| CommandError::MissingPlayer {
        tournament_id: tournament_id.to_string(),
        match_id: open.id.to_string(),
        slot,
    })
}
