//! Bot command parsing.
//!
//! Commands are matched loosely: the first word only has to start with a
//! command keyword, so `matchesfoo` is read as `matches`.

use crate::challonge::Id;

/// Keyword for listing tournaments.
pub const LIST_TOURNAMENTS: &str = "tournaments";
/// Keyword for listing open matches.
pub const LIST_MATCHES: &str = "matches";

/// Reply for anything that is not a known command.
pub const HELP_TEXT: &str = "Not sure what you mean. Use the **tournaments** command to list \
tournaments, or the **matches** command followed by a tournament id, delimited by spaces.";

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListTournaments,
    /// Open matches for one tournament, or for every tournament when `None`.
    ListMatches(Option<Id>),
    Unrecognized,
}

impl Command {
    /// Parse an already lower-cased, trimmed command string.
    pub fn parse(command: &str) -> Self {
        let mut words = command.split_whitespace();
        let Some(first) = words.next() else {
            return Self::Unrecognized;
        };

        if first.starts_with(LIST_TOURNAMENTS) {
            Self::ListTournaments
        } else if first.starts_with(LIST_MATCHES) {
            Self::ListMatches(words.next().map(Id::new))
        } else {
            Self::Unrecognized
        }
    }
}
