//! Challonge resource paths and the records decoded from them.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Opaque Challonge identifier.
///
/// Challonge sends numeric ids, while users type them (or URL slugs) as
/// text, so both are kept as the string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Id(n.to_string()),
            Raw::Text(s) => Id(s),
        })
    }
}

/// One of the REST resources the bot reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Tournaments,
    Tournament(Id),
    Matches(Id),
    Participant { tournament: Id, participant: Id },
}

impl Resource {
    /// Path segments relative to the API base, ids unescaped.
    ///
    /// Each id is one segment no matter what it contains; the HTTP client
    /// percent-encodes them.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Tournaments => vec!["tournaments"],
            Self::Tournament(id) => vec!["tournaments", id.as_str()],
            Self::Matches(id) => vec!["tournaments", id.as_str(), "matches"],
            Self::Participant {
                tournament,
                participant,
            } => vec![
                "tournaments",
                tournament.as_str(),
                "participants",
                participant.as_str(),
            ],
        }
    }

    /// Path relative to the API base, without format suffix. Used for logs
    /// and errors, never to build a request.
    pub fn path(&self) -> String {
        match self {
            Self::Tournaments => "tournaments".to_string(),
            Self::Tournament(id) => format!("tournaments/{}", id),
            Self::Matches(id) => format!("tournaments/{}/matches", id),
            Self::Participant {
                tournament,
                participant,
            } => format!("tournaments/{}/participants/{}", tournament, participant),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tournament {
    pub id: Id,
    pub name: String,
}

/// Match lifecycle as reported by Challonge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    Pending,
    Open,
    Complete,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Match {
    pub id: Id,
    #[allow(dead_code)]
    pub tournament_id: Option<Id>,
    pub state: MatchState,
    /// Null until the bracket has seeded this slot.
    pub player1_id: Option<Id>,
    pub player2_id: Option<Id>,
}

impl Match {
    pub fn is_open(&self) -> bool {
        self.state == MatchState::Open
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    #[allow(dead_code)]
    pub id: Id,
    pub name: String,
}

// Challonge wraps every record in a single-key object named after its type.

#[derive(Debug, Deserialize)]
pub(crate) struct TournamentEnvelope {
    pub tournament: Tournament,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchEnvelope {
    #[serde(rename = "match")]
    pub match_: Match,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParticipantEnvelope {
    pub participant: Participant,
}
