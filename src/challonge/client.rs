//! Challonge REST client.
//!
//! `TournamentApi` is the seam between the command interpreter and the
//! network: implementors only provide `fetch`, the typed reads are built on
//! top of it.

use serde::de::DeserializeOwned;
use serenity::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::challonge::resources::{
    Id, Match, MatchEnvelope, Participant, ParticipantEnvelope, Resource, Tournament,
    TournamentEnvelope,
};
use crate::common::error::{FetchError, FetchResult};
use crate::config::Config;

/// Read access to the tournament API.
#[async_trait]
pub trait TournamentApi: Send + Sync {
    /// Fetch one resource as raw JSON.
    async fn fetch(&self, resource: &Resource) -> FetchResult<serde_json::Value>;

    /// All tournaments visible to the API key, in API order.
    async fn tournaments(&self) -> FetchResult<Vec<Tournament>> {
        let entries: Vec<TournamentEnvelope> = fetch_as(self, Resource::Tournaments).await?;
        Ok(entries.into_iter().map(|e| e.tournament).collect())
    }

    async fn tournament(&self, id: &Id) -> FetchResult<Tournament> {
        let entry: TournamentEnvelope = fetch_as(self, Resource::Tournament(id.clone())).await?;
        Ok(entry.tournament)
    }

    /// Every match of a tournament, in API order.
    async fn matches(&self, tournament: &Id) -> FetchResult<Vec<Match>> {
        let entries: Vec<MatchEnvelope> =
            fetch_as(self, Resource::Matches(tournament.clone())).await?;
        Ok(entries.into_iter().map(|e| e.match_).collect())
    }

    async fn participant(&self, tournament: &Id, participant: &Id) -> FetchResult<Participant> {
        let resource = Resource::Participant {
            tournament: tournament.clone(),
            participant: participant.clone(),
        };
        let entry: ParticipantEnvelope = fetch_as(self, resource).await?;
        Ok(entry.participant)
    }
}

/// Fetch a resource and decode it into a record type.
async fn fetch_as<A, T>(api: &A, resource: Resource) -> FetchResult<T>
where
    A: TournamentApi + ?Sized,
    T: DeserializeOwned,
{
    let value = api.fetch(&resource).await?;
    serde_json::from_value(value).map_err(|source| FetchError::Decode {
        path: resource.path(),
        source,
    })
}

/// HTTP implementation against the Challonge v1 API.
pub struct ChallongeClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl ChallongeClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("'{}' cannot be used as an API base URL", base_url);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("smashbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(&config.challonge_base_url(), config.challonge.api_key.clone())
    }

    /// Full request URL for a resource, without the credential.
    ///
    /// Ids are pushed as single percent-encoded segments so a typed id can
    /// never leave the `tournaments/` tree or cut off the `.json` suffix.
    fn url(&self, resource: &Resource) -> Url {
        let mut url = self.base_url.clone();
        let mut segments = resource.segments();
        let last = segments.pop().map(|s| format!("{}.json", s));

        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
            if let Some(ref last) = last {
                path.push(last);
            }
        }
        url
    }
}

#[async_trait]
impl TournamentApi for ChallongeClient {
    async fn fetch(&self, resource: &Resource) -> FetchResult<serde_json::Value> {
        let path = resource.path();
        let url = self.url(resource);
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Transport {
            path: path.clone(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = ChallongeClient::new("https://api.challonge.com/v1/", "secret").unwrap();
        assert_eq!(
            client.url(&Resource::Matches(Id::new("42"))).as_str(),
            "https://api.challonge.com/v1/tournaments/42/matches.json"
        );
        assert!(!client.url(&Resource::Tournaments).as_str().contains("secret"));
    }

    #[test]
    fn test_typed_id_stays_under_tournaments() {
        let client = ChallongeClient::new("https://api.challonge.com/v1", "secret").unwrap();

        for id in ["../x", "../../users/me", "..", "a?b#c", "%2e%2e"] {
            let url = client.url(&Resource::Tournament(Id::new(id)));
            // Re-parse to see where the request would really go.
            let resolved = Url::parse(url.as_str()).unwrap();
            assert!(
                resolved.path().starts_with("/v1/tournaments/"),
                "{} resolved to {}",
                id,
                resolved
            );
            assert!(resolved.path().ends_with(".json"), "{} resolved to {}", id, resolved);
            assert!(resolved.query().is_none());
            assert!(resolved.fragment().is_none());
        }

        assert_eq!(
            client.url(&Resource::Tournament(Id::new("../x"))).as_str(),
            "https://api.challonge.com/v1/tournaments/..%2Fx.json"
        );
    }

    #[test]
    fn test_participant_ids_are_separate_segments() {
        let client = ChallongeClient::new("http://localhost:9000/v1/", "secret").unwrap();
        let url = client.url(&Resource::Participant {
            tournament: Id::new("../../users"),
            participant: Id::new("me"),
        });
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/v1/tournaments/..%2F..%2Fusers/participants/me.json"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(ChallongeClient::new("not a url", "key").is_err());
        assert!(ChallongeClient::new("mailto:bot@example.com", "key").is_err());
    }

    #[test]
    fn test_from_config_uses_default_base() {
        let config = crate::config::types::make_test_config();
        let client = ChallongeClient::from_config(&config).unwrap();
        assert_eq!(
            client.url(&Resource::Tournaments).as_str(),
            "https://api.challonge.com/v1/tournaments.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = ChallongeClient::new("http://127.0.0.1:1", "key").unwrap();
        let err = client.fetch(&Resource::Tournaments).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.path(), "tournaments");
    }
}
