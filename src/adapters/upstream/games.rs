//! Games Feed - GameSource Implementation
//!
//! Decodes the upstream games listing into `RawGameDescriptor`s. The
//! payload is a JSON array of game objects; a payload that does not
//! decode fails the whole fetch (strict, no silent coercion).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::config::UpstreamConfig;
use crate::ports::game_source::{FetchError, GameSource, RawGameDescriptor};

use super::client::FeedClient;

/// One game entry as served by the upstream feed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameDto {
    id: String,
    question: String,
    options: Vec<String>,
    close_time: DateTime<Utc>,
}

impl From<GameDto> for RawGameDescriptor {
    fn from(dto: GameDto) -> Self {
        Self {
            game_id: dto.id,
            question: dto.question,
            options: dto.options,
            close_time: dto.close_time,
        }
    }
}

/// `GameSource` implementation backed by the upstream HTTP feed.
pub struct GamesFeed {
    client: FeedClient,
    games_path: String,
}

impl GamesFeed {
    /// Create a feed source from a client and config.
    pub fn new(client: FeedClient, config: &UpstreamConfig) -> Self {
        Self {
            client,
            games_path: config.games_path.clone(),
        }
    }
}

/// Decode a feed payload into descriptors.
fn decode(body: &str) -> Result<Vec<RawGameDescriptor>, FetchError> {
    let dtos: Vec<GameDto> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(dtos.into_iter().map(RawGameDescriptor::from).collect())
}

#[async_trait]
impl GameSource for GamesFeed {
    #[instrument(skip(self))]
    async fn fetch_pending(&self) -> Result<Vec<RawGameDescriptor>, FetchError> {
        let body = self.client.get(&self.games_path).await?;
        let descriptors = decode(&body)?;
        info!(count = descriptors.len(), "Fetched pending games");
        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_well_formed_listing() {
        let body = r#"[
            {
                "id": "nba-2026-06-12-lal-bos",
                "question": "Will the Lakers beat the Celtics?",
                "options": ["Lakers", "Celtics"],
                "closeTime": "2026-06-12T23:30:00Z"
            }
        ]"#;

        let descriptors = decode(body).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].game_id, "nba-2026-06-12-lal-bos");
        assert_eq!(descriptors[0].options, vec!["Lakers", "Celtics"]);
    }

    #[test]
    fn rejects_a_malformed_listing() {
        let err = decode(r#"{"not": "an array"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = decode(r#"[{"id": "g1"}]"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
