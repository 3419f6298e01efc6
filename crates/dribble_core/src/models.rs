//! Typed records read from and written to the tabular store.
//!
//! Rows arrive as JSON objects; decoding into these structs is where the
//! schema gets checked.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type PlayerId = u32;
pub type PuzzleId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_headshot: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub search_rank: u32,
}

impl Player {
    /// Catalog ordering key.
    pub fn sort_name(&self) -> &str {
        if self.name.is_empty() {
            &self.display_name
        } else {
            &self.name
        }
    }
}

/// One row of the per-season teammate relation, as seen from `player_a`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeammateRecord {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    #[serde(default, deserialize_with = "optional_season_label")]
    pub last_season_teammates: Option<String>,
    #[serde(default, deserialize_with = "season_labels")]
    pub seasons_teammates: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub years_teammates: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: PuzzleId,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    pub username: String,
    pub start_player_id: PlayerId,
    pub end_player_id: PlayerId,
    pub solution_player_id: PlayerId,
}

/// Insert payload; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPuzzle {
    pub username: String,
    pub start_player_id: PlayerId,
    pub end_player_id: PlayerId,
    pub solution_player_id: PlayerId,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Season labels show up as `2019` or `"2019-20"` depending on the view.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeasonLabel {
    Number(i64),
    Text(String),
}

impl From<SeasonLabel> for String {
    fn from(label: SeasonLabel) -> Self {
        match label {
            SeasonLabel::Number(n) => n.to_string(),
            SeasonLabel::Text(s) => s,
        }
    }
}

fn optional_season_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SeasonLabel>::deserialize(deserializer)?.map(String::from))
}

fn season_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = Option::<Vec<SeasonLabel>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(labels.into_iter().map(String::from).collect())
}

/// Accepts RFC 3339 (`timestamptz`) and bare `timestamp` columns, the latter read as UTC.
fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
