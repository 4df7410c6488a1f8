use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod background;
pub mod creation;
pub mod summary;
pub use background::*;
pub use creation::*;
pub use summary::*;

/// Heat is a percentage; stored values outside 0-100 are clamped.
pub const MAX_HEAT: u8 = 100;

fn clamped_heat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(MAX_HEAT)) as u8)
}

/// Current allegiance. Values written by other clients that this build does
/// not know about are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Faction {
    #[default]
    Neutral,
    Criminal,
    LawEnforcement,
    Other(String),
}

impl Faction {
    pub fn as_str(&self) -> &str {
        match self {
            Faction::Neutral => "neutral",
            Faction::Criminal => "criminal",
            Faction::LawEnforcement => "law_enforcement",
            Faction::Other(raw) => raw,
        }
    }
}

impl From<String> for Faction {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "neutral" => Faction::Neutral,
            "criminal" => Faction::Criminal,
            "law_enforcement" => Faction::LawEnforcement,
            _ => Faction::Other(raw),
        }
    }
}

impl From<&str> for Faction {
    fn from(raw: &str) -> Self {
        Faction::from(raw.to_string())
    }
}

impl From<Faction> for String {
    fn from(faction: Faction) -> Self {
        faction.as_str().to_string()
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored character row. One per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub alias: Option<String>,
    pub background: String, // raw id; may be unknown to this build
    pub dirty_money: u64,
    pub clean_money: u64,
    pub reputation: u32,
    #[serde(default)]
    pub current_faction: Faction,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default, deserialize_with = "clamped_heat")]
    pub heat: u8,
    pub created_at: DateTime<Utc>,
}

/// Form input for character creation, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub first_name: String,
    pub last_name: String,
    pub alias: Option<String>,
    pub background: String,
}

impl CharacterProfile {
    pub fn new(first_name: &str, last_name: &str, background: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            alias: None,
            background: background.to_string(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }
}

/// A validated character waiting to be inserted. The store assigns the id
/// and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharacter {
    pub account_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub alias: Option<String>,
    pub background: Background,
    pub resources: StartingResources,
}

impl NewCharacter {
    pub fn into_character(self, id: Uuid, created_at: DateTime<Utc>) -> Character {
        Character {
            id,
            account_id: self.account_id,
            first_name: self.first_name,
            last_name: self.last_name,
            alias: self.alias,
            background: self.background.id().to_string(),
            dirty_money: self.resources.dirty_money,
            clean_money: self.resources.clean_money,
            reputation: self.resources.reputation,
            current_faction: Faction::Neutral,
            rank: 0,
            xp: 0,
            heat: 0,
            created_at,
        }
    }
}
