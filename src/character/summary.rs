use serde::Serialize;
use super::{Background, Character, Faction, MAX_HEAT};

/// Display color for a faction label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactionColor {
    NeutralGray,
    Red,
    Blue,
}

impl FactionColor {
    pub fn as_str(self) -> &'static str {
        match self {
            FactionColor::NeutralGray => "neutral-gray",
            FactionColor::Red => "red",
            FactionColor::Blue => "blue",
        }
    }
}

/// Display-ready view of a character for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplaySummary {
    pub display_name: String,
    pub background_label: String,
    pub faction_label: String,
    pub faction_color: FactionColor,
    pub rank: u32,
    pub xp: u32,
    pub reputation: u32,
    pub heat: String,
    pub clean_money: String,
    pub dirty_money: String,
}

impl DisplaySummary {
    /// Faction label for the stat header ("Law Enforcement").
    pub fn faction_header(&self) -> String {
        title_case(&self.faction_label)
    }

    /// Faction label for the detail panel ("LAW ENFORCEMENT").
    pub fn faction_detail(&self) -> String {
        self.faction_label.to_uppercase()
    }
}

pub struct CharacterSummary;

impl CharacterSummary {
    /// Never fails: unknown backgrounds and factions fall back to their raw
    /// stored values.
    pub fn project(character: &Character) -> DisplaySummary {
        DisplaySummary {
            display_name: display_name(character),
            background_label: background_label(&character.background),
            faction_label: faction_label(&character.current_faction),
            faction_color: faction_color(&character.current_faction),
            rank: character.rank,
            xp: character.xp,
            reputation: character.reputation,
            heat: format!("{}%", character.heat.min(MAX_HEAT)),
            clean_money: format!("${}", format_thousands(character.clean_money)),
            dirty_money: format!("${}", format_thousands(character.dirty_money)),
        }
    }
}

impl Character {
    pub fn summary(&self) -> DisplaySummary {
        CharacterSummary::project(self)
    }
}

fn display_name(character: &Character) -> String {
    match &character.alias {
        Some(alias) => format!(
            "{} {} \"{}\"",
            character.first_name, character.last_name, alias
        ),
        None => format!("{} {}", character.first_name, character.last_name),
    }
}

pub fn background_label(raw: &str) -> String {
    raw.parse::<Background>()
        .map(|bg| bg.definition().name.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn faction_label(faction: &Faction) -> String {
    match faction {
        Faction::Neutral => "Unaligned".to_string(),
        other => other.as_str().replacen('_', " ", 1),
    }
}

pub fn faction_color(faction: &Faction) -> FactionColor {
    match faction {
        Faction::Criminal => FactionColor::Red,
        Faction::LawEnforcement => FactionColor::Blue,
        Faction::Neutral | Faction::Other(_) => FactionColor::NeutralGray,
    }
}

/// `1500` -> `"1,500"`.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn title_case(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
