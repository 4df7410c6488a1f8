use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Narrative starting archetype chosen at character creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    StreetKid,
    AcademyGraduate,
    Civilian,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundDefinition {
    pub id: Background,
    pub name: &'static str,
    pub description: &'static str,
    pub starting_bonus: &'static str,
}

/// Resources a character starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingResources {
    pub dirty_money: u64,
    pub clean_money: u64,
    pub reputation: u32,
}

impl Default for StartingResources {
    fn default() -> Self {
        Self {
            dirty_money: 0,
            clean_money: 100,
            reputation: 0,
        }
    }
}

static DEFINITIONS: [BackgroundDefinition; 3] = [
    BackgroundDefinition {
        id: Background::StreetKid,
        name: "Street Kid",
        description: "You grew up on the streets. You know how the underground works and have connections to the criminal world.",
        starting_bonus: "+10 Street Reputation, +$50 Dirty Money",
    },
    BackgroundDefinition {
        id: Background::AcademyGraduate,
        name: "Academy Graduate",
        description: "You graduated from the police academy. You believe in justice and have connections in law enforcement.",
        starting_bonus: "+10 Professional Reputation, Badge Access",
    },
    BackgroundDefinition {
        id: Background::Civilian,
        name: "Civilian",
        description: "You're an ordinary citizen. No connections, no baggage - a blank slate that can go either way.",
        starting_bonus: "+$100 Clean Money, Neutral Standing",
    },
];

impl Background {
    pub const ALL: [Background; 3] = [
        Background::StreetKid,
        Background::AcademyGraduate,
        Background::Civilian,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Background::StreetKid => "street_kid",
            Background::AcademyGraduate => "academy_graduate",
            Background::Civilian => "civilian",
        }
    }

    pub fn definition(self) -> &'static BackgroundDefinition {
        match self {
            Background::StreetKid => &DEFINITIONS[0],
            Background::AcademyGraduate => &DEFINITIONS[1],
            Background::Civilian => &DEFINITIONS[2],
        }
    }

    pub fn definitions() -> &'static [BackgroundDefinition] {
        &DEFINITIONS
    }

    /// Starting money and reputation. Each background overrides fields of the
    /// default base (clean 100, everything else 0).
    pub fn starting_resources(self) -> StartingResources {
        let base = StartingResources::default();
        match self {
            Background::StreetKid => StartingResources {
                dirty_money: 50,
                clean_money: 0,
                reputation: 10,
            },
            Background::AcademyGraduate => StartingResources {
                reputation: 10,
                ..base
            },
            Background::Civilian => StartingResources {
                clean_money: 200,
                ..base
            },
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBackground(pub String);

impl fmt::Display for UnknownBackground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown background '{}'", self.0)
    }
}

impl FromStr for Background {
    type Err = UnknownBackground;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Background::ALL
            .into_iter()
            .find(|bg| bg.id() == s)
            .ok_or_else(|| UnknownBackground(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_resources_per_background() {
        let street = Background::StreetKid.starting_resources();
        assert_eq!((street.dirty_money, street.clean_money, street.reputation), (50, 0, 10));

        let academy = Background::AcademyGraduate.starting_resources();
        assert_eq!((academy.dirty_money, academy.clean_money, academy.reputation), (0, 100, 10));

        let civilian = Background::Civilian.starting_resources();
        assert_eq!((civilian.dirty_money, civilian.clean_money, civilian.reputation), (0, 200, 0));
    }

    #[test]
    fn default_base_is_one_hundred_clean() {
        let base = StartingResources::default();
        assert_eq!((base.dirty_money, base.clean_money, base.reputation), (0, 100, 0));
    }

    #[test]
    fn ids_parse_back() {
        for bg in Background::ALL {
            assert_eq!(bg.id().parse::<Background>(), Ok(bg));
            assert_eq!(bg.definition().id, bg);
        }
        assert_eq!(
            "ronin".parse::<Background>(),
            Err(UnknownBackground("ronin".to_string()))
        );
    }

    #[test]
    fn serde_uses_snake_case_ids() {
        let json = serde_json::to_string(&Background::AcademyGraduate).unwrap();
        assert_eq!(json, "\"academy_graduate\"");
    }
}
