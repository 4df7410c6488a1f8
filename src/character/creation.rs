use uuid::Uuid;
use crate::database::CharacterStore;
use crate::error::{GameError, GameResult};
use crate::identity::{IdentityProvider, Session};
use super::{Background, Character, CharacterProfile, NewCharacter};

pub struct CharacterCreation;

impl CharacterCreation {
    /// Validates `profile` for the caller's session token and inserts the one
    /// character that account may own. The token is only trusted once the
    /// identity provider hands back a live session for it.
    ///
    /// No existence pre-check is done here: the store rejects a second row for
    /// the same account with [`GameError::DuplicateCharacter`].
    pub fn create_character<S>(
        store: &mut S,
        token: Option<Uuid>,
        profile: &CharacterProfile,
    ) -> GameResult<Character>
    where
        S: CharacterStore + IdentityProvider + ?Sized,
    {
        let session = match token.and_then(|token| store.session(token)) {
            Some(session) if session.is_valid() && !session.account_id.is_nil() => session,
            _ => {
                log::warn!("Character creation rejected: no valid session");
                return Err(GameError::Unauthenticated);
            }
        };

        let new_character = Self::validate(&session, profile).map_err(|e| {
            log::warn!("Character creation rejected for {}: {}", session.account_id, e);
            e
        })?;

        let character = store.insert(new_character)?;
        log::info!(
            "Created character {} ({} {}, {}) for account {}",
            character.id,
            character.first_name,
            character.last_name,
            character.background,
            character.account_id
        );
        Ok(character)
    }

    /// Checks required fields, then the background, and derives starting
    /// resources.
    pub fn validate(session: &Session, profile: &CharacterProfile) -> GameResult<NewCharacter> {
        let first_name = profile.first_name.trim();
        let last_name = profile.last_name.trim();
        let background = profile.background.trim();

        let missing: Vec<&str> = [
            ("first name", first_name),
            ("last name", last_name),
            ("background", background),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(GameError::Validation(format!(
                "Please fill in all required fields (missing: {})",
                missing.join(", ")
            )));
        }

        let background = background
            .parse::<Background>()
            .map_err(|e| GameError::Validation(e.to_string()))?;

        let alias = profile
            .alias
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string);

        Ok(NewCharacter {
            account_id: session.account_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            alias,
            background,
            resources: background.starting_resources(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Faction;
    use crate::database::GameDatabase;
    use chrono::Duration;

    fn signed_up(db: &mut GameDatabase, email: &str) -> Session {
        db.sign_up(email, "hunter22").unwrap()
    }

    fn detached_session() -> Session {
        Session::open(Uuid::new_v4(), Duration::hours(1))
    }

    #[test]
    fn each_background_gets_its_resources() {
        let expected = [
            ("street_kid", 50, 0, 10),
            ("academy_graduate", 0, 100, 10),
            ("civilian", 0, 200, 0),
        ];
        let mut db = GameDatabase::new();
        for (background, dirty, clean, reputation) in expected {
            let session = signed_up(&mut db, &format!("{background}@example.com"));
            let profile = CharacterProfile::new("Jane", "Doe", background);
            let character =
                CharacterCreation::create_character(&mut db, Some(session.token), &profile).unwrap();
            assert_eq!(character.account_id, session.account_id);
            assert_eq!(character.dirty_money, dirty);
            assert_eq!(character.clean_money, clean);
            assert_eq!(character.reputation, reputation);
            assert_eq!(character.current_faction, Faction::Neutral);
            assert_eq!((character.rank, character.xp, character.heat), (0, 0, 0));
        }
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        let mut db = GameDatabase::new();
        let profile = CharacterProfile::new("Jane", "Doe", "civilian");
        let err = CharacterCreation::create_character(&mut db, None, &profile).unwrap_err();
        assert!(matches!(err, GameError::Unauthenticated));
        assert_eq!(db.character_count(), 0);
    }

    #[test]
    fn session_not_issued_by_the_provider_is_unauthenticated() {
        let mut db = GameDatabase::new();
        let minted = detached_session();
        let profile = CharacterProfile::new("Jane", "Doe", "civilian");
        let err =
            CharacterCreation::create_character(&mut db, Some(minted.token), &profile).unwrap_err();
        assert!(matches!(err, GameError::Unauthenticated));
        assert_eq!(db.account_count(), 0);
        assert_eq!(db.character_count(), 0);
    }

    #[test]
    fn expired_session_is_unauthenticated() {
        let mut db = GameDatabase::new().with_session_ttl(Duration::zero());
        let expired = signed_up(&mut db, "jane@example.com");
        let profile = CharacterProfile::new("Jane", "Doe", "civilian");
        let err =
            CharacterCreation::create_character(&mut db, Some(expired.token), &profile).unwrap_err();
        assert!(matches!(err, GameError::Unauthenticated));
        assert_eq!(db.character_count(), 0);
    }

    #[test]
    fn signed_out_session_is_unauthenticated() {
        let mut db = GameDatabase::new();
        let session = signed_up(&mut db, "jane@example.com");
        db.sign_out(session.token);
        let profile = CharacterProfile::new("Jane", "Doe", "civilian");
        let err =
            CharacterCreation::create_character(&mut db, Some(session.token), &profile).unwrap_err();
        assert!(matches!(err, GameError::Unauthenticated));
    }

    #[test]
    fn authentication_is_checked_before_fields() {
        let mut db = GameDatabase::new();
        let err = CharacterCreation::create_character(&mut db, None, &CharacterProfile::default())
            .unwrap_err();
        assert!(matches!(err, GameError::Unauthenticated));
    }

    #[test]
    fn blank_fields_are_rejected_without_a_write() {
        let mut db = GameDatabase::new();
        let session = signed_up(&mut db, "jane@example.com");
        for profile in [
            CharacterProfile::new("", "Doe", "civilian"),
            CharacterProfile::new("Jane", "   ", "civilian"),
            CharacterProfile::new("Jane", "Doe", ""),
        ] {
            let err = CharacterCreation::create_character(&mut db, Some(session.token), &profile)
                .unwrap_err();
            assert!(matches!(err, GameError::Validation(_)), "{profile:?}");
        }
        assert_eq!(db.character_count(), 0);
    }

    #[test]
    fn validation_message_names_missing_fields() {
        let err = CharacterCreation::validate(
            &detached_session(),
            &CharacterProfile::new("", "", "civilian"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields (missing: first name, last name)"
        );
    }

    #[test]
    fn missing_fields_win_over_unknown_background() {
        let mut db = GameDatabase::new();
        let session = signed_up(&mut db, "jane@example.com");
        let profile = CharacterProfile::new("", "Doe", "ronin");
        let err =
            CharacterCreation::create_character(&mut db, Some(session.token), &profile).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields (missing: first name)"
        );
        assert!(!err.to_string().contains("ronin"));
        assert_eq!(db.character_count(), 0);
    }

    #[test]
    fn unknown_background_is_rejected() {
        let mut db = GameDatabase::new();
        let session = signed_up(&mut db, "jane@example.com");
        let profile = CharacterProfile::new("Jane", "Doe", "corporate_spy");
        let err =
            CharacterCreation::create_character(&mut db, Some(session.token), &profile).unwrap_err();
        assert!(matches!(err, GameError::Validation(ref m) if m.contains("corporate_spy")));
        assert_eq!(db.character_count(), 0);
    }

    #[test]
    fn second_character_for_account_is_a_duplicate() {
        let mut db = GameDatabase::new();
        let session = signed_up(&mut db, "jane@example.com");
        let profile = CharacterProfile::new("Jane", "Doe", "street_kid");
        CharacterCreation::create_character(&mut db, Some(session.token), &profile).unwrap();

        let again = CharacterProfile::new("John", "Roe", "civilian");
        let err =
            CharacterCreation::create_character(&mut db, Some(session.token), &again).unwrap_err();
        assert!(matches!(err, GameError::DuplicateCharacter));
        assert_eq!(db.character_count(), 1);
        assert_eq!(
            db.find_by_account(session.account_id).unwrap().unwrap().first_name,
            "Jane"
        );
    }

    #[test]
    fn blank_alias_is_stored_as_none() {
        let profile = CharacterProfile::new(" Jane ", "Doe", "civilian").with_alias("  ");
        let new_character = CharacterCreation::validate(&detached_session(), &profile).unwrap();
        assert_eq!(new_character.alias, None);
        assert_eq!(new_character.first_name, "Jane");

        let profile = CharacterProfile::new("Jane", "Doe", "civilian").with_alias("Ghost");
        let new_character = CharacterCreation::validate(&detached_session(), &profile).unwrap();
        assert_eq!(new_character.alias.as_deref(), Some("Ghost"));
    }
}
