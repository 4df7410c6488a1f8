use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use crate::character::{Character, NewCharacter};
use crate::error::{GameError, GameResult};
use crate::identity::{self, Account, IdentityProvider, Session};

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 720;

/// Record-oriented access to the `characters` collection, keyed by account.
pub trait CharacterStore {
    /// Inserts a character, failing with [`GameError::DuplicateCharacter`]
    /// when the account already owns one.
    fn insert(&mut self, character: NewCharacter) -> GameResult<Character>;

    fn find_by_account(&self, account_id: Uuid) -> GameResult<Option<Character>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: Account,
    pub password_hash: String,
    pub salt: String,
}

/// Accounts and characters, persisted as one JSON document. Sessions live
/// in memory only.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameDatabase {
    #[serde(default)]
    pub accounts: HashMap<String, AccountRecord>, // keyed by normalized email
    #[serde(default)]
    pub characters: HashMap<Uuid, Character>, // keyed by account id
    #[serde(skip)]
    sessions: HashMap<Uuid, Session>,
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(skip, default = "default_session_ttl")]
    session_ttl: Duration,
}

fn default_session_ttl() -> Duration {
    Duration::minutes(DEFAULT_SESSION_TTL_MINUTES)
}

impl Default for GameDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl GameDatabase {
    /// An empty database that is never written to disk.
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            characters: HashMap::new(),
            sessions: HashMap::new(),
            path: None,
            session_ttl: default_session_ttl(),
        }
    }

    pub fn load_or_create(path: &Path) -> GameResult<Self> {
        let mut db = if path.exists() {
            let data = fs::read_to_string(path)?;
            serde_json::from_str::<GameDatabase>(&data)?
        } else {
            Self::new()
        };
        db.path = Some(path.to_path_buf());
        log::info!(
            "Loaded {} accounts and {} characters from {}",
            db.accounts.len(),
            db.characters.len(),
            path.display()
        );
        Ok(db)
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Writes the document next to the database file first and renames it
    /// into place, so a failed write never truncates the existing file.
    pub fn save(&self) -> GameResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = serde_json::to_string_pretty(self)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, data)?;
        if let Err(e) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn account_by_id(&self, account_id: Uuid) -> Option<&AccountRecord> {
        self.accounts
            .values()
            .find(|record| record.account.id == account_id)
    }

    fn open_session(&mut self, account_id: Uuid) -> Session {
        let now = Utc::now();
        self.sessions.retain(|_, session| session.is_valid_at(now));

        let session = Session::open(account_id, self.session_ttl);
        self.sessions.insert(session.token, session.clone());
        session
    }

    fn hash_password(&self, password: &str, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(salt.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl CharacterStore for GameDatabase {
    fn insert(&mut self, character: NewCharacter) -> GameResult<Character> {
        let account_id = character.account_id;
        if self.account_by_id(account_id).is_none() {
            log::warn!("Refusing character for unknown account {}", account_id);
            return Err(GameError::Unauthenticated);
        }
        if self.characters.contains_key(&account_id) {
            return Err(GameError::DuplicateCharacter);
        }

        let character = character.into_character(Uuid::new_v4(), Utc::now());
        self.characters.insert(account_id, character.clone());

        if let Err(e) = self.save() {
            self.characters.remove(&account_id);
            return Err(e);
        }
        Ok(character)
    }

    fn find_by_account(&self, account_id: Uuid) -> GameResult<Option<Character>> {
        Ok(self.characters.get(&account_id).cloned())
    }
}

impl IdentityProvider for GameDatabase {
    fn sign_up(&mut self, email: &str, password: &str) -> GameResult<Session> {
        let email = identity::normalize_email(email)?;
        identity::check_password(password)?;

        if self.accounts.contains_key(&email) {
            return Err(GameError::AccountExists(email));
        }

        let salt = format!("{:x}", rand::random::<u64>());
        let password_hash = self.hash_password(password, &salt);
        let account = Account {
            id: Uuid::new_v4(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        let account_id = account.id;

        self.accounts.insert(
            email.clone(),
            AccountRecord {
                account,
                password_hash,
                salt,
            },
        );
        if let Err(e) = self.save() {
            self.accounts.remove(&email);
            return Err(e);
        }

        log::info!("Signed up account {} ({})", account_id, identity::redact_email(&email));
        Ok(self.open_session(account_id))
    }

    fn sign_in(&mut self, email: &str, password: &str) -> GameResult<Session> {
        let email = email.trim().to_lowercase();
        let record = self.accounts.get(&email).ok_or_else(|| {
            log::warn!("Sign-in for unknown email {}", identity::redact_email(&email));
            GameError::InvalidCredentials
        })?;

        let account_id = record.account.id;
        if self.hash_password(password, &record.salt) != record.password_hash {
            log::warn!("Wrong password for account {}", account_id);
            return Err(GameError::InvalidCredentials);
        }

        log::info!("Signed in account {}", account_id);
        Ok(self.open_session(account_id))
    }

    fn session(&self, token: Uuid) -> Option<Session> {
        self.sessions
            .get(&token)
            .filter(|session| session.is_valid())
            .cloned()
    }

    fn current_account(&self, token: Uuid) -> Option<Account> {
        let session = self.session(token)?;
        self.account_by_id(session.account_id)
            .map(|record| record.account.clone())
    }

    fn sign_out(&mut self, token: Uuid) {
        if let Some(session) = self.sessions.remove(&token) {
            log::info!("Signed out account {}", session.account_id);
        }
    }
}
