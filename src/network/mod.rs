use tokio::net::{TcpListener, TcpStream};
use tokio::io::{AsyncWriteExt, AsyncBufReadExt, BufReader};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;
use anyhow::Result;
use crate::character::{Background, Character, CharacterCreation, CharacterProfile, FactionColor};
use crate::database::GameDatabase;
use crate::error::{GameError, GameResult};
use crate::identity::IdentityProvider;
use crate::routing::{self, Route};

const RESET: &str = "\x1b[0m";

/// Per-connection state. The token is handed to the identity provider on
/// every command; nothing else about the session is cached here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Connection {
    pub token: Option<Uuid>,
}

pub struct GameServer {
    database: Arc<Mutex<GameDatabase>>,
}

impl GameServer {
    pub fn new(database: GameDatabase) -> Self {
        Self {
            database: Arc::new(Mutex::new(database)),
        }
    }

    pub fn database(&self) -> Arc<Mutex<GameDatabase>> {
        Arc::clone(&self.database)
    }

    pub async fn start(&self, port: u16) -> Result<()> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        log::info!("The Gray Divide listening on port {}", port);
        self.serve(listener).await
    }

    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, addr) = listener.accept().await?;
            log::info!("New connection from {}", addr);

            let database = Arc::clone(&self.database);
            tokio::spawn(async move {
                if let Err(e) = Self::handle_client(stream, database).await {
                    log::error!("Error handling client {}: {}", addr, e);
                }
                log::info!("Connection from {} closed", addr);
            });
        }
    }

    async fn handle_client(mut stream: TcpStream, database: Arc<Mutex<GameDatabase>>) -> Result<()> {
        stream.write_all(format!("\x1b[2J\x1b[H{}\r\n> ", landing_screen()).as_bytes()).await?;

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut connection = Connection::default();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }
            let input = line.trim();
            if input.is_empty() {
                write_half.write_all(b"> ").await?;
                continue;
            }

            match Self::handle_command(input, &mut connection, &database).await {
                Ok(Some(msg)) => {
                    write_half.write_all(format!("{}\r\n> ", msg).as_bytes()).await?;
                }
                Ok(None) => {
                    write_half.write_all(b"Goodbye!\r\n").await?;
                    break;
                }
                Err(e) => {
                    let error_msg = format!("\x1b[91mError: {}{}", e, RESET);
                    write_half.write_all(format!("{}\r\n> ", error_msg).as_bytes()).await?;
                }
            }
        }

        Ok(())
    }

    /// Runs one command line. `Ok(None)` closes the connection; errors are
    /// shown to the player verbatim.
    ///
    /// Commands may write the database file, so they run on the blocking
    /// pool with the lock held there rather than on an async worker.
    pub async fn handle_command(
        input: &str,
        connection: &mut Connection,
        database: &Arc<Mutex<GameDatabase>>,
    ) -> GameResult<Option<String>> {
        let input = input.to_string();
        let mut scratch = *connection;
        let database = Arc::clone(database);

        let (reply, scratch) = tokio::task::spawn_blocking(move || {
            let mut db = database.blocking_lock();
            let reply = Self::execute(&input, &mut scratch, &mut db);
            (reply, scratch)
        })
        .await
        .map_err(|e| GameError::StoreUnavailable(format!("command task failed: {}", e)))?;

        connection.token = scratch.token;
        reply
    }

    fn execute(
        input: &str,
        connection: &mut Connection,
        db: &mut GameDatabase,
    ) -> GameResult<Option<String>> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some(command) = parts.first().map(|c| c.to_lowercase()) else {
            return Ok(Some(help_text()));
        };

        let reply = match command.as_str() {
            "help" => help_text(),
            "backgrounds" => backgrounds_text(),
            "signup" => {
                if parts.len() != 3 {
                    return Ok(Some("Usage: signup <email> <password>".to_string()));
                }
                if let Some(token) = connection.token.take() {
                    db.sign_out(token);
                }
                let session = db.sign_up(parts[1], parts[2])?;
                connection.token = Some(session.token);
                format!(
                    "\x1b[92mAccount created for {}.{}\r\n{}",
                    parts[1].trim().to_lowercase(),
                    RESET,
                    Self::show(Route::Dashboard, connection, db)?
                )
            }
            "login" => {
                if parts.len() != 3 {
                    return Ok(Some("Usage: login <email> <password>".to_string()));
                }
                let resolution = routing::resolve(&*db, &*db, connection.token)?;
                if routing::route_for(Route::SignIn, &resolution) != Route::SignIn {
                    format!(
                        "Already logged in.\r\n{}",
                        Self::show(Route::Dashboard, connection, db)?
                    )
                } else {
                    let session = db.sign_in(parts[1], parts[2])?;
                    connection.token = Some(session.token);
                    format!(
                        "\x1b[92mWelcome back.{}\r\n{}",
                        RESET,
                        Self::show(Route::Dashboard, connection, db)?
                    )
                }
            }
            "create" => {
                if parts.len() < 4 {
                    return Ok(Some(
                        "Usage: create <first name> <last name> <background> [alias]".to_string(),
                    ));
                }
                let mut profile = CharacterProfile::new(parts[1], parts[2], parts[3]);
                if parts.len() > 4 {
                    profile = profile.with_alias(&parts[4..].join(" "));
                }

                CharacterCreation::create_character(&mut *db, connection.token, &profile)?;
                Self::show(Route::Dashboard, connection, db)?
            }
            "dashboard" | "stats" => Self::show(Route::Dashboard, connection, db)?,
            "logout" => {
                if let Some(token) = connection.token.take() {
                    db.sign_out(token);
                }
                landing_screen()
            }
            "quit" | "exit" => return Ok(None),
            _ => "Unknown command. Type 'help' for available commands.".to_string(),
        };

        Ok(Some(reply))
    }

    /// Renders `requested`, or whatever screen resolution redirects to.
    fn show(requested: Route, connection: &Connection, db: &GameDatabase) -> GameResult<String> {
        let resolution = routing::resolve(db, db, connection.token)?;
        let text = match (routing::route_for(requested, &resolution), &resolution) {
            (Route::Dashboard, routing::Resolution::Ready(_, character)) => render_dashboard(character),
            (Route::CreateCharacter, _) => create_prompt(),
            (Route::Landing, _) => landing_screen(),
            _ => sign_in_prompt(),
        };
        Ok(text)
    }
}

fn color_code(color: FactionColor) -> &'static str {
    match color {
        FactionColor::NeutralGray => "\x1b[90m",
        FactionColor::Red => "\x1b[91m",
        FactionColor::Blue => "\x1b[94m",
    }
}

pub fn landing_screen() -> String {
    format!("{}{}{}{}{}{}",
        "\x1b[97m╔════════════════════════════════════════════╗\r\n",
        "║              THE GRAY DIVIDE               ║\r\n",
        "╚════════════════════════════════════════════╝\x1b[0m\r\n",
        "A city balanced on the edge of law and crime.\r\n",
        "Build your reputation, manage your heat, and decide which side of the line you stand on.\r\n",
        "Type 'login', 'signup' or 'dashboard'. Type 'help' for all commands."
    )
}

fn sign_in_prompt() -> String {
    "You need to log in first: 'login <email> <password>' or 'signup <email> <password>'.".to_string()
}

fn create_prompt() -> String {
    format!(
        "You don't have a character yet. Type 'backgrounds' to see your options, then\r\n\
         'create <first name> <last name> <background> [alias]'. Backgrounds: {}",
        Background::ALL.map(|bg| bg.id()).join(", ")
    )
}

pub fn help_text() -> String {
    format!("{}{}{}{}{}{}{}{}",
        "\x1b[96m=== COMMANDS ===\x1b[0m\r\n",
        "\x1b[93msignup <email> <password>\x1b[0m  - Start a new account\r\n",
        "\x1b[93mlogin <email> <password>\x1b[0m   - Log in & continue\r\n",
        "\x1b[93mbackgrounds\x1b[0m                - List character backgrounds\r\n",
        "\x1b[93mcreate <first> <last> <background> [alias]\x1b[0m - Create your character\r\n",
        "\x1b[93mdashboard\x1b[0m                  - Show your character\r\n",
        "\x1b[93mlogout\x1b[0m                     - Log out\r\n",
        "\x1b[93mquit\x1b[0m                       - Exit"
    )
}

pub fn backgrounds_text() -> String {
    let mut result = String::from("\x1b[95m=== CHOOSE YOUR BACKGROUND ===\x1b[0m\r\n");
    result.push_str("This affects your starting position but doesn't lock you into any path.\r\n");
    for definition in Background::definitions() {
        result.push_str(&format!(
            "\r\n\x1b[93m{}\x1b[0m ({}) [{}]\r\n  {}\r\n",
            definition.name, definition.id, definition.starting_bonus, definition.description
        ));
    }
    result
}

pub fn render_dashboard(character: &Character) -> String {
    let summary = character.summary();
    let color = color_code(summary.faction_color);

    let mut result = String::from("\x1b[97m=== THE GRAY DIVIDE ===\x1b[0m\r\n");
    result.push_str(&format!("{}\r\n", summary.display_name));
    result.push_str(&format!("{}{}{}\r\n\r\n", color, summary.faction_header(), RESET));
    result.push_str(&format!(
        "Rank: {}   XP: {}   Reputation: {}   Heat: \x1b[33m{}{}\r\n",
        summary.rank, summary.xp, summary.reputation, summary.heat, RESET
    ));
    result.push_str(&format!("Clean Money: \x1b[92m{}{}\r\n", summary.clean_money, RESET));
    result.push_str(&format!("Dirty Money: \x1b[91m{}{}\r\n\r\n", summary.dirty_money, RESET));
    result.push_str("=== CHARACTER INFO ===\r\n");
    result.push_str(&format!("Background:      {}\r\n", summary.background_label));
    result.push_str(&format!(
        "Current Faction: {}{}{}\r\n\r\n",
        color,
        summary.faction_detail(),
        RESET
    ));
    result.push_str("=== COMING SOON ===\r\n");
    result.push_str("Operations, Territory Map, Organizations, and more...");
    result
}
