use gray_divide::character::Background;
use gray_divide::config::{self, ServerConfig};
use gray_divide::database::GameDatabase;
use gray_divide::logging;
use gray_divide::network::GameServer;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = config::command().get_matches();
    let config = ServerConfig::from_matches(&matches)?;

    match matches.subcommand() {
        Some(("backgrounds", _)) => {
            print_backgrounds();
            Ok(())
        }
        _ => serve(config).await,
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    logging::init(&config)?;

    println!("🏙️  Loading The Gray Divide from: {}", config.database_path.display());
    let database = GameDatabase::load_or_create(&config.database_path)?
        .with_session_ttl(config.session_ttl);

    let server = GameServer::new(database);

    println!("🚀 Starting The Gray Divide server...");
    println!("🌐 Connect with: telnet localhost {}", config.port);

    server.start(config.port).await
}

fn print_backgrounds() {
    println!("Choose Your Background");
    println!("======================");
    for definition in Background::definitions() {
        let resources = definition.id.starting_resources();
        println!("\n{} ({})", definition.name, definition.id);
        println!("  {}", definition.description);
        println!("  Bonus: {}", definition.starting_bonus);
        println!(
            "  Starts with: ${} clean, ${} dirty, {} reputation",
            resources.clean_money, resources.dirty_money, resources.reputation
        );
    }
}
