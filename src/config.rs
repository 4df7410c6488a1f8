use anyhow::{anyhow, Result};
use chrono::Duration;
use clap::{value_parser, Arg, ArgMatches, Command};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub session_ttl: Duration,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

pub fn command() -> Command {
    Command::new("gray-divide")
        .about("The Gray Divide: a city balanced on the edge of law and crime")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(Arg::new("port")
            .short('p')
            .long("port")
            .value_name("PORT")
            .help("Port to listen on")
            .value_parser(value_parser!(u16))
            .default_value("2323")
            .global(true))
        .arg(Arg::new("database")
            .short('d')
            .long("database")
            .value_name("FILE")
            .help("Database file path")
            .default_value("gray_divide.json")
            .global(true))
        .arg(Arg::new("session-ttl")
            .long("session-ttl")
            .value_name("MINUTES")
            .help("How long a login stays valid")
            .value_parser(value_parser!(i64))
            .default_value("720")
            .global(true))
        .arg(Arg::new("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("off, error, warn, info, debug or trace")
            .default_value("info")
            .global(true))
        .arg(Arg::new("log-file")
            .long("log-file")
            .value_name("FILE")
            .help("Also write the log to this file")
            .global(true))
        .subcommand(Command::new("serve").about("Run the game server (default)"))
        .subcommand(Command::new("backgrounds").about("List character backgrounds"))
}

impl ServerConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let matches = matches.subcommand().map(|(_, sub)| sub).unwrap_or(matches);

        let port = *matches.get_one::<u16>("port").ok_or_else(|| anyhow!("missing --port"))?;
        let database_path = matches
            .get_one::<String>("database")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("missing --database"))?;

        let ttl_minutes = *matches
            .get_one::<i64>("session-ttl")
            .ok_or_else(|| anyhow!("missing --session-ttl"))?;
        if ttl_minutes <= 0 {
            return Err(anyhow!("--session-ttl must be positive, got {}", ttl_minutes));
        }

        let log_level = matches
            .get_one::<String>("log-level")
            .map(String::as_str)
            .unwrap_or("info");
        let log_level = log_level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("unknown log level '{}'", log_level))?;

        Ok(Self {
            port,
            database_path,
            session_ttl: Duration::minutes(ttl_minutes),
            log_level,
            log_file: matches.get_one::<String>("log-file").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ServerConfig> {
        let matches = command().try_get_matches_from(args)?;
        ServerConfig::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let config = parse(&["gray-divide"]).unwrap();
        assert_eq!(config.port, 2323);
        assert_eq!(config.database_path, PathBuf::from("gray_divide.json"));
        assert_eq!(config.session_ttl, Duration::minutes(720));
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn serve_flags() {
        let config = parse(&[
            "gray-divide", "serve", "--port", "4000", "-d", "city.json",
            "--session-ttl", "5", "--log-level", "debug", "--log-file", "gd.log",
        ])
        .unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.database_path, PathBuf::from("city.json"));
        assert_eq!(config.session_ttl, Duration::minutes(5));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("gd.log")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["gray-divide", "--session-ttl", "0"]).is_err());
        assert!(parse(&["gray-divide", "--log-level", "loud"]).is_err());
        assert!(parse(&["gray-divide", "--port", "seventy"]).is_err());
    }
}
