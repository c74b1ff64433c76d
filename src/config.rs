use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auto_migrate: bool,
}

/// What the binary should do after parsing its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve,
    Migrate,
    CreateUser {
        username: String,
        fox: bool,
        superuser: bool,
    },
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Rabbit hole tracking API")]
pub struct Args {
    /// Host to bind to (overrides WARREN_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides WARREN_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides WARREN_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled SQLite connections (overrides WARREN_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Apply migrations before serving (overrides WARREN_AUTO_MIGRATE)
    #[arg(long)]
    pub auto_migrate: bool,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Create a user with this name, log its API token and exit
    #[arg(long, value_name = "USERNAME")]
    pub create_user: Option<String>,

    /// Give the created user the fox role
    #[arg(long, requires = "create_user")]
    pub fox: bool,

    /// Make the created user a superuser
    #[arg(long, requires = "create_user")]
    pub superuser: bool,
}

fn env_parsed<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the command to run.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<(Self, Command)> {
        // --- Environment fallback ---
        let env_host = env::var("WARREN_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_parsed("WARREN_PORT", 3000u16)?;
        let env_db = env::var("WARREN_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/warren.db".into());
        let env_max_connections = env_parsed("WARREN_MAX_CONNECTIONS", 5u32)?;
        let env_auto_migrate = env_parsed("WARREN_AUTO_MIGRATE", false)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max_connections),
            auto_migrate: args.auto_migrate || env_auto_migrate,
        };

        let command = if args.migrate {
            Command::Migrate
        } else if let Some(username) = args.create_user {
            Command::CreateUser {
                username,
                fox: args.fox,
                superuser: args.superuser,
            }
        } else {
            Command::Serve
        };

        Ok((cfg, command))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_defaults() {
        let args = Args::parse_from([
            "warren",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--database-url",
            "sqlite::memory:",
        ]);
        let (cfg, command) = AppConfig::from_args(args).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(command, Command::Serve);
    }

    #[test]
    fn create_user_carries_roles() {
        let args = Args::parse_from(["warren", "--create-user", "mr-fox", "--fox"]);
        let (_, command) = AppConfig::from_args(args).unwrap();
        assert_eq!(
            command,
            Command::CreateUser {
                username: "mr-fox".into(),
                fox: true,
                superuser: false,
            }
        );
    }

    #[test]
    fn role_flags_need_a_user() {
        assert!(Args::try_parse_from(["warren", "--fox"]).is_err());
    }
}
