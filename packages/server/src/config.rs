use arena_common::VotingPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Adds the `Secure` attribute to the session cookie. Enable behind HTTPS.
    #[serde(default)]
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContestConfig {
    /// Whether a manually set `voting` status is overridden once the contest ends.
    #[serde(default)]
    pub voting_policy: VotingPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EntryConfig {
    /// Timeout for each outbound image validation request.
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,
    /// Largest accepted image, by advertised content-length.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_image_timeout_secs() -> u64 {
    5
}
fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            image_timeout_secs: default_image_timeout_secs(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Admin account created on startup if no user with this email exists.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub contest: ContestConfig,
    #[serde(default)]
    pub entry: EntryConfig,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., ARENA__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("ARENA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
