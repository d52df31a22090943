use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

/// Credential of the single demo user. Stored and compared in plaintext;
/// acceptable only for a demo deployment.
pub const DEMO_USERNAME: &str = "15.413.217-1";
pub const DEMO_PASSWORD: &str = "AiPuedaexeeb0ei";
pub const DEMO_OWNER_ID: &str = "12345678";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Which store backs the services.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: default_auto_migrate(),
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_auto_migrate() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub owner_id: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: DEMO_USERNAME.into(),
            password: DEMO_PASSWORD.into(),
            owner_id: DEMO_OWNER_ID.into(),
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Configuration used when no file is present: host/port from
    /// `SERVER_HOST`/`SERVER_PORT`, in-memory store unless `DATABASE_URL` is set.
    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                cfg.database.backend = StoreBackend::Postgres;
                cfg.database.url = url;
            }
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // a url in the environment wins over an empty one in TOML
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Memory {
            return Ok(());
        }
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() || self.owner_id.trim().is_empty() {
            return Err(anyhow!("auth.username and auth.owner_id are required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tmp(body: &str) -> String {
        let path = std::env::temp_dir().join(format!("bank_cfg_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn empty_file_yields_memory_defaults() {
        let path = write_tmp("");
        let mut cfg = load_from_file(&path).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.database.backend, StoreBackend::Memory);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.auth.owner_id, DEMO_OWNER_ID);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn postgres_backend_requires_postgres_url() {
        let path = write_tmp(
            "[database]\nbackend = \"postgres\"\nurl = \"mysql://localhost/bank\"\n",
        );
        let mut cfg = load_from_file(&path).unwrap();
        assert!(cfg.normalize_and_validate().is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn zero_worker_threads_normalized() {
        let path = write_tmp("[server]\nhost = \"\"\nport = 9000\nworker_threads = 0\n");
        let mut cfg = load_from_file(&path).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn auth_section_overrides_demo_user() {
        let path = write_tmp(
            "[auth]\nusername = \"alice\"\npassword = \"correct\"\nowner_id = \"alice-owner-id\"\n",
        );
        let mut cfg = load_from_file(&path).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.auth.username, "alice");
        assert_eq!(cfg.auth.owner_id, "alice-owner-id");
        let _ = std::fs::remove_file(path);
    }
}
