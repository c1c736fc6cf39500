use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Uploads {
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub uploads: Uploads,
    pub session: Session,
    pub assistant: Assistant,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Optional settings.toml, in the working directory or the crate directory
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        let dev_path = PathBuf::from("kisan-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        // 2. Defaults
        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.path", "kisan.db")?
            .set_default("uploads.dir", "static/uploads")?
            .set_default("session.ttl_days", 30)?
            .set_default("assistant.api_key", "")?
            .set_default("assistant.model", "gemini-1.5-flash")?
            .set_default(
                "assistant.base_url",
                "https://generativelanguage.googleapis.com",
            )?;

        // 3. Environment variables (highest priority)
        let overrides = [
            ("DATABASE_PATH", "database.path"),
            ("PORT", "server.port"),
            ("HOST", "server.host"),
            ("UPLOAD_DIR", "uploads.dir"),
            ("SESSION_TTL_DAYS", "session.ttl_days"),
            ("GEMINI_API_KEY", "assistant.api_key"),
            ("GEMINI_MODEL", "assistant.model"),
            ("GEMINI_BASE_URL", "assistant.base_url"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let s = builder.build()?;
        s.try_deserialize()
    }

    /// Settings for tests: in-memory database, uploads under the temp dir
    pub fn for_tests() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("kisan-uploads-{}", uuid::Uuid::new_v4()));
        Self {
            server: Server {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: Database {
                path: ":memory:".to_string(),
            },
            uploads: Uploads {
                dir: upload_dir.to_string_lossy().into_owned(),
            },
            session: Session { ttl_days: 30 },
            assistant: Assistant {
                api_key: String::new(),
                model: "gemini-1.5-flash".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
            },
        }
    }
}
