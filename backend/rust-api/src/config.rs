use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStorageSettings {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub documents_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub server: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub http_port: u16,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub catalog_path: String,
    pub upload_timeout_secs: u64,
    pub notify_timeout_secs: u64,
    pub storage: ObjectStorageSettings,
    pub email: EmailSettings,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let http_port = settings
            .get_string("server.http_port")
            .or_else(|_| env::var("HTTP_PORT"))
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(5000);

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .or_else(|_| env::var("DATABASE_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "quiz".to_string());

        let catalog_path = settings
            .get_string("catalog.path")
            .or_else(|_| env::var("QUESTIONS_PATH"))
            .unwrap_or_else(|_| "questions.json".to_string());

        let upload_timeout_secs = settings
            .get_string("pipeline.upload_timeout_secs")
            .or_else(|_| env::var("UPLOAD_TIMEOUT_SECS"))
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(30);

        let notify_timeout_secs = settings
            .get_string("pipeline.notify_timeout_secs")
            .or_else(|_| env::var("NOTIFY_TIMEOUT_SECS"))
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(15);

        let storage = match settings.get::<ObjectStorageSettings>("storage") {
            Ok(storage) => storage,
            Err(_) => ObjectStorageSettings {
                bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "quiz-results".to_string()),
                region: env::var("STORAGE_REGION").unwrap_or_else(|_| "ru-central1".to_string()),
                endpoint: env::var("STORAGE_ENDPOINT").ok(),
                access_key: env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| {
                    if env == "prod" {
                        panic!("FATAL: STORAGE_ACCESS_KEY must be set in production!");
                    }
                    eprintln!("WARNING: STORAGE_ACCESS_KEY not set (dev mode only!)");
                    String::new()
                }),
                secret_key: env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| {
                    if env == "prod" {
                        panic!("FATAL: STORAGE_SECRET_KEY must be set in production!");
                    }
                    eprintln!("WARNING: STORAGE_SECRET_KEY not set (dev mode only!)");
                    String::new()
                }),
                documents_prefix: env::var("STORAGE_PREFIX")
                    .unwrap_or_else(|_| "results".to_string()),
            },
        };

        let email = match settings.get::<EmailSettings>("email") {
            Ok(email) => email,
            Err(_) => {
                let login = env::var("EMAIL_USER").unwrap_or_else(|_| {
                    if env == "prod" {
                        panic!("FATAL: EMAIL_USER must be set in production!");
                    }
                    eprintln!("WARNING: EMAIL_USER not set (dev mode only!)");
                    String::new()
                });
                EmailSettings {
                    server: env::var("EMAIL_SMTP_SERVER")
                        .unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                    port: env::var("EMAIL_SMTP_PORT")
                        .ok()
                        .and_then(|value| value.parse().ok())
                        .unwrap_or(587),
                    password: env::var("EMAIL_PASS").unwrap_or_default(),
                    from_email: env::var("EMAIL_FROM").unwrap_or_else(|_| login.clone()),
                    from_name: env::var("EMAIL_FROM_NAME")
                        .unwrap_or_else(|_| "Quiz Team".to_string()),
                    use_tls: env::var("EMAIL_USE_TLS")
                        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                        .unwrap_or(true),
                    login,
                }
            }
        };

        Ok(Config {
            http_port,
            mongo_uri,
            mongo_database,
            catalog_path,
            upload_timeout_secs,
            notify_timeout_secs,
            storage,
            email,
        })
    }
}
