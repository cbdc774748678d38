use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        base_url: get_env_or_default("PKD_API_BASE_URL", "http://localhost:3000"),
    }
});

pub struct Config {
    /// Base URL of the PKD classification backend, without a trailing slash.
    pub base_url: String,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
