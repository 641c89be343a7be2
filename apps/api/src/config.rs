use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook endpoint that computes the actual recommendations.
    pub webhook_url: String,
    /// Path of the JSON document holding the credential mapping.
    pub users_file: String,
    pub spreadsheet_id: String,
    pub sheets_api_token: String,
    pub user_sheet_name: String,
    pub course_sheet_name: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            webhook_url: require_env("WEBHOOK_URL")?,
            users_file: std::env::var("USERS_FILE").unwrap_or_else(|_| "users.json".to_string()),
            spreadsheet_id: require_env("SPREADSHEET_ID")?,
            sheets_api_token: require_env("SHEETS_API_TOKEN")?,
            user_sheet_name: std::env::var("USER_SHEET_NAME")
                .unwrap_or_else(|_| "Sheet1".to_string()),
            course_sheet_name: std::env::var("COURSE_SHEET_NAME")
                .unwrap_or_else(|_| "course_recommendations".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
