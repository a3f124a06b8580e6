use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// JWT signing secret for API authentication
    pub jwt_secret: String,

    /// Access token expiry in hours
    pub jwt_expiry_hours: u64,

    /// Refresh token expiry in hours
    pub jwt_refresh_expiry_hours: u64,

    /// Sender address for outbound email
    pub email_from: Option<String>,

    /// API key for the transactional email service
    pub email_api_key: Option<String>,

    /// Endpoint of the transactional email service
    pub email_api_url: String,

    /// API key for the SMS gateway; the SMS channel is unavailable without it
    pub sms_api_key: Option<String>,

    /// Sender name shown on outbound SMS
    pub sms_sender: Option<String>,

    /// Endpoint of the SMS gateway
    pub sms_api_url: String,

    /// Telegram bot token; the Telegram channel is unavailable without it
    pub telegram_bot_token: Option<String>,

    /// Telegram Bot API base URL (the token is appended to it)
    pub telegram_api_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JWT_EXPIRY_HOURS must be a valid u64"))?,
            jwt_refresh_expiry_hours: std::env::var("JWT_REFRESH_EXPIRY_HOURS")
                .unwrap_or_else(|_| "168".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JWT_REFRESH_EXPIRY_HOURS must be a valid u64"))?,
            email_from: std::env::var("EMAIL_FROM").ok(),
            email_api_key: std::env::var("EMAIL_API_KEY").ok(),
            email_api_url: std::env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
            sms_api_key: std::env::var("SMS_API_KEY").ok(),
            sms_sender: std::env::var("SMS_SENDER").ok(),
            sms_api_url: std::env::var("SMS_API_URL")
                .unwrap_or_else(|_| "https://sms.tele2.ru/api/v1/messages".to_string()),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org/bot".to_string()),
        })
    }
}
