use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
    pub api_base: String,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub gateway: GatewaySettings,
}

impl Settings {
    /// Load settings from the environment, e.g. `DATABASE__URL`,
    /// `GATEWAY__KEY_ID`, `GATEWAY__WEBHOOK_SECRET`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("gateway.api_base", "https://api.razorpay.com/v1")?
            .set_default("gateway.currency", "INR")?
            .add_source(config::Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}
