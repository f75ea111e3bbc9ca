//! Application configuration loaded from environment variables.

use funnel_core::routes::RouteCaps;

use crate::errors::{Result, ServerError};

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend endpoint that stores lead records and returns a lead id
    pub submission_url: String,
    /// Payment-gateway order-creation endpoint
    pub payment_order_url: String,
    /// Payment-verification endpoint
    pub payment_verify_url: String,
    /// Publishable checkout key handed to the client-side overlay
    pub checkout_key_id: String,
    /// Analytics collector endpoint; `None` disables analytics entirely
    pub analytics_url: Option<String>,
    /// Public origin used in canonical URLs and the sitemap
    pub site_base_url: String,
    /// Endpoint valid lawyer applications are forwarded to, if any
    pub lawyer_intake_url: Option<String>,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the HTTP server
    pub api_port: u16,
    /// How often (in seconds) the sweeper purges expired records
    pub sweep_interval_secs: u64,
    /// Caps on the generated topic × city page product
    pub route_caps: RouteCaps,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = RouteCaps::default();
        Ok(Config {
            submission_url: env_var("SUBMISSION_URL").map_err(|_| {
                ServerError::Config("SUBMISSION_URL environment variable is required".to_string())
            })?,
            payment_order_url: env_var("PAYMENT_ORDER_URL").map_err(|_| {
                ServerError::Config(
                    "PAYMENT_ORDER_URL environment variable is required".to_string(),
                )
            })?,
            payment_verify_url: env_var("PAYMENT_VERIFY_URL").map_err(|_| {
                ServerError::Config(
                    "PAYMENT_VERIFY_URL environment variable is required".to_string(),
                )
            })?,
            checkout_key_id: env_var("CHECKOUT_KEY_ID").map_err(|_| {
                ServerError::Config("CHECKOUT_KEY_ID environment variable is required".to_string())
            })?,
            analytics_url: env_var("ANALYTICS_URL").ok(),
            site_base_url: env_var("SITE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            lawyer_intake_url: env_var("LAWYER_INTAKE_URL").ok(),
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./funnel.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid API_PORT".to_string()))?,
            sweep_interval_secs: env_var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid SWEEP_INTERVAL_SECS".to_string()))?,
            route_caps: RouteCaps {
                topic_city_topics: env_var("MAX_TOPIC_CITY_TOPICS")
                    .unwrap_or_else(|_| defaults.topic_city_topics.to_string())
                    .parse()
                    .map_err(|_| {
                        ServerError::Config("Invalid MAX_TOPIC_CITY_TOPICS".to_string())
                    })?,
                topic_city_cities: env_var("MAX_TOPIC_CITY_CITIES")
                    .unwrap_or_else(|_| defaults.topic_city_cities.to_string())
                    .parse()
                    .map_err(|_| {
                        ServerError::Config("Invalid MAX_TOPIC_CITY_CITIES".to_string())
                    })?,
            },
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ServerError::Config(format!("Missing env var: {key}")))
}
