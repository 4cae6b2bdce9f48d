use chrono::{DateTime, Utc};
use gradecalcd::CalcConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: CalcConfig,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: CalcConfig) -> Self {
        Self {
            config,
            started_at: Utc::now(),
        }
    }
}
