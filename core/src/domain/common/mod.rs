use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp};

pub mod entities;

#[derive(Clone, Debug)]
pub struct DietChatConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub default_meal: crate::domain::meal::MealType,
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, now.timestamp_subsec_nanos());

    (now, timestamp)
}
