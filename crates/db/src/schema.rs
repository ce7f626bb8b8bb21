use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const HISTORY_KEY: &str = "historical-predictions";
pub const MODEL_KEY: &str = "ml-model";
pub const SETTINGS_KEY: &str = "user-settings";
pub const TODAYS_PREDICTIONS_KEY: &str = "todays-predictions";
pub const LAST_FETCH_KEY: &str = "last-fetch-date";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct KvRecord {
    pub key: String,
    pub value: String,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}
