use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub booking_id: String,
    pub customer_id: String,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}
