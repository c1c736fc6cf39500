use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ChatRole, SchemeKind};

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    /// Argon2 PHC string; absent for phone-only accounts
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    #[serde(with = "datetime_format")]
    pub join_date: DateTime<Utc>,
}

impl User {
    /// Display name used for phone-only accounts, e.g. "Farmer 3210".
    pub fn default_name_for_phone(phone: &str) -> String {
        let digits: Vec<char> = phone.chars().collect();
        let start = digits.len().saturating_sub(4);
        let tail: String = digits[start..].iter().collect();
        format!("Farmer {}", tail)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub tag: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub has_image: bool,
    pub like_count: i32,
    pub comment_count: i32,
    /// Comments in chronological order; filled by the handler layer
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_name: String,
    pub content: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub name: String,
    pub description: String,
    /// Free-form, e.g. "₹2200 / quintal"
    pub price: String,
    pub location: String,
    pub contact: String,
    pub has_image: bool,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheme {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub eligibility: String,
    pub kind: SchemeKind,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub id: i64,
    pub market: String,
    pub crop: String,
    pub variety: String,
    pub min_price: i64,
    pub max_price: i64,
    pub modal_price: i64,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// Raw image payload stored alongside a post or product
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}
