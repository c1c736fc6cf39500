use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    #[default]
    Government,
    Private,
}

impl SchemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeKind::Government => "government",
            SchemeKind::Private => "private",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SchemeKind::Government => "Government",
            SchemeKind::Private => "Private",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "government" | "govt" => Some(SchemeKind::Government),
            "private" => Some(SchemeKind::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    None,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
            RiskLevel::None => "None",
        }
    }
}

/// Tags offered in the community composer. Posts may carry any tag; this
/// list only drives the selector.
pub const CROP_TAGS: &[&str] = &["General", "Wheat", "Rice", "Cotton", "Vegetables", "Fruits"];

pub const DEFAULT_CROP_TAG: &str = "General";
