use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub phone: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentForm {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatForm {
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemeQuery {
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceQuery {
    #[serde(default)]
    pub market: Option<String>,
}
