use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOrigin {
    /// Served from the content store.
    Store,
    /// Served from the bundled defaults.
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub key: String,
    pub body: Value,
    pub origin: ContentOrigin,
}
