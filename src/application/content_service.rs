use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::content::{ContentBlock, ContentOrigin};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContentRepository;

const BUNDLED_DEFAULTS: &str = include_str!("../../content/defaults.json");

/// Content served when the store has no block for a key.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    blocks: HashMap<String, Value>,
}

impl StaticContent {
    pub fn new(blocks: HashMap<String, Value>) -> Self {
        Self { blocks }
    }

    /// The defaults shipped in `content/defaults.json`.
    pub fn bundled() -> Result<Self, DomainError> {
        Self::from_json(BUNDLED_DEFAULTS)
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let blocks = serde_json::from_str(raw)
            .map_err(|e| DomainError::Internal(format!("invalid default content: {e}")))?;
        Ok(Self { blocks })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.blocks.get(key)
    }
}

/// Reads content blocks from the store and falls back to [`StaticContent`]
/// when the store misses or fails.
pub struct ContentService {
    store: Arc<dyn ContentRepository>,
    defaults: StaticContent,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentRepository>, defaults: StaticContent) -> Self {
        Self { store, defaults }
    }

    pub fn get(&self, key: &str) -> Result<ContentBlock, DomainError> {
        match self.store.find_block(key) {
            Ok(Some(body)) => {
                return Ok(ContentBlock {
                    key: key.to_string(),
                    body,
                    origin: ContentOrigin::Store,
                })
            }
            Ok(None) => {}
            Err(e) => log::warn!("Content store lookup for {key:?} failed, using defaults: {e}"),
        }

        self.defaults
            .get(key)
            .map(|body| ContentBlock {
                key: key.to_string(),
                body: body.clone(),
                origin: ContentOrigin::Default,
            })
            .ok_or(DomainError::NotFound("Content"))
    }
}
