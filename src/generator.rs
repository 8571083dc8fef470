//! O transformador de produção: prompt, chamada ao modelo, parse e gravação.

use thiserror::Error;
use tracing::debug;

use crate::anthropic::{AnthropicError, CompletionSettings, MessageSender, complete};
use crate::item::WorkItem;
use crate::mindmap::{MindMap, parse_mind_map};
use crate::prompt::build_prompt;
use crate::store::{MindMapStore, StoreError};

/// Why generating one item's mind map failed.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("model request failed: {0}")]
    Model(#[from] AnthropicError),

    #[error("model reply is not a valid mind map: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to save mind map: {0}")]
    Store(#[from] StoreError),
}

/// Turns one [`WorkItem`] into a stored [`MindMap`].
pub struct MindMapGenerator<S, St> {
    sender: S,
    store: St,
    settings: CompletionSettings,
}

impl<S: MessageSender, St: MindMapStore> MindMapGenerator<S, St> {
    pub fn new(sender: S, store: St, settings: CompletionSettings) -> Self {
        Self {
            sender,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub async fn transform(&self, item: WorkItem) -> Result<MindMap, GenerateError> {
        let prompt = build_prompt(&item);
        let reply = complete(&self.sender, &self.settings, &prompt).await?;
        let mind_map = parse_mind_map(&reply)?;
        self.store.save(&item.subject, &item.topic, &mind_map).await?;
        debug!(topic = %item.topic, subtopics = mind_map.sub_topics.len(), "mind map generated");
        Ok(mind_map)
    }
}
