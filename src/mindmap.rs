//! Estrutura do mapa mental gerado e o parser da resposta do modelo.

use serde::{Deserialize, Serialize};

/// A generated mind map: one main topic broken into subtopics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub main_topic: String,
    pub sub_topics: Vec<MindMapNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapNode {
    pub title: String,
    pub description: String,
}

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Extrai o JSON de dentro de um bloco ```` ```json ```` se houver um; caso
/// contrário usa o texto inteiro.
fn extract_json(text: &str) -> &str {
    let Some(start) = text.find(JSON_FENCE) else {
        return text.trim();
    };
    let body = &text[start + JSON_FENCE.len()..];
    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        None => text.trim(),
    }
}

/// Parses a model reply into a [`MindMap`], accepting either bare JSON or JSON
/// wrapped in a fenced `json` block.
pub fn parse_mind_map(text: &str) -> Result<MindMap, serde_json::Error> {
    serde_json::from_str(extract_json(text))
}
