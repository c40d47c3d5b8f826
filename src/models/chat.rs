use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub intent: String,
    pub confidence: f64,
    pub response: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub quick_replies: Option<Vec<String>>,
    #[serde(default)]
    pub entities: Option<HashMap<String, serde_json::Value>>,
}

impl ChatReply {
    /// Suggested follow-up action and extracted entities, one line each.
    /// Entities are sorted by name; string values print without quotes.
    pub fn detail_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(action) = self.action.as_deref().filter(|a| !a.is_empty()) {
            lines.push(format!("Action:   {}", action));
        }
        if let Some(entities) = &self.entities {
            let mut names: Vec<&String> = entities.keys().collect();
            names.sort();
            for name in names {
                let value = match &entities[name] {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(format!("Entity:   {} = {}", name, value));
            }
        }
        lines
    }
}
