//! Agent definitions: a named configuration binding an LLM provider, model,
//! system prompt, and a permitted tool subset, plus an optional on-disk store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, instrument};

use crate::integration::{McpError, McpResult};

/// A named configuration binding an LLM provider, model, system prompt, and a
/// permitted tool subset (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub provider: String,
    #[serde(rename = "modelName")]
    pub model_name: String,
    #[serde(rename = "systemPrompt")]
    pub system_prompt: String,
    #[serde(rename = "toolIds")]
    pub tool_ids: Vec<String>,
    pub parameters: HashMap<String, Value>,
    pub category: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(rename = "modifiedBy")]
    pub modified_by: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Replace any filesystem-hostile character in an agent id with `_`, as the
/// store's filename basis.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// One JSON document per agent, filename `<sanitized-id>.json`, pretty-printed.
pub struct AgentStore {
    directory: PathBuf,
}

impl AgentStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.directory.join(format!("{}.json", sanitize_id(id)))
    }

    #[instrument(level = "debug", skip(self, definition))]
    pub async fn save(&self, definition: &AgentDefinition) -> McpResult<()> {
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| McpError::internal_error(format!("failed to create agent store directory: {e}")))?;

        let body = serde_json::to_string_pretty(definition)
            .map_err(|e| McpError::internal_error(format!("failed to serialize agent definition: {e}")))?;

        let path = self.path_for(&definition.id);
        fs::write(&path, body)
            .await
            .map_err(|e| McpError::internal_error(format!("failed to write {}: {e}", path.display())))?;

        debug!(agent_id = %definition.id, path = %path.display(), "agent definition saved");
        Ok(())
    }

    pub async fn load(&self, id: &str) -> McpResult<AgentDefinition> {
        let path = self.path_for(id);
        let body = fs::read_to_string(&path)
            .await
            .map_err(|e| McpError::internal_error(format!("failed to read {}: {e}", path.display())))?;

        serde_json::from_str(&body)
            .map_err(|e| McpError::internal_error(format!("failed to parse {}: {e}", path.display())))
    }

    pub async fn remove(&self, id: &str) -> McpResult<()> {
        let path = self.path_for(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(McpError::internal_error(format!("failed to remove {}: {e}", path.display()))),
        }
    }

    pub async fn list_ids(&self) -> McpResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.directory)
            .await
            .map_err(|e| McpError::internal_error(format!("failed to read agent store directory: {e}")))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| McpError::internal_error(format!("failed to read directory entry: {e}")))?
        {
            if let Some(stem) = Path::new(&entry.file_name()).file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> AgentDefinition {
        let now = Utc::now();
        AgentDefinition {
            id: id.to_string(),
            name: "Math helper".to_string(),
            description: "Answers math questions".to_string(),
            provider: "openai".to_string(),
            model_name: "gpt-4".to_string(),
            system_prompt: "You are a helpful math assistant.".to_string(),
            tool_ids: vec!["add".to_string(), "multiply".to_string()],
            parameters: HashMap::new(),
            category: "utility".to_string(),
            created_by: "tester".to_string(),
            modified_by: "tester".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sanitize_id_replaces_invalid_filename_characters() {
        assert_eq!(sanitize_id("agent/1:main"), "agent_1_main");
        assert_eq!(sanitize_id("agent-1_ok"), "agent-1_ok");
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join(format!("mcp_core_agent_store_test_{}", uuid::Uuid::new_v4()));
        let store = AgentStore::new(&dir);
        let definition = sample("agent-1");

        store.save(&definition).await.unwrap();
        let loaded = store.load("agent-1").await.unwrap();
        assert_eq!(loaded, definition);

        let ids = store.list_ids().await.unwrap();
        assert_eq!(ids, vec!["agent-1".to_string()]);

        store.remove("agent-1").await.unwrap();
        assert!(store.load("agent-1").await.is_err());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
