use serde::Deserialize;

use super::context::ContextWindow;

#[derive(Deserialize, Debug, Default, Clone)]
pub struct HookModel {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct HookWorkspace {
    pub current_dir: Option<String>,
    pub project_dir: Option<String>,
}

/// Session descriptor Claude Code pipes to the statusLine command on stdin.
///
/// Every field is optional: a payload that is missing or fails to parse
/// yields `SessionInput::default()` instead of an error.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct SessionInput {
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub model: Option<HookModel>,
    #[serde(default)]
    pub workspace: Option<HookWorkspace>,
    #[serde(default)]
    pub context_window: Option<ContextWindow>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl SessionInput {
    /// Parse raw stdin bytes, degrading to defaults on empty or malformed input.
    pub fn from_slice(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice(bytes) {
            Ok(input) => input,
            Err(err) => {
                tracing::debug!(error = %err, "stdin is not a valid session payload");
                Self::default()
            }
        }
    }

    /// `cwd`, falling back to `workspace.current_dir`.
    pub fn working_dir(&self) -> Option<&str> {
        non_empty(self.cwd.as_ref()).or_else(|| {
            self.workspace
                .as_ref()
                .and_then(|w| non_empty(w.current_dir.as_ref()))
        })
    }

    /// `model.display_name`, falling back to `model.id`.
    pub fn model_name(&self) -> Option<&str> {
        let model = self.model.as_ref()?;
        non_empty(model.display_name.as_ref()).or_else(|| non_empty(model.id.as_ref()))
    }
}
