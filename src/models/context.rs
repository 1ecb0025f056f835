use serde::{Deserialize, Serialize};

/// Token counts of the most recent API call inside the context window.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct CurrentUsage {
    pub input_tokens: Option<u64>,
    pub cache_read_input_tokens: Option<u64>,
    pub cache_creation_input_tokens: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub context_window_size: Option<u64>,
    pub current_usage: Option<CurrentUsage>,
    pub total_input_tokens: Option<u64>,
}

/// Resolved context-window utilization. `percentage` is not clamped at 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextUsage {
    pub used: u64,
    pub total: u64,
    pub percentage: f64,
}
