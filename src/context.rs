use crate::models::context::{ContextUsage, ContextWindow};

/// Window size assumed when the payload does not report one.
pub const DEFAULT_CONTEXT_SIZE: u64 = 200_000;

/// Compute used/total/percentage for the session's context window.
///
/// Used tokens come from `current_usage` (input + cache read + cache
/// creation) when present, otherwise from `total_input_tokens`. The
/// percentage can exceed 100.
pub fn calc_context_usage(window: Option<&ContextWindow>) -> ContextUsage {
    let Some(window) = window else {
        return ContextUsage {
            used: 0,
            total: DEFAULT_CONTEXT_SIZE,
            percentage: 0.0,
        };
    };

    let total = window
        .context_window_size
        .filter(|&size| size > 0)
        .unwrap_or(DEFAULT_CONTEXT_SIZE);

    let used = match &window.current_usage {
        Some(usage) => usage
            .input_tokens
            .unwrap_or(0)
            .saturating_add(usage.cache_read_input_tokens.unwrap_or(0))
            .saturating_add(usage.cache_creation_input_tokens.unwrap_or(0)),
        None => window.total_input_tokens.unwrap_or(0),
    };

    let percentage = if total > 0 {
        used as f64 * 100.0 / total as f64
    } else {
        0.0
    };

    ContextUsage {
        used,
        total,
        percentage,
    }
}
