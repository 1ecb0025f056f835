pub mod context;
pub mod git;
pub mod hook;
pub mod usage;

pub use context::{ContextUsage, ContextWindow, CurrentUsage};
pub use git::{AheadBehind, GitInfo, GitStatusCounts};
pub use hook::{HookModel, HookWorkspace, SessionInput};
pub use usage::{UsageQuota, UsageWindow};
