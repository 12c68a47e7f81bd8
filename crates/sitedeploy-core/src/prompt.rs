// ── Operator decisions ──

use crate::error::CoreError;

/// Asks the operator to confirm or disambiguate before a destructive step.
pub trait Prompter: Send + Sync {
    /// Yes/no question. `Ok(false)` means the operator declined.
    fn confirm(&self, prompt: &str) -> Result<bool, CoreError>;

    /// Pick one of `items`. `Ok(None)` means no choice could be made
    /// (non-interactive session or the operator backed out).
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>, CoreError>;
}

/// Non-interactive answers: accept confirmations, never guess between candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool, CoreError> {
        Ok(true)
    }

    fn select(&self, _prompt: &str, _items: &[String]) -> Result<Option<usize>, CoreError> {
        Ok(None)
    }
}
