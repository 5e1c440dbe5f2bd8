use std::future::Future;

/// Blocking questions put to the person in front of the client.
pub trait UserPrompt: Send + Sync {
    /// Yes/no confirmation before a destructive action.
    fn confirm(&self, message: &str) -> impl Future<Output = bool> + Send;

    /// Optional free-text answer; `None` when the user cancels.
    fn prompt(&self, message: &str) -> impl Future<Output = Option<String>> + Send;
}
