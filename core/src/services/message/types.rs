use crate::domain::entities::Message;

/// Result of composing a message
#[derive(Debug, Clone)]
pub struct ComposeResult {
    pub message: Message,
    /// Number of recipients fanned out to
    pub recipients: usize,
}
