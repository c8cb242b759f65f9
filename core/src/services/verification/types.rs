//! Types for verification service results

use chrono::{DateTime, Utc};

/// Result of issuing a verification code
#[derive(Debug, Clone)]
pub struct IssueCodeResult {
    /// True when the SMS transport is simulated
    pub dev_mode: bool,
    /// The code itself, only ever present in dev mode
    pub code: Option<String>,
    /// When the issued code stops being accepted
    pub expires_at: DateTime<Utc>,
}
