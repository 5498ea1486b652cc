use serde::{Deserialize, Serialize};

/// What gets pushed to a user, independent of the channel that ends up
/// carrying it. Built per send and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Per-dispatch channel opt-outs. A caller that already delivers through
/// one channel itself sets the matching flag to avoid double delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkipFlags {
    pub socket: bool,
    pub sse: bool,
    pub push: bool,
    pub email: bool,
}
