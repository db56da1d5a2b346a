//! Records flowing between the spam-check stages

use serde::{Deserialize, Serialize};

/// A user derived from an email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Identifier derived from the email
    pub id: u64,
    /// Source email
    pub email: String,
}

/// A message belonging to a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId {
    /// Owner's user id
    pub user_id: u64,
    /// Message text
    pub text: String,
}

/// A classified message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub id: MessageId,
    /// Classification verdict
    pub verdict: String,
}
