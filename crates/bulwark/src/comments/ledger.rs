//! Accepted comments, kept in memory.

use std::collections::HashMap;

use bulwark_common::constants::MAX_COMMENT_LEN;
use bulwark_common::{BulwarkError, Comment};
use tokio::sync::RwLock;

/// Author and body of an inbound comment, validated before verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSubmission {
    pub author: String,
    pub content: String,
}

impl CommentSubmission {
    /// Pull the comment fields out of a submitted form
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, BulwarkError> {
        let author = fields.get("author").map(|s| s.trim()).unwrap_or_default();
        let content = fields.get("content").map(|s| s.trim()).unwrap_or_default();

        if author.is_empty() {
            return Err(BulwarkError::InvalidInput("author is required".to_string()));
        }
        if content.is_empty() {
            return Err(BulwarkError::InvalidInput("comment text is required".to_string()));
        }
        if content.len() > MAX_COMMENT_LEN {
            return Err(BulwarkError::InvalidInput(format!(
                "comment is longer than {MAX_COMMENT_LEN} bytes"
            )));
        }

        Ok(Self {
            author: author.to_string(),
            content: content.to_string(),
        })
    }
}

/// Append-only comment storage, oldest first
#[derive(Default)]
pub struct CommentLog {
    entries: RwLock<Vec<Comment>>,
}

impl CommentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a verified submission unmodified
    pub async fn append(&self, submission: CommentSubmission, remote_address: String) -> Comment {
        let comment = Comment {
            id: generate_comment_id(),
            author: submission.author,
            content: submission.content,
            remote_address,
            created_at: chrono::Utc::now(),
        };

        self.entries.write().await.push(comment.clone());
        comment
    }

    pub async fn list(&self) -> Vec<Comment> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Generate a random URL-safe comment ID
fn generate_comment_id() -> String {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use rand::Rng;

    let mut bytes = [0u8; 12];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
