//! The host comment pipeline: form markup and accepted-comment storage.

mod ledger;
mod markup;

pub use ledger::{CommentLog, CommentSubmission};
pub use markup::{escape_html, render_comment_form};
