mod canned_reply_generator;

pub use canned_reply_generator::{CannedReplyGenerator, DEFAULT_EXCERPT_CHARS};
