use async_trait::async_trait;

use crate::application::ports::{ReplyGenerator, ReplyGeneratorError};
use crate::domain::{Attachment, AttachmentKind, ChatJob};

pub const DEFAULT_EXCERPT_CHARS: usize = 500;

/// Acknowledges the prompt and describes any attachment. Stands in for a
/// model-backed generator; the pipeline around it does not care which one
/// produced the text.
pub struct CannedReplyGenerator {
    excerpt_chars: usize,
}

impl CannedReplyGenerator {
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    pub fn compose(&self, prompt: &str, attachment: Option<&Attachment>) -> String {
        let mut reply = format!("I received your message: \"{}\".", prompt.trim());
        if let Some(attachment) = attachment {
            reply.push_str("\n\n");
            reply.push_str(&self.describe_attachment(attachment));
        }
        reply
    }

    fn describe_attachment(&self, attachment: &Attachment) -> String {
        match attachment.kind() {
            AttachmentKind::Image => format!(
                "I can see you've shared an image (\"{}\"). I've noted it alongside your message.",
                attachment.filename
            ),
            AttachmentKind::Document => {
                let text = attachment.extracted_text.as_deref().unwrap_or_default();
                let pages = match attachment.pages {
                    Some(1) => " (1 page)".to_string(),
                    Some(n) => format!(" ({} pages)", n),
                    None => String::new(),
                };
                format!(
                    "I've read the document \"{}\"{}. Here's how it begins:\n\n{}\n\nWhat would you like to know about it?",
                    attachment.filename,
                    pages,
                    excerpt(text, self.excerpt_chars)
                )
            }
            AttachmentKind::Binary => {
                let size = attachment
                    .size
                    .map(|bytes| format!("{} bytes", bytes))
                    .unwrap_or_else(|| "unknown size".to_string());
                format!(
                    "I received the file \"{}\" ({}), but I can't read its contents.",
                    attachment.filename, size
                )
            }
        }
    }
}

impl Default for CannedReplyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_CHARS)
    }
}

#[async_trait]
impl ReplyGenerator for CannedReplyGenerator {
    async fn generate(&self, job: &ChatJob) -> Result<String, ReplyGeneratorError> {
        Ok(self.compose(&job.prompt, job.attachment.as_ref()))
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices();
    match chars.nth(max_chars) {
        Some((cut, _)) => format!("{}...", trimmed[..cut].trim_end()),
        None => trimmed.to_string(),
    }
}
