use serde::{Deserialize, Serialize};

/// Descriptor of a file the client uploaded alongside a prompt. Upload and
/// text extraction happen elsewhere; only the results travel with the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Document,
    Binary,
}

impl Attachment {
    pub fn kind(&self) -> AttachmentKind {
        if self.is_image {
            AttachmentKind::Image
        } else if self
            .extracted_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
        {
            AttachmentKind::Document
        } else {
            AttachmentKind::Binary
        }
    }

    /// Suffix appended to the stored user message so the conversation
    /// history records what was attached.
    pub fn annotation(&self) -> String {
        match self.kind() {
            AttachmentKind::Image => format!("[Attached image: {}]", self.filename),
            AttachmentKind::Document | AttachmentKind::Binary => {
                format!("[Attached file: {}]", self.filename)
            }
        }
    }
}
