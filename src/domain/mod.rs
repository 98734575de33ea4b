mod attachment;
mod conversation;
mod conversation_id;
mod job;
mod job_id;
mod message;
mod message_id;
mod message_role;
mod stream_event;
mod user_id;

pub use attachment::{Attachment, AttachmentKind};
pub use conversation::{
    Conversation, DEFAULT_TITLE, DEFAULT_TITLE_MARKERS, MAX_TITLE_CHARS, is_default_title,
    title_from_prompt,
};
pub use conversation_id::ConversationId;
pub use job::{ChatJob, JobPayload, JobValidationError};
pub use job_id::JobId;
pub use message::Message;
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use stream_event::StreamEvent;
pub use user_id::UserId;
