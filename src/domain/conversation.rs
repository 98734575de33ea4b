use super::{ConversationId, UserId};
use chrono::{DateTime, Utc};

/// Title given to conversations that the user has not named yet.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Titles that still count as "unset" and may be replaced automatically.
/// A missing (NULL) title is treated the same way.
pub const DEFAULT_TITLE_MARKERS: [&str; 3] = ["New Chat", "", "New Conversation"];

pub const MAX_TITLE_CHARS: usize = 60;

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: UserId, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            user_id,
            title: Some(title.unwrap_or_else(|| DEFAULT_TITLE.to_string())),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_default_title(&self) -> bool {
        is_default_title(self.title.as_deref())
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

pub fn is_default_title(title: Option<&str>) -> bool {
    match title {
        None => true,
        Some(t) => DEFAULT_TITLE_MARKERS.contains(&t),
    }
}

/// Derives a conversation title from the first prompt: the first
/// [`MAX_TITLE_CHARS`] characters, surrounding whitespace removed.
///
/// The result is never a default marker: a prompt that reads exactly like one
/// comes back quoted.
pub fn title_from_prompt(prompt: &str) -> String {
    let title = prompt
        .trim()
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string();

    if is_default_title(Some(&title)) {
        format!("\"{}\"", title)
    } else {
        title
    }
}
