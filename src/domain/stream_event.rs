use serde::{Deserialize, Serialize};

/// One frame of an incrementally generated reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub token: String,
    pub done: bool,
}

impl StreamEvent {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            done: false,
        }
    }

    /// The sentinel that ends a reply.
    pub fn done() -> Self {
        Self {
            token: String::new(),
            done: true,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.done
    }
}
