use futures::stream::Stream;

use crate::application::services::{StreamChannels, StreamError};
use crate::domain::{ConversationId, StreamEvent};

/// Drains one conversation's stream queue for a single viewer.
#[derive(Clone)]
pub struct StreamGateway {
    channels: StreamChannels,
}

impl StreamGateway {
    pub fn new(channels: StreamChannels) -> Self {
        Self { channels }
    }

    /// Yields events in production order. The stream ends right after the
    /// terminal event, or after the first error; there is no idle timeout.
    pub fn open(
        &self,
        conversation_id: ConversationId,
    ) -> impl Stream<Item = Result<StreamEvent, StreamError>> + Send + 'static {
        let channels = self.channels.clone();
        async_stream::stream! {
            loop {
                match channels.next_event(conversation_id).await {
                    Ok(event) => {
                        let terminal = event.is_terminal();
                        yield Ok(event);
                        if terminal {
                            break;
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        }
    }
}
