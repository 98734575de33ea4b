mod chat_producer;
mod chat_worker;
mod job_queue;
mod reply_tokenizer;
mod stream_channels;
mod stream_gateway;

pub use chat_producer::{ChatProducer, ChatSubmission, EnqueueReceipt, ProducerError};
pub use chat_worker::{
    ChatWorker, IterationOutcome, JobReport, TitleUpdate, WorkerConfig, WorkerError, WorkerState,
};
pub use job_queue::{DEFAULT_JOB_QUEUE_KEY, Dequeued, JobQueue};
pub use reply_tokenizer::tokenize_reply;
pub use stream_channels::{DEFAULT_STREAM_KEY_PREFIX, StreamChannels, StreamError};
pub use stream_gateway::StreamGateway;
