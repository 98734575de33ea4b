mod in_memory_queue_store;
mod redis_queue_store;

pub use in_memory_queue_store::InMemoryQueueStore;
pub use redis_queue_store::RedisQueueStore;
