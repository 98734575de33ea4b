mod environment;
mod loader;
mod settings;

pub use environment::Environment;
pub use loader::load_settings;
pub use settings::{
    AuthSettings, DEFAULT_JWT_SECRET, DatabaseSettings, LoggingSettings, PersistenceProvider,
    QueueProvider, QueueSettings, RedisSettings, ServerSettings, Settings, StreamSettings,
    WorkerSettings,
};
