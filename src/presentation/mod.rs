pub mod auth;
pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use auth::AuthenticatedUser;
pub use config::{
    Environment, PersistenceProvider, QueueProvider, Settings, load_settings,
};
pub use router::create_router;
pub use state::AppState;
