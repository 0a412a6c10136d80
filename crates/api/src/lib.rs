//! REST surface — the backend the dashboard talks to.

pub mod handlers;
pub mod router;
pub mod server;

pub use handlers::AppState;
pub use router::api_router;
pub use server::ApiServer;
