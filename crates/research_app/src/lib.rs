//! Research app: the web page wiring the workflow core to the collaborators.
pub mod config;
pub mod controller;
pub mod render;
pub mod server;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use controller::WorkflowController;
pub use server::{build_router, ServerState};
pub use session::{SessionLimits, SessionStore};
