pub mod bridge;
pub mod providers;
pub mod search_session;
pub mod session_registry;
pub mod stream_resolver;
pub mod suggestions;

pub use bridge::FetchTask;
pub use search_session::{SearchSession, SessionPhase, SessionStatus};
pub use session_registry::SessionRegistry;
