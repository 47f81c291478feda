mod core;
pub use self::core::{BookingAgent, BookingAgentBuilder};

pub mod models;
pub use models::{ConversationMemory, Turn, TurnRole};

pub mod session;
pub use session::{DEFAULT_SESSION, SessionHandle, SessionStore};
