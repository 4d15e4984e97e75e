//! Session store: the authenticated identity, kept in step with durable
//! storage.

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::{Registration, SessionAction, MIN_PASSWORD_LEN};
pub use reducer::{SessionReducer, LOGIN_FAILED, REGISTRATION_FAILED};
pub use state::{SessionEvent, SessionPhase, SessionState};
