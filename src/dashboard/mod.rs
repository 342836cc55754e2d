//! Dashboard session: sections, account figures, state and the dispatcher
//! that applies resolved actions to it.

pub mod account;
pub mod dispatcher;
pub mod section;
pub mod state;

pub use account::{Account, MASKED_BALANCE, format_try};
pub use dispatcher::ActionDispatcher;
pub use section::Section;
pub use state::{SessionState, SessionView};
