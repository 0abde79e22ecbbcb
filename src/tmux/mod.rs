mod manager;
mod session;

pub use manager::{validate_session_name, TmuxManager};
pub use session::{Session, Window};
