mod app;
mod input;
mod intent;
mod mode;
mod nav;
mod render;
mod sessions;
mod windows;

pub use app::{App, AppOptions};
pub use input::TextInput;
pub use intent::{load_sessions, run_intent, AppEvent, Backends, Intent};
pub use mode::Mode;
pub use nav::Navigation;
pub use sessions::SessionsView;
pub use windows::{WindowAction, WindowsView};
