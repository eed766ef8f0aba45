pub(crate) mod fs;
pub mod shutdown;
pub(crate) mod terminal;

// Public API - utilities used by commands
pub use fs::{relative_display, shorten_path};
pub use shutdown::{install_ctrl_c_handler, ShutdownSignal};
pub use terminal::{set_terminal_title, set_terminal_title_and_flush};
