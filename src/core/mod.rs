//! Process-wide state shared between the server threads and the runtime.

mod state;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
