//! Interactive shell around a subtree-cached tree.
//!
//! - `commands` - command table, parsing, and the manual
//! - `render` - plain-text tree printer
//! - `session` - the command loop and the shell-owned cache pool
//! - `settings` - settings file and command-line flags

pub mod commands;
pub mod render;
pub mod session;
pub mod settings;

pub use session::Session;
pub use settings::{parse_args, print_help, ShellSettings};
