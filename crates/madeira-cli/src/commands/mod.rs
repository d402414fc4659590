// Each module handles one `madeira` subcommand group. main.rs parses the
// arguments and dispatches to these handlers.

pub mod dns;
pub mod hash;
pub mod package;
