//! Raw terminal handling and screen painting

pub mod painter;
pub mod util;

pub use painter::Painter;
pub use util::{get_terminal_size, is_tty, restore_termios, set_raw_mode, TermiosGuard};
