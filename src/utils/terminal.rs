//! Terminal utilities for title setting and output management

use std::io::{IsTerminal, Write};

/// Sets the terminal title to the specified text
pub fn set_terminal_title(title: &str) {
    if !std::io::stdout().is_terminal() {
        return;
    }
    // ANSI escape sequence to set terminal title
    print!("\x1b]0;{}\x07", title);
}

/// Sets the terminal title and ensures it's flushed to the terminal
pub fn set_terminal_title_and_flush(title: &str) {
    set_terminal_title(title);
    // Title updates are cosmetic; a failed flush is not worth reporting
    let _ = std::io::stdout().flush();
}
