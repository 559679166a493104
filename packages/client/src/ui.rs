//! UI utilities for the client.

use std::io::Write;

/// Redisplay the prompt after printing into the conversation view
pub fn redisplay_prompt(prompt: &str) {
    print!("{}> ", prompt);
    std::io::stdout().flush().ok();
}
