//! Terminal title badge reflecting the unread counter.

use std::io::{self, Write};

/// Sets the terminal title to `(<unread>) <title>` via the OSC 0
/// escape and restores the plain title when dropped. Scoped
/// acquisition/release, never a one-way mutation.
pub struct TitleBadge<W: Write> {
    out: W,
    base_title: String,
    unread: usize,
}

impl<W: Write> TitleBadge<W> {
    pub fn new(out: W, base_title: impl Into<String>) -> Self {
        Self {
            out,
            base_title: base_title.into(),
            unread: 0,
        }
    }

    /// Update the badge. Re-writes the title only when the count
    /// actually changed.
    pub fn set_unread(&mut self, unread: usize) -> io::Result<()> {
        if unread == self.unread {
            return Ok(());
        }
        self.unread = unread;
        if unread == 0 {
            write!(self.out, "\x1b]0;{}\x07", self.base_title)?;
        } else {
            write!(self.out, "\x1b]0;({}) {}\x07", unread, self.base_title)?;
        }
        self.out.flush()
    }
}

impl<W: Write> Drop for TitleBadge<W> {
    fn drop(&mut self) {
        // Teardown restores the original title; failures here are moot.
        let _ = write!(self.out, "\x1b]0;{}\x07", self.base_title);
        let _ = self.out.flush();
    }
}
