//! Output sink with stackable capture.

use std::cell::RefCell;

/// The write sink for snippet output.
///
/// Holds a stack of capture buffers. With the stack empty, writes go to
/// the real stdout/stderr; while a capture is active they accumulate in
/// the top buffer. Evaluation is single-threaded, so a plain `RefCell`
/// suffices.
#[derive(Debug, Default)]
pub struct Console {
    captures: RefCell<Vec<String>>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write to the active capture, or to the real stdout if none.
    pub fn write_out(&self, text: &str) {
        let mut captures = self.captures.borrow_mut();
        match captures.last_mut() {
            Some(buffer) => buffer.push_str(text),
            None => print!("{text}"),
        }
    }

    /// Write to the active capture, or to the real stderr if none.
    pub fn write_err(&self, text: &str) {
        let mut captures = self.captures.borrow_mut();
        match captures.last_mut() {
            Some(buffer) => buffer.push_str(text),
            None => eprint!("{text}"),
        }
    }

    /// Begin capturing output. The returned guard restores the previous
    /// sink when it is finished or dropped.
    pub fn capture(&self) -> CaptureGuard<'_> {
        self.captures.borrow_mut().push(String::new());
        CaptureGuard {
            console: self,
            done: false,
        }
    }

    fn pop(&self) -> String {
        self.captures
            .borrow_mut()
            .pop()
            .unwrap_or_default()
    }
}

/// RAII guard for an active capture.
///
/// `finish()` ends the capture and returns what was written. Dropping the
/// guard without finishing (the failure path) pops the buffer and discards
/// its contents, so the prior sink is restored on every exit path.
#[derive(Debug)]
pub struct CaptureGuard<'a> {
    console: &'a Console,
    done: bool,
}

impl CaptureGuard<'_> {
    /// End the capture and return everything written during it.
    pub fn finish(mut self) -> String {
        self.done = true;
        self.console.pop()
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.console.pop();
        }
    }
}
