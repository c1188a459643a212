use std::fmt::{Display, Write};

use glam::Vec2;

/// Writer for preset text.
#[derive(Clone, Debug, Default)]
pub struct Writer {
    buf: String,
    indent: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a `name = value` line at the current indentation.
    pub fn property<T>(&mut self, name: &str, value: T)
    where
        T: Display,
    {
        for _ in 0..self.indent {
            self.buf.push('\t');
        }

        let _ = writeln!(self.buf, "{} = {}", name, value);
    }

    /// Writes a boolean as `1` or `0`.
    pub fn bool(&mut self, name: &str, value: bool) {
        self.property(name, u8::from(value));
    }

    /// Writes a `Vector` block.
    pub fn vec2(&mut self, name: &str, value: Vec2) {
        self.begin(name, "Vector");
        self.property("X", value.x);
        self.property("Y", value.y);
        self.end();
    }

    /// Writes a reference to the preset `preset` of class `class`.
    pub fn reference(&mut self, name: &str, class: &str, preset: &str) {
        self.begin(name, class);
        self.property("CopyOf", preset);
        self.end();
    }

    /// Opens a nested block. Properties written until the matching [`end`] are children of
    /// `name`.
    ///
    /// [`end`]: Self::end
    pub fn begin(&mut self, name: &str, class: &str) {
        self.property(name, class);
        self.indent += 1;
    }

    /// Closes the block opened by the last [`begin`].
    ///
    /// [`begin`]: Self::begin
    pub fn end(&mut self) {
        debug_assert!(self.indent > 0, "Writer::end without matching begin");
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
