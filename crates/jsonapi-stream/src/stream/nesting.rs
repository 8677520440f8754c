use crate::Result;
use crate::stream::{Scalar, TokenWriter};

/// Counts how deeply nested in objects the output currently is.
///
/// After three `begin_object` calls and one `end_object` the level is 2.
/// Underflow is left to the wrapped writer to reject.
pub struct NestingCounter<W> {
    inner: W,
    level: usize,
}

impl<W: TokenWriter> NestingCounter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, level: 0 }
    }

    /// Current nesting level; 0 is outside the top-level element.
    pub fn depth(&self) -> usize {
        self.level
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: TokenWriter> TokenWriter for NestingCounter<W> {
    fn begin_object(&mut self) -> Result<()> {
        self.level += 1;
        self.inner.begin_object()
    }

    fn end_object(&mut self) -> Result<()> {
        self.level = self.level.saturating_sub(1);
        self.inner.end_object()
    }

    fn begin_array(&mut self) -> Result<()> {
        self.inner.begin_array()
    }

    fn end_array(&mut self) -> Result<()> {
        self.inner.end_array()
    }

    fn name(&mut self, name: &str) -> Result<()> {
        self.inner.name(name)
    }

    fn value(&mut self, value: Scalar<'_>) -> Result<()> {
        self.inner.value(value)
    }

    fn raw_value(&mut self, json: &str) -> Result<()> {
        self.inner.raw_value(json)
    }
}
