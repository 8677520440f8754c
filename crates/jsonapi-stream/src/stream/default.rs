use crate::stream::{JsonApiWriter, NestingCounter, Scalar, TokenWriter};
use crate::{Error, Result};

/// Pass-through [`JsonApiWriter`]: relationships and included resources are
/// written in place, and the `write_*` hooks have nothing to emit.
///
/// Member names are held back until the next value or container opens, so a
/// layer above can still decide where a name belongs. At most one name can be
/// pending at a time.
pub struct DefaultJsonApiWriter<W> {
    inner: NestingCounter<W>,
    deferred_name: Option<String>,
}

impl<W: TokenWriter> DefaultJsonApiWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: NestingCounter::new(inner),
            deferred_name: None,
        }
    }

    /// The member name waiting for its value, if any.
    pub fn deferred_name(&self) -> Option<&str> {
        self.deferred_name.as_deref()
    }

    /// Take the pending member name without writing it.
    pub(crate) fn take_deferred_name(&mut self) -> Option<String> {
        self.deferred_name.take()
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut W {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    fn flush_deferred_name(&mut self) -> Result<()> {
        if let Some(name) = self.deferred_name.take() {
            self.inner.name(&name)?;
        }
        Ok(())
    }

    fn ensure_no_deferred_name(&self) -> Result<()> {
        match &self.deferred_name {
            Some(name) => Err(Error::illegal_state(format!(
                "member name `{name}` is still waiting for its value"
            ))),
            None => Ok(()),
        }
    }
}

impl<W: TokenWriter> TokenWriter for DefaultJsonApiWriter<W> {
    fn name(&mut self, name: &str) -> Result<()> {
        if let Some(pending) = &self.deferred_name {
            return Err(Error::illegal_state(format!(
                "a name (`{pending}`) has already been set for the next value; cannot set `{name}`"
            )));
        }
        self.deferred_name = Some(name.to_string());
        Ok(())
    }

    fn begin_object(&mut self) -> Result<()> {
        self.flush_deferred_name()?;
        self.inner.begin_object()
    }

    fn end_object(&mut self) -> Result<()> {
        self.ensure_no_deferred_name()?;
        self.inner.end_object()
    }

    fn begin_array(&mut self) -> Result<()> {
        self.flush_deferred_name()?;
        self.inner.begin_array()
    }

    fn end_array(&mut self) -> Result<()> {
        self.ensure_no_deferred_name()?;
        self.inner.end_array()
    }

    fn value(&mut self, value: Scalar<'_>) -> Result<()> {
        self.flush_deferred_name()?;
        self.inner.value(value)
    }

    fn raw_value(&mut self, json: &str) -> Result<()> {
        self.flush_deferred_name()?;
        self.inner.raw_value(json)
    }
}

impl<W: TokenWriter> JsonApiWriter for DefaultJsonApiWriter<W> {
    fn nesting_level(&self) -> usize {
        self.inner.depth()
    }

    fn begin_relationship(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_relationship(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_included(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_included(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_relationships(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_included(&mut self) -> Result<()> {
        Ok(())
    }
}
