//! Token-level writer stack.
//!
//! Writers are layered by composition: a [`TokenWriter`] that produces JSON
//! syntax sits at the bottom, [`NestingCounter`] tracks object depth on top of
//! it, and [`DefaultJsonApiWriter`] / [`BufferedJsonApiWriter`] add the
//! JSON:API hooks. [`ResourceRelationshipWriter`] can wrap any layer to enforce
//! the relationship object grammar.

mod buffered;
mod default;
mod nesting;
mod relationship;

pub use buffered::BufferedJsonApiWriter;
pub use default::DefaultJsonApiWriter;
pub use nesting::NestingCounter;
pub use relationship::{RelationshipSection, ResourceRelationshipWriter};

use crate::Result;

/// Deepest object nesting at which a resource still gets its attributes.
///
/// Level 1 is the document object that only holds `data`, level 2 is the
/// top-level resource object itself. Anything deeper is a resource embedded in
/// another resource and is rendered as linkage.
pub const RESOURCE_DEPTH_THRESHOLD: usize = 2;

/// A JSON scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(&'a str),
}

impl<'a> From<&'a str> for Scalar<'a> {
    fn from(s: &'a str) -> Self {
        Scalar::Str(s)
    }
}

impl From<bool> for Scalar<'_> {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar<'_> {
    fn from(n: i64) -> Self {
        Scalar::I64(n)
    }
}

impl From<u64> for Scalar<'_> {
    fn from(n: u64) -> Self {
        Scalar::U64(n)
    }
}

impl From<f64> for Scalar<'_> {
    fn from(n: f64) -> Self {
        Scalar::F64(n)
    }
}

/// Low-level JSON syntax writer with no JSON:API knowledge.
///
/// Every call may fail if it is made in an order JSON syntax does not allow.
pub trait TokenWriter {
    fn begin_object(&mut self) -> Result<()>;
    fn end_object(&mut self) -> Result<()>;
    fn begin_array(&mut self) -> Result<()>;
    fn end_array(&mut self) -> Result<()>;
    fn name(&mut self, name: &str) -> Result<()>;
    fn value(&mut self, value: Scalar<'_>) -> Result<()>;
    /// Write an already-encoded JSON value verbatim.
    fn raw_value(&mut self, json: &str) -> Result<()>;
}

impl<T: TokenWriter + ?Sized> TokenWriter for &mut T {
    fn begin_object(&mut self) -> Result<()> {
        (**self).begin_object()
    }
    fn end_object(&mut self) -> Result<()> {
        (**self).end_object()
    }
    fn begin_array(&mut self) -> Result<()> {
        (**self).begin_array()
    }
    fn end_array(&mut self) -> Result<()> {
        (**self).end_array()
    }
    fn name(&mut self, name: &str) -> Result<()> {
        (**self).name(name)
    }
    fn value(&mut self, value: Scalar<'_>) -> Result<()> {
        (**self).value(value)
    }
    fn raw_value(&mut self, json: &str) -> Result<()> {
        (**self).raw_value(json)
    }
}

/// A [`TokenWriter`] that knows where it is in a JSON:API document.
///
/// The relationship and included hooks let an implementation redirect those
/// sections; [`DefaultJsonApiWriter`] passes everything straight through and
/// [`BufferedJsonApiWriter`] holds them back until the matching `write_*` call.
pub trait JsonApiWriter: TokenWriter {
    /// Number of currently open objects; 0 outside of any object.
    fn nesting_level(&self) -> usize;

    /// Whether the output is currently inside an embedded resource.
    fn output_is_currently_in_resource(&self) -> bool {
        self.nesting_level() > RESOURCE_DEPTH_THRESHOLD
    }

    /// Whether relationships are held back until [`write_relationships`](Self::write_relationships).
    fn defers_relationships(&self) -> bool {
        false
    }

    /// Start a relationship; the pending member name is its key.
    fn begin_relationship(&mut self) -> Result<()>;
    fn end_relationship(&mut self) -> Result<()>;
    /// Start an included resource; the pending member name is its key.
    fn begin_included(&mut self) -> Result<()>;
    fn end_included(&mut self) -> Result<()>;
    /// Emit held-back relationships. Must happen before the enclosing object closes.
    fn write_relationships(&mut self) -> Result<()>;
    /// Emit held-back included resources. Must happen before the enclosing object closes.
    fn write_included(&mut self) -> Result<()>;
}

impl<T: JsonApiWriter + ?Sized> JsonApiWriter for &mut T {
    fn nesting_level(&self) -> usize {
        (**self).nesting_level()
    }
    fn output_is_currently_in_resource(&self) -> bool {
        (**self).output_is_currently_in_resource()
    }
    fn defers_relationships(&self) -> bool {
        (**self).defers_relationships()
    }
    fn begin_relationship(&mut self) -> Result<()> {
        (**self).begin_relationship()
    }
    fn end_relationship(&mut self) -> Result<()> {
        (**self).end_relationship()
    }
    fn begin_included(&mut self) -> Result<()> {
        (**self).begin_included()
    }
    fn end_included(&mut self) -> Result<()> {
        (**self).end_included()
    }
    fn write_relationships(&mut self) -> Result<()> {
        (**self).write_relationships()
    }
    fn write_included(&mut self) -> Result<()> {
        (**self).write_included()
    }
}

/// Replay a `serde_json::Value` as tokens, in document order.
pub fn write_json_value<W: TokenWriter + ?Sized>(w: &mut W, value: &serde_json::Value) -> Result<()> {
    use serde_json::Value;

    match value {
        Value::Null => w.value(Scalar::Null),
        Value::Bool(b) => w.value(Scalar::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                w.value(Scalar::I64(i))
            } else if let Some(u) = n.as_u64() {
                w.value(Scalar::U64(u))
            } else {
                w.value(Scalar::F64(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        Value::String(s) => w.value(Scalar::Str(s)),
        Value::Array(items) => {
            w.begin_array()?;
            for item in items {
                write_json_value(w, item)?;
            }
            w.end_array()
        }
        Value::Object(members) => {
            w.begin_object()?;
            for (k, v) in members {
                w.name(k)?;
                write_json_value(w, v)?;
            }
            w.end_object()
        }
    }
}
