//! Serde attribute serialization

mod stream;

pub use stream::{AttributeSerializer, Compound};

use serde::Serialize;

use crate::encode::writer::JsonWriter;
use crate::stream::DefaultJsonApiWriter;
use crate::{Options, Result};

/// Render `value` the way it would appear as an attributes object, without
/// the resource envelope around it.
pub fn to_attributes_string<T: Serialize + ?Sized>(value: &T, options: &Options) -> Result<String> {
    let mut w = DefaultJsonApiWriter::new(JsonWriter::with_options(Vec::new(), options));
    value.serialize(&mut AttributeSerializer::for_resource(&mut w, options))?;
    let mut json = w.into_inner();
    json.finish()?;
    String::from_utf8(json.into_inner()).map_err(|e| crate::Error::Message(e.to_string()))
}
