#![doc = include_str!("../README.md")]

pub mod error;
pub mod options;
pub mod naming;
pub mod resource;
pub mod stream;
pub mod encode;
pub mod ser;

pub use crate::encode::ResourceEncoder;
pub use crate::encode::writer::JsonWriter;
pub use crate::error::{Error, Result};
pub use crate::naming::FieldNaming;
pub use crate::options::{NestedResources, Options, RelationshipMode};
pub use crate::resource::{
    JsonResource, Links, Nested, Relationship, Resource, ResourceIdentifier, nested,
};
pub use crate::stream::{
    BufferedJsonApiWriter, DefaultJsonApiWriter, JsonApiWriter, ResourceRelationshipWriter,
    TokenWriter,
};

use std::io::Write;

use serde::de::DeserializeOwned;

/// Encode one resource as a complete JSON:API document.
pub fn encode_to_string<R: Resource + ?Sized>(resource: &R, options: &Options) -> Result<String> {
    let mut buf = Vec::new();
    encode_to_writer(&mut buf, resource, options)?;
    String::from_utf8(buf).map_err(|e| Error::Message(e.to_string()))
}

pub fn encode_to_writer<W: Write, R: Resource + ?Sized>(
    writer: W,
    resource: &R,
    options: &Options,
) -> Result<()> {
    let encoder = ResourceEncoder::new(options);
    let json = JsonWriter::with_options(writer, options);
    let mut json = match options.relationships {
        RelationshipMode::Inline => {
            let mut w = DefaultJsonApiWriter::new(json);
            encoder.encode(&mut w, resource)?;
            w.into_inner()
        }
        RelationshipMode::Buffered => {
            let mut w = BufferedJsonApiWriter::new(json);
            encoder.encode(&mut w, resource)?;
            w.into_inner()
        }
    };
    json.finish()
}

/// Encode a sequence of resources as one document with a `data` array.
pub fn encode_collection_to_string<I>(resources: I, options: &Options) -> Result<String>
where
    I: IntoIterator,
    I::Item: Resource,
{
    let encoder = ResourceEncoder::new(options);
    let json = JsonWriter::with_options(Vec::new(), options);
    let mut json = match options.relationships {
        RelationshipMode::Inline => {
            let mut w = DefaultJsonApiWriter::new(json);
            encoder.encode_collection(&mut w, resources)?;
            w.into_inner()
        }
        RelationshipMode::Buffered => {
            let mut w = BufferedJsonApiWriter::new(json);
            encoder.encode_collection(&mut w, resources)?;
            w.into_inner()
        }
    };
    json.finish()?;
    String::from_utf8(json.into_inner()).map_err(|e| Error::Message(e.to_string()))
}

/// Always fails with [`Error::UnsupportedOperation`]: there is no read path.
pub fn decode_from_str<T: DeserializeOwned>(s: &str, options: &Options) -> Result<T> {
    ResourceEncoder::new(options).decode(s)
}
