//! Resource envelope encoding.
//!
//! A resource is written as `{"data":{"type":..,"id":..,"attributes":{..}}}`.
//! The attributes (and relationships) are only written while the output is not
//! already inside another resource; an embedded resource comes out as bare
//! `{type, id}` linkage, which also keeps mutually referencing resources from
//! expanding without end.

pub mod writer;

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::options::Options;
use crate::resource::{Relationship, Resource};
use crate::ser::AttributeSerializer;
use crate::stream::{JsonApiWriter, ResourceRelationshipWriter, Scalar, TokenWriter, write_json_value};
use crate::{Error, Result};

pub struct ResourceEncoder<'o> {
    options: &'o Options,
}

impl<'o> ResourceEncoder<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self { options }
    }

    /// Write one complete resource document: `{"data": <resource object>}`.
    pub fn encode<W, R>(&self, w: &mut W, resource: &R) -> Result<()>
    where
        W: JsonApiWriter + ?Sized,
        R: Resource + ?Sized,
    {
        w.begin_object()?;
        w.name("data")?;
        self.write_resource_object(w, resource)?;
        w.end_object()
    }

    /// Write `{"data": [<resource object>, ...]}`.
    pub fn encode_collection<W, I>(&self, w: &mut W, resources: I) -> Result<()>
    where
        W: JsonApiWriter + ?Sized,
        I: IntoIterator,
        I::Item: Resource,
    {
        w.begin_object()?;
        w.name("data")?;
        w.begin_array()?;
        for resource in resources {
            self.write_resource_object(w, &resource)?;
        }
        w.end_array()?;
        w.end_object()
    }

    /// Write the resource object itself: header, then attributes and
    /// relationships unless it is embedded in another resource.
    pub fn write_resource_object<W, R>(&self, w: &mut W, resource: &R) -> Result<()>
    where
        W: JsonApiWriter + ?Sized,
        R: Resource + ?Sized,
    {
        w.begin_object()?;
        write_header(w, &resource.type_name(), &resource.id())?;
        if write_attributes(w, self.options, resource)? {
            self.write_relationships(w, &resource.relationships())?;
        }
        w.end_object()
    }

    /// Write the `relationships` member of the current resource object.
    ///
    /// Each relationship object goes through a [`ResourceRelationshipWriter`].
    /// Writers that defer relationships get them one by one and are then asked
    /// to write them out. A repeated key is a [`Error::DuplicateMember`].
    pub fn write_relationships<W>(&self, w: &mut W, relationships: &[(String, Relationship)]) -> Result<()>
    where
        W: JsonApiWriter + ?Sized,
    {
        if relationships.is_empty() {
            return Ok(());
        }
        let deferred = w.defers_relationships();
        if !deferred {
            w.name("relationships")?;
            w.begin_object()?;
        }
        let mut seen = HashSet::with_capacity(relationships.len());
        for (key, relationship) in relationships {
            if !seen.insert(key.as_str()) {
                return Err(Error::DuplicateMember {
                    name: key.clone(),
                    section: "relationships",
                    remaining: None,
                });
            }
            w.name(key)?;
            w.begin_relationship()?;
            write_relationship(&mut *w, relationship)?;
            w.end_relationship()?;
        }
        if deferred {
            w.write_relationships()
        } else {
            w.end_object()
        }
    }

    /// Reading JSON:API documents back into resources is not supported.
    pub fn decode<R>(&self, _json: &str) -> Result<R> {
        Err(Error::UnsupportedOperation(
            "decoding JSON:API documents into resources",
        ))
    }
}

/// Write the `type`/`id` header of a resource object.
pub fn write_header<W: TokenWriter + ?Sized>(w: &mut W, type_name: &str, id: &str) -> Result<()> {
    w.name("type")?;
    w.value(Scalar::Str(type_name))?;
    w.name("id")?;
    w.value(Scalar::Str(id))
}

/// Write the `attributes` member unless the output is inside an embedded
/// resource. Returns whether it was written.
pub fn write_attributes<W, T>(w: &mut W, options: &Options, value: &T) -> Result<bool>
where
    W: JsonApiWriter + ?Sized,
    T: Serialize + ?Sized,
{
    let level = w.nesting_level();
    if w.output_is_currently_in_resource() {
        debug!("nesting level {level}: writing linkage only");
        return Ok(false);
    }
    debug!("nesting level {level}: writing attributes");
    w.name("attributes")?;
    value.serialize(&mut AttributeSerializer::for_resource(w, options))?;
    Ok(true)
}

/// Write one relationship object, checked against the relationship grammar.
pub fn write_relationship<W: TokenWriter>(w: W, relationship: &Relationship) -> Result<()> {
    let mut rw = ResourceRelationshipWriter::new(w);
    rw.begin_object()?;

    if let Some(links) = &relationship.links {
        rw.name("links")?;
        rw.begin_object()?;
        if let Some(url) = &links.self_link {
            rw.name("self")?;
            rw.value(Scalar::Str(url))?;
        }
        if let Some(url) = &links.related {
            rw.name("related")?;
            rw.value(Scalar::Str(url))?;
        }
        rw.end_object()?;
    }

    if let Some(linkage) = &relationship.data {
        rw.name("data")?;
        match linkage {
            Some(target) => {
                rw.begin_object()?;
                write_header(&mut rw, &target.type_name, &target.id)?;
                rw.end_object()?;
            }
            None => rw.value(Scalar::Null)?,
        }
    }

    if let Some(meta) = &relationship.meta {
        rw.name("meta")?;
        write_json_value(&mut rw, meta)?;
    }

    rw.end_object()
}
