use serde::Serialize;
use serde::ser::*;

use crate::options::{NestedResources, Options};
use crate::resource::NESTED_RESOURCE_TOKEN;
use crate::stream::{JsonApiWriter, Scalar};
use crate::{Error, Result};

/// Streams a `Serialize` value into a [`JsonApiWriter`] as attribute content.
///
/// Struct field names go through the configured naming convention; map keys
/// are written as given. At the resource level an `id` member is left out.
/// Values marked with [`Nested`](crate::Nested) go through the envelope
/// encoder.
pub struct AttributeSerializer<'a, W: ?Sized> {
    w: &'a mut W,
    opts: &'a Options,
    skip_id: bool,
}

impl<'a, W: JsonApiWriter + ?Sized> AttributeSerializer<'a, W> {
    pub fn new(w: &'a mut W, opts: &'a Options) -> Self {
        Self { w, opts, skip_id: false }
    }

    /// Serializer for the attributes of a resource, which never include its `id`.
    pub fn for_resource(w: &'a mut W, opts: &'a Options) -> Self {
        Self { w, opts, skip_id: true }
    }

    fn child(&mut self) -> AttributeSerializer<'_, W> {
        AttributeSerializer { w: &mut *self.w, opts: self.opts, skip_id: false }
    }

    /// The body of an enum variant is still at the level of its parent.
    fn variant_body(&mut self) -> AttributeSerializer<'_, W> {
        AttributeSerializer { w: &mut *self.w, opts: self.opts, skip_id: self.skip_id }
    }

    fn skips_nested<T: ?Sized + Serialize>(&self, value: &T) -> bool {
        self.opts.nested_resources == NestedResources::Skip && is_nested_resource(value)
    }
}

impl<'s, 'a, W: JsonApiWriter + ?Sized> Serializer for &'s mut AttributeSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'s, 'a, W>;
    type SerializeTuple = Compound<'s, 'a, W>;
    type SerializeTupleStruct = Compound<'s, 'a, W>;
    type SerializeTupleVariant = Compound<'s, 'a, W>;
    type SerializeMap = Compound<'s, 'a, W>;
    type SerializeStruct = Compound<'s, 'a, W>;
    type SerializeStructVariant = Compound<'s, 'a, W>;

    fn serialize_bool(self, v: bool) -> Result<()> { self.w.value(Scalar::Bool(v)) }
    fn serialize_i8(self, v: i8) -> Result<()> { self.w.value(Scalar::I64(v.into())) }
    fn serialize_i16(self, v: i16) -> Result<()> { self.w.value(Scalar::I64(v.into())) }
    fn serialize_i32(self, v: i32) -> Result<()> { self.w.value(Scalar::I64(v.into())) }
    fn serialize_i64(self, v: i64) -> Result<()> { self.w.value(Scalar::I64(v)) }
    fn serialize_u8(self, v: u8) -> Result<()> { self.w.value(Scalar::U64(v.into())) }
    fn serialize_u16(self, v: u16) -> Result<()> { self.w.value(Scalar::U64(v.into())) }
    fn serialize_u32(self, v: u32) -> Result<()> { self.w.value(Scalar::U64(v.into())) }
    fn serialize_u64(self, v: u64) -> Result<()> { self.w.value(Scalar::U64(v)) }
    fn serialize_f32(self, v: f32) -> Result<()> { self.serialize_f64(v.into()) }
    fn serialize_f64(self, v: f64) -> Result<()> {
        // Same as serde_json: non-finite floats become null.
        if v.is_finite() { self.w.value(Scalar::F64(v)) } else { self.w.value(Scalar::Null) }
    }
    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.w.value(Scalar::Str(v.encode_utf8(&mut buf)))
    }
    fn serialize_str(self, v: &str) -> Result<()> { self.w.value(Scalar::Str(v)) }
    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        let mut seq = self.serialize_seq(Some(v.len()))?;
        for b in v { SerializeSeq::serialize_element(&mut seq, b)?; }
        SerializeSeq::end(seq)
    }
    fn serialize_none(self) -> Result<()> { self.w.value(Scalar::Null) }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> { value.serialize(self) }
    fn serialize_unit(self) -> Result<()> { self.w.value(Scalar::Null) }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> { self.serialize_unit() }
    fn serialize_unit_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str) -> Result<()> {
        self.serialize_str(variant)
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _variant_index: u32, variant: &'static str, value: &T) -> Result<()> {
        self.w.begin_object()?;
        self.w.name(variant)?;
        value.serialize(&mut self.variant_body())?;
        self.w.end_object()
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.w.begin_array()?;
        Ok(Compound::new(self, Kind::Seq))
    }
    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> { self.serialize_seq(Some(len)) }
    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str, _len: usize) -> Result<Self::SerializeTupleVariant> {
        self.w.begin_object()?;
        self.w.name(variant)?;
        self.w.begin_array()?;
        Ok(Compound::new(self, Kind::TupleVariant))
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        self.w.begin_object()?;
        Ok(Compound::new(self, Kind::Map))
    }
    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.w.begin_object()?;
        if name == NESTED_RESOURCE_TOKEN {
            self.w.name("data")?;
            self.w.begin_object()?;
            return Ok(Compound::new(self, Kind::Resource));
        }
        Ok(Compound::new(self, Kind::Struct))
    }
    fn serialize_struct_variant(self, _name: &'static str, _variant_index: u32, variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        self.w.begin_object()?;
        self.w.name(variant)?;
        self.w.begin_object()?;
        Ok(Compound::new(self, Kind::StructVariant))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Seq,
    TupleVariant,
    Map,
    Struct,
    StructVariant,
    Resource,
}

pub struct Compound<'s, 'a, W: ?Sized> {
    ser: &'s mut AttributeSerializer<'a, W>,
    kind: Kind,
    pending_key: Option<String>,
}

impl<'s, 'a, W: JsonApiWriter + ?Sized> Compound<'s, 'a, W> {
    fn new(ser: &'s mut AttributeSerializer<'a, W>, kind: Kind) -> Self {
        Self { ser, kind, pending_key: None }
    }

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut self.ser.child())
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        if self.kind == Kind::Resource {
            return match key {
                "attributes" => crate::encode::write_attributes(&mut *self.ser.w, self.ser.opts, value).map(|_| ()),
                _ => {
                    self.ser.w.name(key)?;
                    self.element(value)
                }
            };
        }
        if matches!(self.kind, Kind::Struct | Kind::StructVariant) && self.ser.skip_id && key == "id" {
            return Ok(());
        }
        if self.ser.skips_nested(value) {
            return Ok(());
        }
        let name = self.ser.opts.field_naming.apply(key);
        self.ser.w.name(&name)?;
        self.element(value)
    }

    fn close(self) -> Result<()> {
        match self.kind {
            Kind::Seq => self.ser.w.end_array(),
            Kind::TupleVariant => {
                self.ser.w.end_array()?;
                self.ser.w.end_object()
            }
            Kind::Map | Kind::Struct => self.ser.w.end_object(),
            Kind::StructVariant | Kind::Resource => {
                self.ser.w.end_object()?;
                self.ser.w.end_object()
            }
        }
    }
}

impl<W: JsonApiWriter + ?Sized> SerializeSeq for Compound<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> { self.element(value) }
    fn end(self) -> Result<()> { self.close() }
}

impl<W: JsonApiWriter + ?Sized> SerializeTuple for Compound<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> { self.element(value) }
    fn end(self) -> Result<()> { self.close() }
}

impl<W: JsonApiWriter + ?Sized> SerializeTupleStruct for Compound<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> { self.element(value) }
    fn end(self) -> Result<()> { self.close() }
}

impl<W: JsonApiWriter + ?Sized> SerializeTupleVariant for Compound<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> { self.element(value) }
    fn end(self) -> Result<()> { self.close() }
}

impl<W: JsonApiWriter + ?Sized> SerializeMap for Compound<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(map_key(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::illegal_state("map value serialized before its key"))?;
        if (self.ser.skip_id && key == "id") || self.ser.skips_nested(value) {
            return Ok(());
        }
        self.ser.w.name(&key)?;
        self.element(value)
    }

    fn end(self) -> Result<()> { self.close() }
}

impl<W: JsonApiWriter + ?Sized> SerializeStruct for Compound<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }
    fn end(self) -> Result<()> { self.close() }
}

impl<W: JsonApiWriter + ?Sized> SerializeStructVariant for Compound<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }
    fn end(self) -> Result<()> { self.close() }
}

fn map_key<T: ?Sized + Serialize>(key: &T) -> Result<String> {
    match serde_json::to_value(key)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::Message(format!("attribute map key must be a string, got {other}"))),
    }
}

/// Whether `value` serializes as a [`Nested`](crate::Nested) resource.
fn is_nested_resource<T: ?Sized + Serialize>(value: &T) -> bool {
    matches!(value.serialize(ResourceProbe), Err(Probe::Found))
}

#[derive(Debug)]
enum Probe {
    Found,
    Other,
}

impl core::fmt::Display for Probe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Probe::Found => f.write_str("nested resource"),
            Probe::Other => f.write_str("not a nested resource"),
        }
    }
}

impl core::error::Error for Probe {}

impl serde::ser::Error for Probe {
    fn custom<T: core::fmt::Display>(_msg: T) -> Self { Probe::Other }
}

/// Serializer that only answers whether a value is a nested resource.
struct ResourceProbe;

impl Serializer for ResourceProbe {
    type Ok = ();
    type Error = Probe;

    type SerializeSeq = Impossible<(), Probe>;
    type SerializeTuple = Impossible<(), Probe>;
    type SerializeTupleStruct = Impossible<(), Probe>;
    type SerializeTupleVariant = Impossible<(), Probe>;
    type SerializeMap = Impossible<(), Probe>;
    type SerializeStruct = Impossible<(), Probe>;
    type SerializeStructVariant = Impossible<(), Probe>;

    fn serialize_bool(self, _v: bool) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_i8(self, _v: i8) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_i16(self, _v: i16) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_i32(self, _v: i32) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_i64(self, _v: i64) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_u8(self, _v: u8) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_u16(self, _v: u16) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_u32(self, _v: u32) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_u64(self, _v: u64) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_f32(self, _v: f32) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_f64(self, _v: f64) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_char(self, _v: char) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_str(self, _v: &str) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_bytes(self, _v: &[u8]) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_none(self) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> core::result::Result<(), Probe> { value.serialize(self) }
    fn serialize_unit(self) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_unit_struct(self, _name: &'static str) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_unit_variant(self, _name: &'static str, _variant_index: u32, _variant: &'static str) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> core::result::Result<(), Probe> { value.serialize(self) }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _variant_index: u32, _variant: &'static str, _value: &T) -> core::result::Result<(), Probe> { Ok(()) }
    fn serialize_seq(self, _len: Option<usize>) -> core::result::Result<Self::SerializeSeq, Probe> { Err(Probe::Other) }
    fn serialize_tuple(self, _len: usize) -> core::result::Result<Self::SerializeTuple, Probe> { Err(Probe::Other) }
    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> core::result::Result<Self::SerializeTupleStruct, Probe> { Err(Probe::Other) }
    fn serialize_tuple_variant(self, _name: &'static str, _variant_index: u32, _variant: &'static str, _len: usize) -> core::result::Result<Self::SerializeTupleVariant, Probe> { Err(Probe::Other) }
    fn serialize_map(self, _len: Option<usize>) -> core::result::Result<Self::SerializeMap, Probe> { Err(Probe::Other) }
    fn serialize_struct(self, name: &'static str, _len: usize) -> core::result::Result<Self::SerializeStruct, Probe> {
        if name == NESTED_RESOURCE_TOKEN { Err(Probe::Found) } else { Err(Probe::Other) }
    }
    fn serialize_struct_variant(self, _name: &'static str, _variant_index: u32, _variant: &'static str, _len: usize) -> core::result::Result<Self::SerializeStructVariant, Probe> { Err(Probe::Other) }
}
