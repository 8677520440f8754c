//! Resources and the relationships between them.

use std::borrow::Cow;

use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::Serialize;

use crate::naming;
use crate::{Error, Result};

/// Struct name that marks a nested resource to the attribute serializer.
pub(crate) const NESTED_RESOURCE_TOKEN: &str = "$jsonapi_stream::private::NestedResource";

/// An object that can be encoded as a JSON:API resource.
///
/// The `Serialize` impl supplies the attributes. A field named `id` is left
/// out of them, since the identifier is written in the resource header.
pub trait Resource: Serialize {
    /// Identifier of this resource, always rendered as a string.
    fn id(&self) -> String;

    /// Wire type token; by default the type's simple name in lower_underscore form.
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(naming::type_name_of::<Self>())
    }

    /// Named relationships to other resources, in output order.
    fn relationships(&self) -> Vec<(String, Relationship)> {
        Vec::new()
    }
}

impl<R: Resource + ?Sized> Resource for &R {
    fn id(&self) -> String {
        (**self).id()
    }

    fn type_name(&self) -> Cow<'static, str> {
        (**self).type_name()
    }

    fn relationships(&self) -> Vec<(String, Relationship)> {
        (**self).relationships()
    }
}

/// The minimal `{type, id}` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    pub type_name: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    pub fn of<R: Resource + ?Sized>(resource: &R) -> Self {
        Self {
            type_name: resource.type_name().into_owned(),
            id: resource.id(),
        }
    }
}

/// Links of a relationship object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    /// The relationship link (`self`)
    pub self_link: Option<String>,
    /// The related resource link (`related`)
    pub related: Option<String>,
}

/// A relationship object: any of `links`, `data` (to-one linkage) and `meta`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationship {
    pub links: Option<Links>,
    /// `Some(None)` writes `"data": null`, an empty to-one relationship.
    pub data: Option<Option<ResourceIdentifier>>,
    pub meta: Option<serde_json::Value>,
}

impl Relationship {
    pub fn to_one(target: ResourceIdentifier) -> Self {
        Self {
            data: Some(Some(target)),
            ..Self::default()
        }
    }

    pub fn empty_to_one() -> Self {
        Self {
            data: Some(None),
            ..Self::default()
        }
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Serializes a resource-valued field through the envelope encoder.
///
/// Inside an attributes block this comes out as linkage:
/// `{"data":{"type":"store","id":"10"}}`. Other serializers see a plain
/// `{type, id, attributes}` struct.
pub struct Nested<'a, R: ?Sized>(pub &'a R);

impl<R: Resource + ?Sized> Serialize for Nested<'_, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct(NESTED_RESOURCE_TOKEN, 3)?;
        s.serialize_field("type", &self.0.type_name())?;
        s.serialize_field("id", &self.0.id())?;
        s.serialize_field("attributes", self.0)?;
        s.end()
    }
}

/// `serialize_with` helper for resource-valued fields.
///
/// ```
/// use serde::Serialize;
/// use jsonapi_stream::Resource;
///
/// #[derive(Serialize)]
/// struct Store { id: u32, name: String }
///
/// impl Resource for Store {
///     fn id(&self) -> String { self.id.to_string() }
/// }
///
/// #[derive(Serialize)]
/// struct StoreProduct {
///     id: u32,
///     #[serde(serialize_with = "jsonapi_stream::nested")]
///     store: Store,
/// }
///
/// impl Resource for StoreProduct {
///     fn id(&self) -> String { self.id.to_string() }
/// }
///
/// let product = StoreProduct { id: 7, store: Store { id: 10, name: "P&C Fresh".into() } };
/// let json = jsonapi_stream::encode_to_string(&product, &Default::default()).unwrap();
/// assert_eq!(
///     json,
///     r#"{"data":{"type":"store_product","id":"7","attributes":{"store":{"data":{"type":"store","id":"10"}}}}}"#
/// );
/// ```
pub fn nested<R, S>(resource: &R, serializer: S) -> core::result::Result<S::Ok, S::Error>
where
    R: Resource + ?Sized,
    S: Serializer,
{
    Nested(resource).serialize(serializer)
}

/// A resource built from a JSON object: `type` and `id` members form the
/// header, every other member is an attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResource {
    pub type_name: String,
    pub id: String,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl JsonResource {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut members) = value else {
            return Err(Error::Message("a resource must be a JSON object".into()));
        };
        let type_name = match members.remove("type") {
            Some(serde_json::Value::String(s)) => s,
            _ => return Err(Error::Message("resource is missing a string `type` member".into())),
        };
        let id = match members.remove("id") {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(Error::Message(
                    "resource is missing a string or numeric `id` member".into(),
                ));
            }
        };
        Ok(Self {
            type_name,
            id,
            attributes: members,
        })
    }
}

impl Serialize for JsonResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for (k, v) in &self.attributes {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Resource for JsonResource {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(self.type_name.clone())
    }
}
