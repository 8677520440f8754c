use std::borrow::Cow;

use jsonapi_stream::{
    DefaultJsonApiWriter, Error, FieldNaming, JsonResource, JsonWriter, Links, NestedResources,
    Options, Relationship, RelationshipMode, Resource, ResourceEncoder, ResourceIdentifier,
    TokenWriter,
};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Store {
    id: u32,
    name: String,
    description: String,
    rating: u8,
}

impl Resource for Store {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreProduct {
    id: u64,
    product_id: u64,
    #[serde(serialize_with = "jsonapi_stream::nested")]
    store: Store,
    sku: String,
    title: String,
}

impl Resource for StoreProduct {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn relationships(&self) -> Vec<(String, Relationship)> {
        vec![(
            "store".to_string(),
            Relationship::to_one(ResourceIdentifier::of(&self.store)).with_links(Links {
                self_link: Some(format!("/store_products/{}/relationships/store", self.id)),
                related: None,
            }),
        )]
    }
}

fn store() -> Store {
    Store {
        id: 10,
        name: "P&C Fresh".into(),
        description: "The best selection".into(),
        rating: 4,
    }
}

fn ketchup() -> StoreProduct {
    StoreProduct {
        id: 3514512,
        product_id: 10,
        store: store(),
        sku: "00013000001243".into(),
        title: "Heinz Tomato Ketchup".into(),
    }
}

#[derive(Serialize)]
struct Titled {
    id: u64,
    title: String,
}

impl Resource for Titled {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed("store_product")
    }
}

#[derive(Serialize)]
struct People {
    id: u32,
    name: String,
}

impl Resource for People {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

#[test]
fn top_level_resource_has_attributes_without_id() -> Result<(), Box<dyn std::error::Error>> {
    let product = Titled { id: 3514512, title: "Heinz Tomato Ketchup".into() };
    let out = jsonapi_stream::encode_to_string(&product, &Options::default())?;
    assert_eq!(
        out,
        r#"{"data":{"type":"store_product","id":"3514512","attributes":{"title":"Heinz Tomato Ketchup"}}}"#
    );
    Ok(())
}

#[test]
fn top_level_resource_gets_attributes() -> Result<(), Box<dyn std::error::Error>> {
    let dan = People { id: 9, name: "Dan".into() };
    let options = Options::default();
    let mut w = DefaultJsonApiWriter::new(JsonWriter::new(Vec::new()));
    ResourceEncoder::new(&options).write_resource_object(&mut w, &dan)?;
    let out = String::from_utf8(w.into_inner().into_inner())?;
    assert_eq!(out, r#"{"type":"people","id":"9","attributes":{"name":"Dan"}}"#);
    Ok(())
}

#[test]
fn resource_at_depth_three_is_linkage_only() -> Result<(), Box<dyn std::error::Error>> {
    let dan = People { id: 9, name: "Dan".into() };
    let options = Options::default();
    let mut w = DefaultJsonApiWriter::new(JsonWriter::new(Vec::new()));
    w.begin_object()?;
    w.name("outer")?;
    w.begin_object()?;
    w.name("author")?;
    ResourceEncoder::new(&options).write_resource_object(&mut w, &dan)?;
    w.end_object()?;
    w.end_object()?;
    let out = String::from_utf8(w.into_inner().into_inner())?;
    assert_eq!(out, r#"{"outer":{"author":{"type":"people","id":"9"}}}"#);
    Ok(())
}

#[test]
fn nested_resource_attribute_becomes_linkage() -> Result<(), Box<dyn std::error::Error>> {
    let out = jsonapi_stream::encode_to_string(&ketchup(), &Options::default())?;
    let v: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(
        v["data"]["attributes"],
        json!({
            "product_id": 10,
            "store": {"data": {"type": "store", "id": "10"}},
            "sku": "00013000001243",
            "title": "Heinz Tomato Ketchup"
        })
    );
    assert!(v["data"]["attributes"].get("id").is_none());
    Ok(())
}

#[test]
fn skip_leaves_nested_resources_out() -> Result<(), Box<dyn std::error::Error>> {
    let options = Options::default().with_nested_resources(NestedResources::Skip);
    let out = jsonapi_stream::encode_to_string(&ketchup(), &options)?;
    let v: serde_json::Value = serde_json::from_str(&out)?;
    let attributes = v["data"]["attributes"].as_object().ok_or("no attributes")?;
    assert!(!attributes.contains_key("store"));
    assert_eq!(attributes.len(), 3);
    Ok(())
}

#[test]
fn inline_relationships_follow_attributes() -> Result<(), Box<dyn std::error::Error>> {
    let out = jsonapi_stream::encode_to_string(&ketchup(), &Options::default())?;
    assert!(out.ends_with(
        r#""relationships":{"store":{"links":{"self":"/store_products/3514512/relationships/store"},"data":{"type":"store","id":"10"}}}}}"#
    ));
    Ok(())
}

#[test]
fn buffered_relationships_match_inline_output() -> Result<(), Box<dyn std::error::Error>> {
    let inline = jsonapi_stream::encode_to_string(&ketchup(), &Options::default())?;
    let buffered = jsonapi_stream::encode_to_string(
        &ketchup(),
        &Options::default().with_relationships(RelationshipMode::Buffered),
    )?;
    assert_eq!(inline, buffered);
    Ok(())
}

#[test]
fn field_naming_applies_to_struct_fields() -> Result<(), Box<dyn std::error::Error>> {
    #[derive(Serialize)]
    struct Listing {
        id: u8,
        #[serde(rename = "shortDescription")]
        short_description: &'static str,
        #[serde(rename = "longDescription")]
        long_description: &'static str,
    }
    impl Resource for Listing {
        fn id(&self) -> String {
            self.id.to_string()
        }
    }

    let listing = Listing { id: 1, short_description: "short", long_description: "long" };

    let out = jsonapi_stream::encode_to_string(&listing, &Options::default())?;
    assert!(out.contains(r#""attributes":{"short_description":"short","long_description":"long"}"#));

    let dashed = Options::default().with_field_naming(FieldNaming::LowerCaseWithDashes);
    let out = jsonapi_stream::encode_to_string(&listing, &dashed)?;
    assert!(out.contains(r#""short-description":"short""#));

    let identity = Options::default().with_field_naming(FieldNaming::Identity);
    let out = jsonapi_stream::encode_to_string(&listing, &identity)?;
    assert!(out.contains(r#""shortDescription":"short""#));
    Ok(())
}

#[test]
fn relationship_meta_is_free_form() -> Result<(), Box<dyn std::error::Error>> {
    struct Tagged;
    impl Serialize for Tagged {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeMap;
            s.serialize_map(Some(0))?.end()
        }
    }
    impl Resource for Tagged {
        fn id(&self) -> String {
            "1".into()
        }
        fn relationships(&self) -> Vec<(String, Relationship)> {
            vec![(
                "owner".into(),
                Relationship::empty_to_one().with_meta(json!({"links": {"data": [1, {"x": null}]}})),
            )]
        }
    }

    let out = jsonapi_stream::encode_to_string(&Tagged, &Options::default())?;
    assert_eq!(
        out,
        r#"{"data":{"type":"tagged","id":"1","attributes":{},"relationships":{"owner":{"data":null,"meta":{"links":{"data":[1,{"x":null}]}}}}}}"#
    );
    Ok(())
}

#[test]
fn collection_wraps_resources_in_an_array() -> Result<(), Box<dyn std::error::Error>> {
    let people = [
        People { id: 1, name: "Ann".into() },
        People { id: 2, name: "Bob".into() },
    ];
    let out = jsonapi_stream::encode_collection_to_string(&people, &Options::default())?;
    assert_eq!(
        out,
        r#"{"data":[{"type":"people","id":"1","attributes":{"name":"Ann"}},{"type":"people","id":"2","attributes":{"name":"Bob"}}]}"#
    );
    Ok(())
}

#[test]
fn json_resource_keeps_member_order() -> Result<(), Box<dyn std::error::Error>> {
    let resource = JsonResource::from_value(json!({
        "type": "articles",
        "id": 1,
        "title": "Rails is Omakase",
        "tags": ["a", "b"]
    }))?;
    let out = jsonapi_stream::encode_to_string(&resource, &Options::default())?;
    assert_eq!(
        out,
        r#"{"data":{"type":"articles","id":"1","attributes":{"title":"Rails is Omakase","tags":["a","b"]}}}"#
    );
    Ok(())
}

#[test]
fn json_resource_needs_type_and_id() {
    assert!(JsonResource::from_value(json!({"id": "1"})).is_err());
    assert!(JsonResource::from_value(json!({"type": "x"})).is_err());
    assert!(JsonResource::from_value(json!([1])).is_err());
}

#[test]
fn pretty_output_is_the_same_document() -> Result<(), Box<dyn std::error::Error>> {
    let compact = jsonapi_stream::encode_to_string(&ketchup(), &Options::default())?;
    let pretty = jsonapi_stream::encode_to_string(&ketchup(), &Options::pretty().with_indent(4))?;
    assert!(pretty.contains("\n    \"data\": {"));
    let a: serde_json::Value = serde_json::from_str(&compact)?;
    let b: serde_json::Value = serde_json::from_str(&pretty)?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn encode_to_writer_streams_into_io() -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = Vec::new();
    jsonapi_stream::encode_to_writer(&mut buf, &store(), &Options::default())?;
    assert_eq!(
        String::from_utf8(buf)?,
        r#"{"data":{"type":"store","id":"10","attributes":{"name":"P&C Fresh","description":"The best selection","rating":4}}}"#
    );
    Ok(())
}

#[test]
fn repeated_relationship_key_fails_in_both_modes() {
    #[derive(Serialize)]
    struct Article {
        id: u32,
        title: &'static str,
    }
    impl Resource for Article {
        fn id(&self) -> String {
            self.id.to_string()
        }
        fn relationships(&self) -> Vec<(String, Relationship)> {
            vec![
                ("author".into(), Relationship::to_one(ResourceIdentifier::new("people", "1"))),
                ("author".into(), Relationship::to_one(ResourceIdentifier::new("people", "2"))),
            ]
        }
    }

    let article = Article { id: 1, title: "JSON:API" };
    for mode in [RelationshipMode::Inline, RelationshipMode::Buffered] {
        let err = jsonapi_stream::encode_to_string(&article, &Options::default().with_relationships(mode))
            .unwrap_err();
        assert!(
            matches!(&err, Error::DuplicateMember { name, section: "relationships", .. } if name == "author"),
            "{mode:?}: {err}"
        );
    }
}

#[test]
fn enum_resource_attributes_drop_id() -> Result<(), Box<dyn std::error::Error>> {
    #[derive(Serialize)]
    enum Shape {
        Square { id: u32, side: u32 },
    }
    impl Resource for Shape {
        fn id(&self) -> String {
            match self {
                Shape::Square { id, .. } => id.to_string(),
            }
        }
    }

    let out = jsonapi_stream::encode_to_string(&Shape::Square { id: 5, side: 2 }, &Options::default())?;
    assert_eq!(
        out,
        r#"{"data":{"type":"shape","id":"5","attributes":{"Square":{"side":2}}}}"#
    );
    Ok(())
}

#[test]
fn decoding_is_unsupported() {
    let err = jsonapi_stream::decode_from_str::<serde_json::Value>("{}", &Options::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
}
