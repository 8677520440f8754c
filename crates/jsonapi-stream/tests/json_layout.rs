use jsonapi_stream::stream::{Scalar, write_json_value};
use jsonapi_stream::{JsonWriter, Options, TokenWriter};
use serde_json::json;

fn write_with(options: &Options, value: &serde_json::Value) -> Result<String, Box<dyn std::error::Error>> {
    let mut w = JsonWriter::with_options(Vec::new(), options);
    write_json_value(&mut w, value)?;
    w.finish()?;
    Ok(String::from_utf8(w.into_inner())?)
}

#[test]
fn options_defaults() {
    let opts = Options::default();
    assert!(!opts.pretty);
    assert_eq!(opts.indent, 2);
    assert!(matches!(opts.field_naming, jsonapi_stream::FieldNaming::LowerCaseWithUnderscores));
    assert!(matches!(opts.nested_resources, jsonapi_stream::NestedResources::Linkage));
    assert!(matches!(opts.relationships, jsonapi_stream::RelationshipMode::Inline));
}

#[test]
fn compact_and_pretty_layout_match_serde_json() -> Result<(), Box<dyn std::error::Error>> {
    let doc = json!({
        "data": {"type": "people", "id": "9", "attributes": {"name": "Dan", "tags": [], "scores": [1, 2.5, null]}},
        "meta": {}
    });
    assert_eq!(write_with(&Options::default(), &doc)?, serde_json::to_string(&doc)?);
    assert_eq!(write_with(&Options::pretty(), &doc)?, serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[test]
fn escaping_matches_serde_json() -> Result<(), Box<dyn std::error::Error>> {
    for s in ["plain", "tab\there", "quote\"d", "\u{7}bell", "ünïcödé", "/slash"] {
        let mut w = JsonWriter::new(Vec::new());
        w.begin_object()?;
        w.name(s)?;
        w.value(Scalar::Str(s))?;
        w.end_object()?;
        let expected = serde_json::to_string(&json!({ s: s }))?;
        assert_eq!(String::from_utf8(w.into_inner())?, expected);
    }
    Ok(())
}

#[test]
fn floats_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    for f in [0.1, -2.5e-8, 1e21, 123456.789, 3.0] {
        let mut w = JsonWriter::new(Vec::new());
        w.value(Scalar::F64(f))?;
        let s = String::from_utf8(w.into_inner())?;
        assert_eq!(s, serde_json::to_string(&f)?);
        assert_eq!(s.parse::<f64>()?, f);
    }
    let mut w = JsonWriter::new(Vec::new());
    assert!(w.value(Scalar::F64(f64::INFINITY)).is_err());
    Ok(())
}

#[test]
fn wide_indent_is_capped() -> Result<(), Box<dyn std::error::Error>> {
    let out = write_with(&Options::pretty().with_indent(40), &json!({"a": 1}))?;
    assert_eq!(out, format!("{{\n{}\"a\": 1\n}}", " ".repeat(16)));
    Ok(())
}
