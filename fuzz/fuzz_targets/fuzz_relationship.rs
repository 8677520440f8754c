#![no_main]
use libfuzzer_sys::fuzz_target;
use jsonapi::stream::write_json_value;
use jsonapi::{JsonWriter, ResourceRelationshipWriter};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(s) {
            let mut w = ResourceRelationshipWriter::new(JsonWriter::new(Vec::new()));
            if write_json_value(&mut w, &value).is_ok() {
                assert_eq!(w.depth(), 0);
                let out = String::from_utf8(w.into_inner().into_inner()).unwrap();
                // Whatever the grammar accepts must come out unchanged.
                assert_eq!(out, serde_json::to_string(&value).unwrap());
            }
        }
    }
});
