#![no_main]
use libfuzzer_sys::fuzz_target;
use jsonapi::{JsonResource, Options, encode_to_string};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(s) {
            let Ok(resource) = JsonResource::from_value(json_value) else {
                return;
            };
            for opts in [Options::default(), Options::pretty()] {
                let out = encode_to_string(&resource, &opts).expect("resource from JSON must encode");
                let doc: serde_json::Value = serde_json::from_str(&out).expect("output must be JSON");
                if doc["data"]["id"] != serde_json::Value::String(resource.id.clone()) {
                    panic!("id lost in envelope\nInput: {}\nOutput: {}", s, out);
                }
            }
        }
    }
});
