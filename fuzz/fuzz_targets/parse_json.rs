#![no_main]
use libfuzzer_sys::fuzz_target;
use yangcodec::JsonOptions;

include!("common/schema.rs");

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let codecs = fuzz_registry();
    if let Ok(tree) = yangcodec::parse_json_str(&codecs, json) {
        let _ = yangcodec::node_to_json(&codecs, &tree, &JsonOptions::default());
    }
});
