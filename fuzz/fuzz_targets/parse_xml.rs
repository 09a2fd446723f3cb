#![no_main]
use libfuzzer_sys::fuzz_target;
use yangcodec::{JsonOptions, XmlOptions};

include!("common/schema.rs");

// Was geparst wird, muss sich auch wieder schreiben lassen
fuzz_target!(|data: &[u8]| {
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    let codecs = fuzz_registry();
    if let Ok(tree) = yangcodec::parse_xml_str(&codecs, xml) {
        let _ = yangcodec::node_to_xml(&codecs, &tree, &XmlOptions::default());
        let _ = yangcodec::node_to_json(&codecs, &tree, &JsonOptions::default());
    }
});
