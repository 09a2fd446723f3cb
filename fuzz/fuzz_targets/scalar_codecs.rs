#![no_main]
use libfuzzer_sys::fuzz_target;

include!("common/schema.rs");

// Jeder Wert, den ein Codec akzeptiert, muss sich serialisieren lassen
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let types = [
        TypeDefinition::builtin(BuiltinType::Boolean),
        TypeDefinition::builtin(BuiltinType::Binary),
        TypeDefinition::builtin(BuiltinType::Decimal64 { fraction_digits: 18 }),
        TypeDefinition::builtin(BuiltinType::Integer(IntegerKind::Int64)),
        TypeDefinition::builtin(BuiltinType::Integer(IntegerKind::Uint64)),
        TypeDefinition::derived(
            QName::new("urn:fuzz", "short"),
            TypeDefinition::builtin(BuiltinType::String),
            Restrictions::new().with_length(1, 8).with_pattern("[a-z]+[0-9]*"),
        ),
    ];
    let ty = &types[usize::from(selector) % types.len()];
    let codecs = fuzz_registry();
    let leaf = LeafSchema::new(QName::new("urn:fuzz", "probe"), Arc::clone(ty)).build();
    let Ok(codec) = codecs.codec_for_leaf(&leaf) else {
        return;
    };
    if let Ok(value) = codec.deserialize(text) {
        let canonical = codec.serialize(&value).expect("accepted value must serialize");
        assert_eq!(codec.deserialize(&canonical).ok(), Some(value));
    }
});
