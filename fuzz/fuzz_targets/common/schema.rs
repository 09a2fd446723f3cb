// Kleines Schema fuer die Fuzz-Targets: Container mit Keyed List, Choice,
// Union und Augmentierung. Wird per `include!` eingebunden.

use std::sync::Arc;

use yangcodec::schema::{
    AnyXmlSchema, AugmentationSchema, BuiltinType, CaseSchema, ChoiceSchema, ContainerSchema,
    IntegerKind, LeafListSchema, LeafSchema, ListSchema, Module, Restrictions, TypeDefinition,
};
use yangcodec::{CodecRegistry, Decimal64, QName, QNameModule, SchemaContext};

fn fuzz_registry() -> Arc<CodecRegistry> {
    let module = QNameModule::new("urn:fuzz", None);
    let q = |local: &str| QName::in_module(&module, local);
    let x = |local: &str| QName::new("urn:fuzz-ext", local);
    let string = || TypeDefinition::builtin(BuiltinType::String);
    let int = |kind| TypeDefinition::builtin(BuiltinType::Integer(kind));

    let weight = TypeDefinition::derived(
        q("weight"),
        TypeDefinition::builtin(BuiltinType::Decimal64 { fraction_digits: 2 }),
        Restrictions::new().with_range(Decimal64::new(0, 2), Decimal64::new(10000, 2)),
    );
    let item = ListSchema::new(q("item"))
        .with_key(q("id"))
        .with_child(LeafSchema::new(q("id"), int(IntegerKind::Uint32)).build())
        .with_child(
            LeafSchema::new(q("value"), TypeDefinition::union(q("v"), vec![int(IntegerKind::Int64), string()]))
                .build(),
        )
        .with_child(LeafListSchema::new(q("tag"), string()).user_ordered().build())
        .with_child(
            ChoiceSchema::new(q("kind"))
                .with_case(CaseSchema::new(q("a")).with_child(LeafSchema::new(q("flag"), TypeDefinition::builtin(BuiltinType::Empty)).build()))
                .with_case(CaseSchema::new(q("b")).with_child(LeafSchema::new(q("weight"), weight).build()))
                .build(),
        )
        .with_augmentation(
            AugmentationSchema::new(vec![q("root"), q("item")])
                .with_child(LeafSchema::new(x("note"), string()).build())
                .build(),
        )
        .build();
    let root = ContainerSchema::new(q("root"))
        .with_child(item)
        .with_child(LeafSchema::new(q("blob"), TypeDefinition::builtin(BuiltinType::Binary)).build())
        .with_child(AnyXmlSchema::new(q("extra")).build())
        .build();

    let context: Arc<SchemaContext> = SchemaContext::builder()
        .module(Module::new("fuzz", module.clone()))
        .module(Module::new("fuzz-ext", QNameModule::new("urn:fuzz-ext", None)))
        .child(root)
        .build();
    Arc::new(CodecRegistry::new(context))
}
