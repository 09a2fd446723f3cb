// Gemeinsames Test-Schema ("net" + Augmentierung aus "net-ext") und ein
// Beispielbaum, der jeden Knoten- und Werttyp mindestens einmal enthaelt.
//
// Wird per `include!` eingebunden. Benoetigte Imports:
//   use std::collections::BTreeSet;
//   use std::sync::Arc;
//   use yangcodec::codec::CodecRegistry;
//   use yangcodec::node::*;
//   use yangcodec::schema::*;
//   use yangcodec::schema::types::{BitDef, EnumPair};
//   use yangcodec::{Decimal64, QName, QNameModule, SchemaContext};

const NET_NS: &str = "urn:test:net";
const NET_REV: &str = "2024-05-01";
const EXT_NS: &str = "urn:test:net-ext";
const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

#[allow(dead_code)]
fn net() -> QNameModule {
    QNameModule::new(NET_NS, Some(NET_REV))
}

#[allow(dead_code)]
fn ext() -> QNameModule {
    QNameModule::new(EXT_NS, None)
}

/// QName im Modul "net" (mit Revision).
#[allow(dead_code)]
fn q(local: &str) -> QName {
    QName::in_module(&net(), local)
}

/// QName im Modul "net-ext".
#[allow(dead_code)]
fn x(local: &str) -> QName {
    QName::in_module(&ext(), local)
}

// ============================================================================
// Typen
// ============================================================================

#[allow(dead_code)]
fn string_type() -> Arc<TypeDefinition> {
    TypeDefinition::builtin(BuiltinType::String)
}

#[allow(dead_code)]
fn int_type(kind: IntegerKind) -> Arc<TypeDefinition> {
    TypeDefinition::builtin(BuiltinType::Integer(kind))
}

/// `node-weight` → `weight` → `weight-base` (decimal64, fd 1, range 1.5..5.5).
///
/// Die Range sitzt zwei Ebenen unter dem nominellen Typ des Leafs.
#[allow(dead_code)]
fn weight_type() -> Arc<TypeDefinition> {
    let base = TypeDefinition::derived(
        q("weight-base"),
        TypeDefinition::builtin(BuiltinType::Decimal64 { fraction_digits: 1 }),
        Restrictions::new().with_range(Decimal64::new(15, 1), Decimal64::new(55, 1)),
    );
    let weight = TypeDefinition::derived(q("weight"), base, Restrictions::new());
    TypeDefinition::derived(q("node-weight"), weight, Restrictions::new())
}

#[allow(dead_code)]
fn mtu_type() -> Arc<TypeDefinition> {
    TypeDefinition::derived(
        q("mtu-type"),
        int_type(IntegerKind::Uint16),
        Restrictions::new().with_range(68i64, 9000i64),
    )
}

#[allow(dead_code)]
fn description_type() -> Arc<TypeDefinition> {
    TypeDefinition::derived(
        q("description-type"),
        string_type(),
        Restrictions::new().with_length(1, 64).with_pattern("[a-z][a-z0-9 -]*"),
    )
}

#[allow(dead_code)]
fn level_type() -> Arc<TypeDefinition> {
    let pairs = [("info", 0), ("warn", 1), ("error", 2)]
        .into_iter()
        .map(|(name, value)| EnumPair { name: name.into(), value })
        .collect();
    TypeDefinition::builtin(BuiltinType::Enumeration(pairs))
}

#[allow(dead_code)]
fn caps_type() -> Arc<TypeDefinition> {
    let bits = [("ipv4", 0), ("ipv6", 1), ("mpls", 2)]
        .into_iter()
        .map(|(name, position)| BitDef { name: name.into(), position })
        .collect();
    TypeDefinition::builtin(BuiltinType::Bits(bits))
}

#[allow(dead_code)]
fn leaf(name: QName, ty: Arc<TypeDefinition>) -> Arc<DataSchemaNode> {
    LeafSchema::new(name, ty).build()
}

// ============================================================================
// Schema
// ============================================================================

/// Augmentierung von `/interfaces/interface` aus "net-ext".
#[allow(dead_code)]
fn interface_augmentation() -> Arc<AugmentationSchema> {
    AugmentationSchema::new(vec![q("interfaces"), q("interface")])
        .with_child(leaf(x("note"), string_type()))
        .with_child(
            ContainerSchema::new(x("owner"))
                .with_child(leaf(x("contact"), string_type()))
                .build(),
        )
        .build()
}

#[allow(dead_code)]
fn interface_schema() -> Arc<DataSchemaNode> {
    let mode = ChoiceSchema::new(q("mode"))
        .with_case(CaseSchema::new(q("access")).with_child(leaf(q("vlan"), int_type(IntegerKind::Uint16))))
        .with_case(
            CaseSchema::new(q("trunk")).with_child(
                LeafListSchema::new(q("allowed-vlan"), int_type(IntegerKind::Uint16))
                    .user_ordered()
                    .build(),
            ),
        )
        .build();
    let speed = TypeDefinition::union(q("speed-type"), vec![int_type(IntegerKind::Int32), string_type()]);

    ListSchema::new(q("interface"))
        .with_key(q("name"))
        .with_child(leaf(q("name"), string_type()))
        .with_child(leaf(q("mtu"), mtu_type()))
        .with_child(leaf(q("enabled"), TypeDefinition::builtin(BuiltinType::Boolean)))
        .with_child(leaf(q("description"), description_type()))
        .with_child(leaf(q("speed"), speed))
        .with_child(leaf(q("type"), TypeDefinition::identityref(q("if-type-ref"), q("interface-type"))))
        .with_child(LeafListSchema::new(q("address"), string_type()).build())
        .with_child(mode)
        .with_augmentation(interface_augmentation())
        .build()
}

#[allow(dead_code)]
fn schema_context() -> Arc<SchemaContext> {
    let log = ListSchema::new(q("log"))
        .with_child(leaf(q("msg"), string_type()))
        .with_child(leaf(q("level"), level_type()))
        .build();

    let interfaces = ContainerSchema::new(q("interfaces"))
        .with_child(interface_schema())
        .with_child(leaf(q("weight"), weight_type()))
        .with_child(leaf(q("ratio"), TypeDefinition::builtin(BuiltinType::Decimal64 { fraction_digits: 3 })))
        .with_child(LeafListSchema::new(q("dns"), string_type()).user_ordered().build())
        .with_child(log)
        .with_child(leaf(q("flag"), TypeDefinition::builtin(BuiltinType::Empty)))
        .with_child(leaf(q("blob"), TypeDefinition::builtin(BuiltinType::Binary)))
        .with_child(leaf(q("caps"), caps_type()))
        .with_child(leaf(q("counter"), int_type(IntegerKind::Uint64)))
        .with_child(AnyXmlSchema::new(q("vendor-data")).build())
        .build();

    SchemaContext::builder()
        .module(
            Module::new("net", net())
                .with_identity(IdentitySchema::new(q("interface-type")))
                .with_identity(IdentitySchema::new(q("ethernet")).with_base(q("interface-type")))
                .with_identity(IdentitySchema::new(q("loopback")).with_base(q("interface-type"))),
        )
        .module(Module::new("net-ext", ext()).with_identity(IdentitySchema::new(x("fiber")).with_base(q("ethernet"))))
        .child(interfaces)
        .build()
}

#[allow(dead_code)]
fn registry() -> Arc<CodecRegistry> {
    Arc::new(CodecRegistry::new(schema_context()))
}

// ============================================================================
// Beispielbaum
// ============================================================================

#[allow(dead_code)]
fn interface_entry(name: &str) -> ListEntryNodeBuilder {
    ListEntryNodeBuilder::new(PathArgument::NodeIdentifierWithPredicates {
        node_type: q("interface"),
        keys: KeyValues::new().with(q("name"), name),
    })
    .child(LeafNode::new(q("name"), name))
}

#[allow(dead_code)]
fn augmentation_id() -> BTreeSet<QName> {
    [x("note"), x("owner")].into_iter().collect()
}

#[allow(dead_code)]
fn eth0() -> ListEntryNode {
    interface_entry("eth0")
        .attribute(QName::new("", "origin"), "learned")
        .child(LeafNode::new(q("mtu"), 1500u16).with_attribute(QName::new(NETCONF_NS, "operation"), "replace"))
        .child(LeafNode::new(q("enabled"), true))
        .child(LeafNode::new(q("description"), "uplink to core"))
        .child(LeafNode::new(q("speed"), 1000i32))
        .child(LeafNode::new(q("type"), x("fiber")))
        .child(
            LeafSetNodeBuilder::new(q("address"))
                .value("10.0.0.1")
                .value("10.0.0.2")
                .build(),
        )
        .child(
            ChoiceNodeBuilder::new(q("mode"))
                .child(LeafNode::new(q("vlan"), 10u16))
                .build(),
        )
        .child(
            AugmentationNodeBuilder::new(augmentation_id())
                .child(LeafNode::new(x("note"), "primary"))
                .child(
                    ContainerNodeBuilder::new(x("owner"))
                        .child(LeafNode::new(x("contact"), "noc"))
                        .build(),
                )
                .build(),
        )
        .build()
}

#[allow(dead_code)]
fn lo() -> ListEntryNode {
    interface_entry("lo")
        .child(LeafNode::new(q("enabled"), false))
        .child(LeafNode::new(q("speed"), "auto"))
        .child(LeafNode::new(q("type"), q("loopback")))
        .child(
            ChoiceNodeBuilder::new(q("mode"))
                .child(
                    LeafSetNodeBuilder::new(q("allowed-vlan"))
                        .ordered(true)
                        .value(20u16)
                        .value(10u16)
                        .build(),
                )
                .build(),
        )
        .build()
}

#[allow(dead_code)]
fn log_entry(msg: &str, level: &str) -> ListEntryNode {
    ListEntryNodeBuilder::unkeyed(q("log"))
        .child(LeafNode::new(q("msg"), msg))
        .child(LeafNode::new(q("level"), Value::Enumeration(level.into())))
        .build()
}

/// Der vollstaendige Beispielbaum.
#[allow(dead_code)]
fn sample_tree() -> NormalizedNode {
    let vendor = AnyXmlElement::new(q("vendor-data"))
        .with_element(AnyXmlElement::new(QName::new(NET_NS, "setting")).with_text("on"));

    ContainerNodeBuilder::new(q("interfaces"))
        .child(ListNodeBuilder::new(q("interface")).entry(eth0()).entry(lo()).build())
        .child(LeafNode::new(q("weight"), Decimal64::new(25, 1)))
        .child(LeafNode::new(q("ratio"), Decimal64::new(125, 3)))
        .child(
            LeafSetNodeBuilder::new(q("dns"))
                .ordered(true)
                .value("8.8.8.8")
                .value("1.1.1.1")
                .build(),
        )
        .child(
            ListNodeBuilder::new(q("log"))
                .ordered(true)
                .entry(log_entry("boot", "info"))
                .entry(log_entry("link up", "warn"))
                .build(),
        )
        .child(LeafNode::new(q("flag"), Value::Empty))
        .child(LeafNode::new(q("blob"), Value::Binary(vec![0xde, 0xad, 0xbe, 0xef])))
        .child(LeafNode::new(q("caps"), Value::Bits(vec!["ipv4".into(), "mpls".into()])))
        .child(LeafNode::new(q("counter"), u64::MAX))
        .child(AnyXmlNode::new(q("vendor-data"), Some(vendor)))
        .build()
        .into()
}

/// `interfaces` mit `n` gleichartigen Interface-Entries.
#[allow(dead_code)]
fn tree_with_interfaces(n: usize) -> NormalizedNode {
    let mut list = ListNodeBuilder::new(q("interface"));
    for i in 0..n {
        list.push_entry(interface_entry(&format!("eth{i}")).build());
    }
    ContainerNodeBuilder::new(q("interfaces"))
        .child(list.build())
        .build()
        .into()
}

/// Das Schema von `interfaces`.
#[allow(dead_code)]
fn interfaces_schema(context: &Arc<SchemaContext>) -> Arc<DataSchemaNode> {
    SchemaScope::Context(Arc::clone(context))
        .resolve_child(&q("interfaces"))
        .expect("interfaces is a top-level node")
}
