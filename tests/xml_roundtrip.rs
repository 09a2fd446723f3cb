//! XML Round-Trip-Tests: Baum → XML → Baum ueber das gemeinsame Test-Schema.
//!
//! Neben der Gleichheit nach dem Round-Trip werden die Framing-Regeln
//! geprueft: kein Wrapper-Element fuer Listen und Leaf-Lists, Choice und
//! Augmentierung sind im Dokument unsichtbar.

use std::collections::BTreeSet;
use std::sync::Arc;

use yangcodec::codec::CodecRegistry;
use yangcodec::node::*;
use yangcodec::parser::XmlElement;
use yangcodec::schema::types::{BitDef, EnumPair};
use yangcodec::schema::*;
use yangcodec::{Decimal64, Error, NodeParser, QName, QNameModule, SchemaContext, XmlOptions};

include!("common/fixtures.rs");

// ============================================================================
// Hilfsfunktionen
// ============================================================================

fn to_xml(tree: &NormalizedNode) -> String {
    yangcodec::node_to_xml(&registry(), tree, &XmlOptions::default()).unwrap()
}

/// Anzahl der Elemente mit lokalem Namen `name` im Dokument.
fn count_elements(xml: &str, name: &str) -> usize {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == name)
        .count()
}

// ============================================================================
// Round-Trip
// ============================================================================

#[test]
fn sample_tree_roundtrips() {
    let codecs = registry();
    let tree = sample_tree();
    let xml = yangcodec::node_to_xml(&codecs, &tree, &XmlOptions::default()).unwrap();
    let parsed = yangcodec::parse_xml_str(&codecs, &xml).unwrap();
    assert_eq!(parsed, tree, "{xml}");
}

#[test]
fn pretty_output_roundtrips() {
    let codecs = registry();
    let tree = sample_tree();
    let xml = yangcodec::node_to_xml(&codecs, &tree, &XmlOptions::pretty()).unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#), "{xml}");
    assert!(xml.contains('\n'));
    assert_eq!(yangcodec::parse_xml_str(&codecs, &xml).unwrap(), tree);
}

/// Leafs ohne Wert werden zu leeren Elementen und wieder zu Leafs ohne Wert.
#[test]
fn absent_leaves_roundtrip_as_empty_elements() {
    let codecs = registry();
    let tree: NormalizedNode = ContainerNodeBuilder::new(q("interfaces"))
        .child(LeafNode::absent(q("counter")))
        .child(LeafNode::absent(q("ratio")))
        .child(LeafNode::new(q("flag"), Value::Empty))
        .build()
        .into();
    let xml = yangcodec::node_to_xml(&codecs, &tree, &XmlOptions::default()).unwrap();
    assert!(xml.contains("<counter/>"), "{xml}");
    assert!(xml.contains("<ratio/>"), "{xml}");
    assert_eq!(yangcodec::parse_xml_str(&codecs, &xml).unwrap(), tree, "{xml}");
}

#[test]
fn compact_output_is_exact() {
    let xml = to_xml(&tree_with_interfaces(1));
    assert_eq!(
        xml,
        r#"<interfaces xmlns="urn:test:net"><interface><name>eth0</name></interface></interfaces>"#
    );
}

#[test]
fn user_ordered_leaf_list_keeps_order() {
    let codecs = registry();
    let xml = to_xml(&sample_tree());
    let first = xml.find(">8.8.8.8<").unwrap();
    let second = xml.find(">1.1.1.1<").unwrap();
    assert!(first < second);

    let parsed = yangcodec::parse_xml_str(&codecs, &xml).unwrap();
    let dns = parsed.child(&PathArgument::NodeIdentifier(q("dns"))).unwrap();
    let NormalizedNode::LeafSet(dns) = dns else {
        panic!("dns is a leaf-list: {dns:?}");
    };
    assert!(dns.ordered);
}

// ============================================================================
// Framing
// ============================================================================

/// Jeder Entry ist ein eigenes Element; die Liste selbst erscheint nicht.
#[test]
fn list_framing_without_wrapper() {
    let xml = to_xml(&tree_with_interfaces(3));
    assert_eq!(count_elements(&xml, "interface"), 3);
    assert_eq!(count_elements(&xml, "interfaces"), 1);
}

#[test]
fn empty_list_writes_no_element() {
    let xml = to_xml(&tree_with_interfaces(0));
    assert_eq!(count_elements(&xml, "interface"), 0);
    assert_eq!(count_elements(&xml, "interfaces"), 1);
}

#[test]
fn leaf_list_entries_are_repeated_elements() {
    let xml = to_xml(&sample_tree());
    assert_eq!(count_elements(&xml, "address"), 2);
    assert_eq!(count_elements(&xml, "dns"), 2);
    assert_eq!(count_elements(&xml, "allowed-vlan"), 2);
}

/// Choice, Case und Augmentierung haben kein eigenes Element.
#[test]
fn choice_and_augmentation_transparent() {
    let xml = to_xml(&sample_tree());
    for hidden in ["mode", "access", "trunk"] {
        assert_eq!(count_elements(&xml, hidden), 0, "{hidden} in {xml}");
    }
    assert_eq!(count_elements(&xml, "vlan"), 1);

    let doc = roxmltree::Document::parse(&xml).unwrap();
    let note = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "note")
        .unwrap();
    assert_eq!(note.tag_name().namespace(), Some(EXT_NS));
    assert_eq!(note.parent_element().unwrap().tag_name().name(), "interface");
}

#[test]
fn attributes_written_with_namespaces() {
    let xml = to_xml(&sample_tree());
    assert!(xml.contains(r#"origin="learned""#), "{xml}");
    assert!(xml.contains(&format!(r#"xmlns:a0="{NETCONF_NS}""#)), "{xml}");
    assert!(xml.contains(r#"a0:operation="replace""#), "{xml}");
}

#[test]
fn canonical_scalar_text() {
    let xml = to_xml(&sample_tree());
    for expected in [
        "<weight>2.5</weight>",
        "<ratio>0.125</ratio>",
        "<flag/>",
        "<blob>3q2+7w==</blob>",
        "<caps>ipv4 mpls</caps>",
        "<counter>18446744073709551615</counter>",
        "<type>net-ext:fiber</type>",
        "<type>loopback</type>",
        "<level>warn</level>",
    ] {
        assert!(xml.contains(expected), "missing {expected} in {xml}");
    }
}

// ============================================================================
// Parse-Fehler
// ============================================================================

#[test]
fn unknown_child_rejected() {
    let codecs = registry();
    let err = yangcodec::parse_xml_str(
        &codecs,
        r#"<interfaces xmlns="urn:test:net"><bogus>1</bogus></interfaces>"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownChild { ref child, .. } if &*child.local_name == "bogus"), "{err}");
}

#[test]
fn wrong_namespace_is_unknown_child() {
    let codecs = registry();
    let err = yangcodec::parse_xml_str(
        &codecs,
        r#"<interfaces xmlns="urn:test:net"><weight xmlns="urn:test:net-ext">2.5</weight></interfaces>"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownChild { .. }), "{err}");
}

#[test]
fn container_cardinality() {
    let codecs = registry();
    let context = Arc::clone(codecs.schema_context());
    let schema = interfaces_schema(&context);

    let parse = |xml: &str| {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let elements: Vec<_> = doc
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|n| XmlElement::new(n, &context))
            .collect();
        NodeParser::new(&codecs).parse_container(&elements, &schema)
    };

    let one = parse(r#"<data><interfaces xmlns="urn:test:net"/></data>"#).unwrap();
    assert_eq!(one.identifier, q("interfaces"));

    for (xml, expected) in [
        (r#"<data><other/></data>"#, 0),
        (
            r#"<data><interfaces xmlns="urn:test:net"/><interfaces xmlns="urn:test:net"/></data>"#,
            2,
        ),
    ] {
        let err = parse(xml).unwrap_err();
        assert!(
            matches!(err, Error::CardinalityViolation { found, .. } if found == expected),
            "{err}"
        );
    }
}

#[test]
fn missing_key_rejected() {
    let codecs = registry();
    let err = yangcodec::parse_xml_str(
        &codecs,
        r#"<interfaces xmlns="urn:test:net"><interface><mtu>1500</mtu></interface></interfaces>"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingListKey { ref key, .. } if *key == q("name")), "{err}");
}

#[test]
fn restricted_value_rejected() {
    let codecs = registry();
    let err = yangcodec::parse_xml_str(
        &codecs,
        r#"<interfaces xmlns="urn:test:net"><interface><name>e</name><mtu>50</mtu></interface></interfaces>"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::OutOfRange { .. }), "{err}");
    assert!(err.to_string().contains("68..9000"), "{err}");
}

#[test]
fn malformed_xml_rejected() {
    let codecs = registry();
    let err = yangcodec::parse_xml_str(&codecs, "<interfaces xmlns=\"urn:test:net\">").unwrap_err();
    assert!(matches!(err, Error::XmlParseError(_)), "{err}");
}

// ============================================================================
// Write-Fehler
// ============================================================================

#[test]
fn write_unknown_leaf_is_schema_mismatch() {
    let tree: NormalizedNode = ContainerNodeBuilder::new(q("interfaces"))
        .child(LeafNode::new(q("nonexistent"), "x"))
        .build()
        .into();
    let err = yangcodec::node_to_xml(&registry(), &tree, &XmlOptions::default()).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }), "{err}");
}

#[test]
fn write_leaf_as_container_is_structural_mismatch() {
    let tree: NormalizedNode = ContainerNodeBuilder::new(q("interfaces"))
        .child(ContainerNodeBuilder::new(q("weight")).build())
        .build()
        .into();
    let err = yangcodec::node_to_xml(&registry(), &tree, &XmlOptions::default()).unwrap_err();
    assert!(
        matches!(err, Error::StructuralMismatch { expected: "container", found: "leaf", .. }),
        "{err}"
    );
}

#[test]
fn write_value_violating_range_fails() {
    let tree: NormalizedNode = ContainerNodeBuilder::new(q("interfaces"))
        .child(LeafNode::new(q("weight"), Decimal64::new(14, 1)))
        .build()
        .into();
    let err = yangcodec::node_to_xml(&registry(), &tree, &XmlOptions::default()).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { .. }), "{err}");
}

#[test]
fn write_decimal_with_oversized_scale_fails() {
    let tree: NormalizedNode = ContainerNodeBuilder::new(q("interfaces"))
        .child(LeafNode::new(q("ratio"), Decimal64::new(1, 40)))
        .build()
        .into();
    let err = yangcodec::node_to_xml(&registry(), &tree, &XmlOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }), "{err}");
}

#[test]
fn empty_document_has_no_root() {
    let codecs = registry();
    let mut parser = NodeParser::new(&codecs);
    let err = parser.parse_top_level(Vec::<XmlElement<'_, '_>>::new()).unwrap_err();
    assert_eq!(err, Error::EmptyDocument);
}
