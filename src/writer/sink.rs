//! Element sinks: the primitive wire operations of the stream writers.
//!
//! Escaping und Einrueckung uebernimmt quick-xml. Namespaces: ein Element
//! bekommt ein `xmlns="..."`, wenn sein Namespace vom Default-Namespace des
//! Parents abweicht; Attribute mit Namespace bekommen am Element einen
//! lokal deklarierten Prefix.

use std::io::Write;
use std::sync::Arc;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::node::Attributes;
use crate::options::XmlOptions;
use crate::qname::QName;
use crate::{Error, Result};

/// Primitive element operations consumed by [`XmlStreamWriter`](super::XmlStreamWriter).
pub trait ElementSink {
    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()>;

    /// Schliesst das zuletzt geoeffnete Element.
    fn end_element(&mut self) -> Result<()>;

    fn empty_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()>;

    fn write_text(&mut self, text: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// Offenes Element: Name fuer das End-Tag und Default-Namespace.
#[derive(Debug)]
struct OpenElement {
    name: Arc<str>,
    namespace: Arc<str>,
}

/// [`ElementSink`] writing XML through quick-xml.
pub struct XmlSink<W: Write> {
    writer: Writer<W>,
    open: Vec<OpenElement>,
    closed: bool,
}

impl<W: Write> XmlSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
            open: Vec::new(),
            closed: false,
        }
    }

    /// Sink mit Optionen (Einrueckung, XML-Deklaration).
    pub fn with_options(inner: W, options: &XmlOptions) -> Result<Self> {
        let writer = match options.indent {
            Some(width) => Writer::new_with_indent(inner, b' ', width),
            None => Writer::new(inner),
        };
        let mut sink = Self {
            writer,
            open: Vec::new(),
            closed: false,
        };
        if options.declaration {
            sink.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        Ok(sink)
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(Error::write_failure)
    }

    fn parent_namespace(&self) -> &str {
        self.open.last().map(|e| &*e.namespace).unwrap_or("")
    }

    /// Baut das Start-Tag inklusive Namespace-Deklarationen.
    fn start_tag<'a>(&self, name: &'a QName, attributes: &Attributes) -> BytesStart<'a> {
        let mut start = BytesStart::new(&*name.local_name);
        if *name.namespace != *self.parent_namespace() {
            start.push_attribute(("xmlns", &*name.namespace));
        }
        let mut prefixes: Vec<&str> = Vec::new();
        for (attr, value) in attributes {
            if attr.namespace.is_empty() {
                start.push_attribute((&*attr.local_name, value.as_str()));
                continue;
            }
            let index = match prefixes.iter().position(|ns| *ns == &*attr.namespace) {
                Some(i) => i,
                None => {
                    prefixes.push(&attr.namespace);
                    let i = prefixes.len() - 1;
                    start.push_attribute((format!("xmlns:a{i}").as_str(), &*attr.namespace));
                    i
                }
            };
            start.push_attribute((format!("a{index}:{}", attr.local_name).as_str(), value.as_str()));
        }
        start
    }
}

impl<W: Write> ElementSink for XmlSink<W> {
    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        let start = self.start_tag(name, attributes);
        self.event(Event::Start(start))?;
        self.open.push(OpenElement {
            name: Arc::clone(&name.local_name),
            namespace: Arc::clone(&name.namespace),
        });
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        let element = self
            .open
            .pop()
            .ok_or_else(|| Error::write_failure("end element without open element"))?;
        self.event(Event::End(BytesEnd::new(&*element.name)))
    }

    fn empty_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        let start = self.start_tag(name, attributes);
        self.event(Event::Empty(start))
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.get_mut().flush().map_err(Error::from)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(ns: &str, local: &str) -> QName {
        QName::new(ns, local)
    }

    fn render(f: impl FnOnce(&mut XmlSink<&mut Vec<u8>>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        let mut sink = XmlSink::new(&mut buf);
        f(&mut sink).unwrap();
        sink.close().unwrap();
        String::from_utf8(buf).unwrap()
    }

    /// xmlns nur beim Wechsel des Namespace.
    #[test]
    fn default_namespace_only_on_change() {
        let xml = render(|s| {
            s.start_element(&q("urn:a", "top"), &Attributes::default())?;
            s.start_element(&q("urn:a", "inner"), &Attributes::default())?;
            s.write_text("x")?;
            s.end_element()?;
            s.empty_element(&q("urn:b", "other"), &Attributes::default())?;
            s.end_element()
        });
        assert_eq!(
            xml,
            r#"<top xmlns="urn:a"><inner>x</inner><other xmlns="urn:b"/></top>"#
        );
    }

    #[test]
    fn text_is_escaped() {
        let xml = render(|s| {
            s.start_element(&q("urn:a", "t"), &Attributes::default())?;
            s.write_text("a<b & c")?;
            s.end_element()
        });
        assert!(xml.contains("a&lt;b &amp; c"), "{xml}");
    }

    #[test]
    fn namespaced_attributes_get_prefix() {
        let mut attrs = Attributes::default();
        attrs.insert(q("", "plain"), "1".into());
        attrs.insert(q("urn:meta", "op"), "merge".into());
        let xml = render(|s| s.empty_element(&q("urn:a", "t"), &attrs));
        assert!(xml.contains(r#"plain="1""#), "{xml}");
        assert!(xml.contains(r#"xmlns:a0="urn:meta""#), "{xml}");
        assert!(xml.contains(r#"a0:op="merge""#), "{xml}");
    }

    #[test]
    fn unbalanced_end_is_write_failure() {
        let mut buf = Vec::new();
        let mut sink = XmlSink::new(&mut buf);
        assert!(matches!(sink.end_element().unwrap_err(), Error::WriteFailure(_)));
    }

    #[test]
    fn declaration_and_indent() {
        let mut buf = Vec::new();
        let mut sink = XmlSink::with_options(&mut buf, &XmlOptions::pretty()).unwrap();
        sink.start_element(&q("urn:a", "top"), &Attributes::default()).unwrap();
        sink.empty_element(&q("urn:a", "x"), &Attributes::default()).unwrap();
        sink.end_element().unwrap();
        sink.close().unwrap();
        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"), "{xml}");
        assert!(xml.contains("\n  <x/>"), "{xml}");
    }
}
