//! Writer options for the XML and JSON output.
//!
//! # Beispiel
//!
//! ```
//! use yangcodec::options::{JsonOptions, XmlOptions};
//!
//! let xml = XmlOptions::default().with_indent(4).with_declaration(true);
//! assert_eq!(xml.indent, Some(4));
//! assert!(xml.declaration);
//!
//! assert!(!JsonOptions::default().pretty);
//! assert!(JsonOptions::pretty().pretty);
//! ```

/// XML output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmlOptions {
    /// Einrueckung in Spaces; `None` = kompakte Ausgabe (Default).
    pub indent: Option<usize>,
    /// `<?xml version="1.0" encoding="UTF-8"?>` voranstellen.
    pub declaration: bool,
}

impl XmlOptions {
    /// Eingerueckt (2 Spaces) mit XML-Deklaration.
    pub fn pretty() -> Self {
        Self {
            indent: Some(2),
            declaration: true,
        }
    }

    pub fn with_indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

/// JSON output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Eingerueckte Ausgabe statt kompakter.
    pub pretty: bool,
}

impl JsonOptions {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}
