//! Hardened XML reader construction.
//!
//! [`XmlReaderFactory`] produces streaming readers whose entity-reference
//! expansion is restricted unless the client configuration explicitly opts
//! out of the hardening (`disable_xml_security`). Unrestricted entity
//! expansion is a classic denial-of-service/disclosure vector (XXE), so the
//! safe behavior is the default.
//!
//! A factory is a plain value scoped to one logical unit of work: construct
//! it where needed (e.g. via
//! [`Client::xml_reader_factory`](crate::Client::xml_reader_factory)), pass
//! it down the call chain explicitly, and let it drop at the end of that
//! unit of work. There is no ambient or thread-local factory.

use std::borrow::Cow;
use std::collections::HashMap;

use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::Reader;

use crate::config::ClientConfig;

/// Factory for configured [`quick_xml::Reader`]s and entity-aware text
/// decoding.
#[derive(Debug, Clone)]
pub struct XmlReaderFactory {
    /// When `false` (the default), only the predefined XML entities are ever
    /// resolved; registered entities are ignored and unknown references are
    /// left verbatim.
    replace_entity_references: bool,
    /// Caller-registered entities, honored only in unhardened mode.
    entities: HashMap<String, String>,
}

impl XmlReaderFactory {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            replace_entity_references: config.disable_xml_security,
            entities: HashMap::new(),
        }
    }

    /// Registers a custom entity (`&name;` → `value`). Only consulted when
    /// hardening is disabled.
    pub fn with_entity<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.entities.insert(name.into(), value.into());
        self
    }

    /// `true` when entity expansion is restricted to the predefined set.
    pub fn secure_processing(&self) -> bool {
        !self.replace_entity_references
    }

    /// A streaming reader over `xml` with the factory's settings applied.
    pub fn reader<'a>(&self, xml: &'a str) -> Reader<&'a [u8]> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        reader
    }

    /// Decodes raw text content, resolving entity references per policy.
    ///
    /// Predefined entities (`&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`) and
    /// numeric character references always resolve. Registered entities
    /// resolve only in unhardened mode. Text containing a reference that the
    /// policy refuses to expand is returned verbatim.
    pub fn unescape_text<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let resolved = unescape_with(raw, |name: &str| {
            resolve_predefined_entity(name).or_else(|| {
                if self.replace_entity_references {
                    self.entities.get(name).map(String::as_str)
                } else {
                    None
                }
            })
        });

        match resolved {
            Ok(text) => text,
            Err(_) => Cow::Borrowed(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    fn hardened() -> XmlReaderFactory {
        XmlReaderFactory::new(&ClientConfig::default())
    }

    fn unhardened() -> XmlReaderFactory {
        let config = ClientConfig::builder().disable_xml_security(true).build().unwrap();
        XmlReaderFactory::new(&config)
    }

    #[test]
    fn predefined_entities_always_resolve() {
        let factory = hardened();
        assert_eq!(factory.unescape_text("a &amp; b"), "a & b");
        assert_eq!(factory.unescape_text("&lt;tag&gt;"), "<tag>");
    }

    #[test]
    fn custom_entities_resolve_only_when_security_is_disabled() {
        let xml_entity = ("greeting", "hello");

        let locked = hardened().with_entity(xml_entity.0, xml_entity.1);
        assert!(locked.secure_processing());
        assert_eq!(locked.unescape_text("&greeting;"), "&greeting;");

        let open = unhardened().with_entity(xml_entity.0, xml_entity.1);
        assert!(!open.secure_processing());
        assert_eq!(open.unescape_text("&greeting;"), "hello");
    }

    #[test]
    fn unknown_references_survive_verbatim() {
        assert_eq!(hardened().unescape_text("&doom;"), "&doom;");
        assert_eq!(unhardened().unescape_text("&doom;"), "&doom;");
    }

    #[test]
    fn reader_streams_elements_with_text_decoded_by_policy() {
        let factory = unhardened().with_entity("who", "world");
        let mut reader = factory.reader("<msg>hello &who;</msg>");

        let mut texts = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Text(t)) => {
                    let raw = String::from_utf8(t.to_vec()).unwrap();
                    texts.push(factory.unescape_text(&raw).into_owned());
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("parse error: {e}"),
            }
        }

        assert_eq!(texts, vec!["hello world".to_string()]);
    }
}
