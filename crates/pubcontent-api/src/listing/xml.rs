//! Conversion of published XML files into a generic value tree.
//!
//! The tree uses an explicit root and explicit child lists:
//!
//! ```text
//! <item id="7"><title>One</title><title>Two</title></item>
//! ```
//!
//! becomes
//!
//! ```text
//! { "item": { "$": { "id": "7" }, "title": ["One", "Two"] } }
//! ```
//!
//! Attributes live under `$`, character data under `_`, and an element
//! without attributes or children collapses to its text.

use std::str;

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::escape::{EscapeError, resolve_predefined_entity, unescape};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesRef, BytesStart, Event};
use serde::Serialize;
use thiserror::Error;

/// Key holding an element's attributes.
const ATTR_KEY: &str = "$";

/// Key holding an element's character data.
const CHAR_KEY: &str = "_";

/// Generic XML value tree.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum XmlValue {
    /// Text content or attribute value.
    Text(String),
    /// Repeated child elements, in document order.
    List(Vec<Self>),
    /// Element with attributes and/or children, keyed in order of first
    /// appearance.
    Map(IndexMap<String, Self>),
}

impl XmlValue {
    /// Returns the text if this is a [`XmlValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a [`XmlValue::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a [`XmlValue::Map`].
    #[must_use]
    pub const fn as_map(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` in a [`XmlValue::Map`].
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Returns the first child element named `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&Self> {
        self.get(key)
            .and_then(Self::as_list)
            .and_then(<[Self]>::first)
    }
}

/// XML well-formedness errors.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum XmlError {
    /// Reader-level syntax error (bad markup, mismatched end tag, ...).
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),
    /// Malformed or duplicated attribute.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    /// Bad escape sequence in an attribute value.
    #[error("invalid escape in attribute value: {0}")]
    Escape(#[from] EscapeError),
    /// Non UTF-8 data.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] str::Utf8Error),
    /// Entity or character reference that cannot be resolved.
    #[error("unknown entity reference: &{0};")]
    UnknownEntity(String),
    /// Non-whitespace content before or after the root element.
    #[error("content outside the root element")]
    ContentOutsideRoot,
    /// A second top-level element.
    #[error("more than one root element")]
    MultipleRoots,
    /// End of input inside an element.
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    /// Closing tag without a matching opening tag.
    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),
    /// Input without any element.
    #[error("document has no root element")]
    NoRootElement,
}

/// Element being built.
#[derive(Debug)]
struct Frame {
    name: String,
    attrs: IndexMap<String, XmlValue>,
    children: IndexMap<String, Vec<XmlValue>>,
    text: String,
    cdata: bool,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from(str::from_utf8(start.name().as_ref())?);

        let mut attrs = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from(str::from_utf8(attr.key.as_ref())?);
            let raw = str::from_utf8(&attr.value)?;
            attrs.insert(key, XmlValue::Text(unescape(raw)?.into_owned()));
        }

        Ok(Self {
            name,
            attrs,
            children: IndexMap::new(),
            text: String::new(),
            cdata: false,
        })
    }

    fn close(self) -> (String, XmlValue) {
        let mut map = IndexMap::new();
        if !self.attrs.is_empty() {
            map.insert(String::from(ATTR_KEY), XmlValue::Map(self.attrs));
        }
        for (name, values) in self.children {
            map.insert(name, XmlValue::List(values));
        }

        if map.is_empty() {
            return (self.name, XmlValue::Text(self.text));
        }
        if self.cdata || !self.text.trim().is_empty() {
            map.insert(String::from(CHAR_KEY), XmlValue::Text(self.text));
        }
        (self.name, XmlValue::Map(map))
    }
}

/// Parser state: open elements plus the finished root, if any.
#[derive(Debug, Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    root: Option<(String, XmlValue)>,
}

impl TreeBuilder {
    fn open(&mut self, frame: Frame) -> Result<(), XmlError> {
        if self.root.is_some() {
            return Err(XmlError::MultipleRoots);
        }
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<(), XmlError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| XmlError::UnexpectedEnd(String::from_utf8_lossy(name).into_owned()))?;
        if frame.name.as_bytes() != name {
            return Err(XmlError::UnexpectedEnd(
                String::from_utf8_lossy(name).into_owned(),
            ));
        }
        self.attach(frame.close());
        Ok(())
    }

    fn attach(&mut self, (name, value): (String, XmlValue)) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.entry(name).or_default().push(value),
            None => self.root = Some((name, value)),
        }
    }

    fn text(&mut self, text: &str) -> Result<(), XmlError> {
        match self.stack.last_mut() {
            Some(frame) => {
                frame.text.push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(XmlError::ContentOutsideRoot),
        }
    }

    fn cdata(&mut self, text: &str) -> Result<(), XmlError> {
        let frame = self
            .stack
            .last_mut()
            .ok_or(XmlError::ContentOutsideRoot)?;
        frame.text.push_str(text);
        frame.cdata = true;
        Ok(())
    }

    fn finish(mut self) -> Result<XmlValue, XmlError> {
        if let Some(frame) = self.stack.pop() {
            return Err(XmlError::Unclosed(frame.name));
        }
        let (name, value) = self.root.ok_or(XmlError::NoRootElement)?;
        Ok(XmlValue::Map(IndexMap::from([(name, value)])))
    }
}

/// Returns `true` for characters allowed by the XML `Char` production.
const fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Resolves `&name;` (predefined entities and character references).
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, XmlError> {
    let name = str::from_utf8(reference)?;

    let resolved = match reference.resolve_char_ref() {
        Ok(Some(ch)) if is_xml_char(ch) => Some(String::from(ch)),
        Ok(None) => resolve_predefined_entity(name).map(String::from),
        _ => None,
    };
    resolved.ok_or_else(|| XmlError::UnknownEntity(String::from(name)))
}

/// Parses an XML document into an [`XmlValue`] tree.
///
/// The result is always a single-entry [`XmlValue::Map`] keyed by the root
/// element name.
///
/// # Errors
///
/// Returns an error if the document is not well-formed XML or contains no
/// root element.
pub fn parse_xml(xml: &str) -> Result<XmlValue, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => builder.open(Frame::open(&e)?)?,
            Event::Empty(e) => {
                builder.open(Frame::open(&e)?)?;
                builder.close(e.name().as_ref())?;
            }
            Event::End(e) => builder.close(e.name().as_ref())?,
            Event::Text(e) => builder.text(str::from_utf8(&e)?)?,
            Event::CData(e) => builder.cdata(str::from_utf8(&e)?)?,
            Event::GeneralRef(e) => {
                let resolved = resolve_reference(&e)?;
                if builder.stack.is_empty() {
                    return Err(XmlError::ContentOutsideRoot);
                }
                builder.text(&resolved)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_text_only_root() {
        // Arrange
        let xml = r#"<?xml version="1.0" encoding="utf-8"?><test>hello world</test>"#;

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({ "test": "hello world" }));
        assert_eq!(value.get("test").unwrap().as_text(), Some("hello world"));
    }

    #[test]
    fn test_children_become_lists_in_document_order() {
        // Arrange
        let xml = "<item><title>One</title><link>x</link><title>Two</title></item>";

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "item": { "title": ["One", "Two"], "link": ["x"] } })
        );
        assert_eq!(item_keys(&value), ["title", "link"]);
        let item = value.get("item").unwrap();
        assert_eq!(item.first("title").unwrap().as_text(), Some("One"));
    }

    fn item_keys(value: &XmlValue) -> Vec<&str> {
        value
            .get("item")
            .unwrap()
            .as_map()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_keys_follow_document_order() {
        // Arrange
        let xml = r#"<item z="1" a="2"><zeta>1</zeta><alpha>2</alpha><mid>3</mid><zeta>4</zeta></item>"#;

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        assert_eq!(item_keys(&value), ["$", "zeta", "alpha", "mid"]);
        let attrs = value.get("item").unwrap().get("$").unwrap().as_map().unwrap();
        assert_eq!(attrs.keys().collect::<Vec<_>>(), ["z", "a"]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"item":{"$":{"z":"1","a":"2"},"zeta":["1","4"],"alpha":["2"],"mid":["3"]}}"#
        );
    }

    #[test]
    fn test_attributes_and_text() {
        // Arrange
        let xml = r#"<BestBet id="1045389" lang="en"><Name>Cancer &amp; You</Name><Weight kind="int">10</Weight><Empty/></BestBet>"#;

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({
                "BestBet": {
                    "$": { "id": "1045389", "lang": "en" },
                    "Name": ["Cancer & You"],
                    "Weight": [{ "$": { "kind": "int" }, "_": "10" }],
                    "Empty": [""]
                }
            })
        );
    }

    #[test]
    fn test_whitespace_between_children_is_dropped() {
        // Arrange
        let xml = "<root>\n  <a>1</a>\n  <b> </b>\n</root>\n";

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "root": { "a": ["1"], "b": [" "] } })
        );
    }

    #[test]
    fn test_cdata_and_char_refs() {
        // Arrange
        let xml = "<doc><html><![CDATA[<p>hi</p>]]></html><c>&#65;&#x42;</c></doc>";

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        let doc = value.get("doc").unwrap();
        assert_eq!(doc.first("html").unwrap().as_text(), Some("<p>hi</p>"));
        assert_eq!(doc.first("c").unwrap().as_text(), Some("AB"));
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        // Arrange
        let xml = r#"<a href="/x?a=1&amp;b=2"/>"#;

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        let attrs = value.get("a").unwrap().get("$").unwrap();
        assert_eq!(attrs.get("href").unwrap().as_text(), Some("/x?a=1&b=2"));
    }

    #[test]
    fn test_rejects_garbage() {
        // Arrange & Act
        let result = parse_xml("&&&&&&&");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_malformed_documents() {
        // Arrange
        let cases = [
            "",
            "   ",
            "just text",
            "<a><b></a>",
            "<a>",
            "<a></a><b></b>",
            "<a></a>trailing",
            "<a>&nbsp;</a>",
            "</a>",
        ];

        // Act & Assert
        for xml in cases {
            assert!(parse_xml(xml).is_err(), "accepted: {xml:?}");
        }
    }

    #[test]
    fn test_specific_error_variants() {
        // Arrange & Act & Assert
        assert!(matches!(parse_xml(""), Err(XmlError::NoRootElement)));
        assert!(matches!(parse_xml("<a/><b/>"), Err(XmlError::MultipleRoots)));
        assert!(matches!(
            parse_xml("<a>&bogus;</a>"),
            Err(XmlError::UnknownEntity(name)) if name == "bogus"
        ));
    }

    #[test]
    fn test_rejects_illegal_char_refs() {
        // Arrange
        let cases = ["<a>&#0;</a>", "<a>&#x0;</a>", "<a>&#xFFFE;</a>", "<a>&#x1F;</a>"];

        // Act & Assert
        for xml in cases {
            assert!(
                matches!(parse_xml(xml), Err(XmlError::UnknownEntity(_))),
                "accepted: {xml:?}"
            );
        }
    }

    #[test]
    fn test_accepts_legal_char_refs() {
        // Arrange
        let xml = "<a>&#9;&#x1F600;&#233;</a>";

        // Act
        let value = parse_xml(xml).unwrap();

        // Assert
        assert_eq!(value.get("a").unwrap().as_text(), Some("\t\u{1F600}\u{e9}"));
    }
}
