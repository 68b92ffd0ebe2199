//! Minimal element tree over quick-xml events.
//!
//! Legacy files are small, so both parsers work on an in-memory tree instead
//! of driving the event reader themselves.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{PackError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated direct text content
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First present attribute among several accepted spellings
    pub fn attr_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.attr(k))
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child among several accepted names
    pub fn child_text_any(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|n| self.child(n))
            .map(|c| c.text.as_str())
    }

    /// Child element text, falling back to an attribute of the same name.
    ///
    /// Legacy files are inconsistent about which of the two they use for
    /// topic names and sounds.
    pub fn value_any(&self, names: &[&str]) -> Option<&str> {
        self.child_text_any(names).or_else(|| self.attr_any(names))
    }

    /// Item elements, either wrapped in a `container` child
    /// (`<phrases><phrase/></phrases>`) or placed directly under this element
    pub fn items<'a>(&'a self, container: &str, names: &[&str]) -> Vec<&'a XmlElement> {
        let is_item = |el: &&XmlElement| names.contains(&el.name.as_str());
        let wrapped = self
            .children
            .iter()
            .filter(|c| c.name == container)
            .flat_map(|c| c.children.iter().filter(is_item));
        let direct = self.children.iter().filter(is_item);
        wrapped.chain(direct).collect()
    }

    /// This element if it has the given name, otherwise matching children
    pub fn self_or_children<'a>(&'a self, names: &'a [&'a str]) -> Vec<&'a XmlElement> {
        if names.contains(&self.name.as_str()) {
            vec![self]
        } else {
            self.children
                .iter()
                .filter(|c| names.contains(&c.name.as_str()))
                .collect()
        }
    }
}

/// Read and parse a legacy XML file
pub fn parse_file(path: &Path) -> Result<XmlElement> {
    let content = std::fs::read_to_string(path).map_err(|source| PackError::LegacyRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_str(&content).map_err(|message| PackError::parse(path, message))
}

/// Parse a document into its root element
pub fn parse_str(content: &str) -> std::result::Result<XmlElement, String> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element(&start)?),
            Ok(Event::Empty(start)) => {
                let el = element(&start)?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(Event::End(_)) => {
                let el = stack.pop().ok_or("unexpected closing tag")?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                let bytes = data.into_inner();
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "at byte {}: {}",
                    reader.error_position(),
                    e
                ))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn element(start: &BytesStart<'_>) -> std::result::Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(el);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        None => Err(format!("second root element <{}>", el.name)),
    }
}
