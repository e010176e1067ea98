//! In-memory element tree for vehicle definition documents.
//!
//! `item_defs` files are plain data trees: an element holds either
//! child elements or character data. The tree is built from quick-xml
//! events on parse and replayed through a writer on serialization, so
//! the transformer can splice and blank branches without touching the
//! catalog's raw text.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("bad attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("non UTF-8 content: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("unbalanced element nesting")]
    Unbalanced,
    #[error("document has no root element")]
    NoRoot,
    #[error("serialization failed: {0}")]
    Write(#[from] std::io::Error),
}

/// A single element: tag, attributes, character data and child elements.
///
/// Leaf text is kept verbatim, including surrounding whitespace.
/// Whitespace-only text inside branch elements is indentation and is
/// not round-tripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Element {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Parse a document into its root element.
    ///
    /// Comments, processing instructions and any XML declaration are
    /// dropped; the catalog never reads them and the game does not
    /// require them back.
    pub fn parse(xml: &str) -> Result<Element, DocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(std::str::from_utf8(&data)?);
                    }
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or(DocumentError::Unbalanced)?;
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                // Declarations, comments, doctypes and PIs carry nothing
                // the catalog or transformer reads.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(DocumentError::Unbalanced);
        }
        root.ok_or(DocumentError::NoRoot)
    }

    fn from_start(start: &BytesStart) -> Result<Element, DocumentError> {
        let mut element = Element::new(std::str::from_utf8(start.name().as_ref())?);
        for attribute in start.attributes() {
            let attribute = attribute?;
            element.attributes.push((
                std::str::from_utf8(attribute.key.as_ref())?.to_string(),
                attribute.unescape_value()?.into_owned(),
            ));
        }
        Ok(element)
    }

    /// Serialize this element and everything below it.
    pub fn to_xml(&self) -> Result<String, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| DocumentError::Encoding(e.utf8_error()))
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), DocumentError> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if !self.text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&self.text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag.as_str())))?;
        Ok(())
    }

    pub fn find_child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn find_child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                return Err(DocumentError::Unbalanced);
            }
            *root = Some(element);
        }
    }
    Ok(())
}

/// Drop the second physical line of a document.
///
/// The game's build tooling leaves a non-semantic metadata line there;
/// line 1 and lines 3+ are kept, line 2 goes unconditionally. Line
/// endings are preserved as-is.
pub fn strip_metadata_line(text: &str) -> String {
    text.split_inclusive('\n')
        .enumerate()
        .filter_map(|(i, line)| (i != 1).then_some(line))
        .collect()
}
