/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Incremental XML parsing of response bodies and the resulting document tree.
//!
//! A [`PushParser`] is fed the body chunk by chunk as it arrives. Only complete markup is
//! consumed on each feed, the unconsumed tail waits for the next chunk, so the parsed
//! tree does not depend on where the chunk boundaries fall.

use crate::rest::errors::FlickrError;
use quick_xml::errors::SyntaxError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node in an element's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds an attribute, builder style
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Appends a child element, builder style
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Appends text content, builder style
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Concatenated text of this element and its descendants
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }

    // Adjacent text is merged so split chunks produce the same tree
    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), FlickrError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to(writer)?,
                XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parses a complete document held in memory
    pub fn parse(data: &[u8]) -> Result<Self, FlickrError> {
        let mut parser = PushParser::new();
        parser.feed(data)?;
        parser.finish()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Evaluates a slash separated path from the root.
    ///
    /// `/rsp/user/@nsid` returns the `nsid` attribute of the first `user` child of `rsp`;
    /// `/rsp/user/username` returns the text of the first matching `username` element.
    pub fn find(&self, path: &str) -> Option<String> {
        let mut steps = path.strip_prefix('/')?.split('/');
        if steps.next()? != self.root.name {
            return None;
        }
        let mut current = &self.root;
        for step in steps {
            if let Some(attr) = step.strip_prefix('@') {
                return current.attr(attr).map(str::to_string);
            }
            current = current.child(step)?;
        }
        Some(current.text())
    }

    /// Serializes the document with an XML declaration and two space indentation
    pub fn to_xml(&self) -> Result<Vec<u8>, FlickrError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.root.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }
}

/// Where a [`PushParser`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Nothing received yet
    Empty,
    /// At least one chunk was consumed without error
    Accumulating,
    /// The document is complete
    Finalized,
    /// A chunk or the final document was not well-formed
    Failed,
}

/// Builds a [`Document`] from chunks delivered one at a time
#[derive(Debug)]
pub struct PushParser {
    state: ParseState,
    pending: Vec<u8>,
    total_bytes: usize,
    open: Vec<Element>,
    root: Option<Element>,
}

impl Default for PushParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PushParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Empty,
            pending: Vec::new(),
            total_bytes: 0,
            open: Vec::new(),
            root: None,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Number of bytes fed so far
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Consumes the next chunk of the document.
    ///
    /// Fails as soon as what has been received cannot be the start of a well-formed
    /// document; the parser then stays failed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), FlickrError> {
        match self.state {
            ParseState::Failed => return Err(Self::error("parser already failed")),
            ParseState::Finalized => return Err(Self::error("document already finalized")),
            ParseState::Empty | ParseState::Accumulating => {}
        }
        self.state = ParseState::Accumulating;
        self.total_bytes += chunk.len();
        self.pending.extend_from_slice(chunk);

        // Markup is only complete up to the last '>', anything after it may continue
        let Some(end) = self.pending.iter().rposition(|b| *b == b'>') else {
            return Ok(());
        };
        let result = self.consume(end + 1, false);
        self.settle(result)
    }

    /// Signals the end of the body and returns the document
    pub fn finish(mut self) -> Result<Document, FlickrError> {
        match self.state {
            ParseState::Empty => {
                return Err(Self::error("Failed to create XML DOM for document"));
            }
            ParseState::Failed => return Err(Self::error("parser already failed")),
            ParseState::Accumulating | ParseState::Finalized => {}
        }
        let len = self.pending.len();
        let result = self.consume(len, true);
        self.settle(result)?;

        if let Some(unclosed) = self.open.last() {
            self.state = ParseState::Failed;
            return Err(Self::error(&format!(
                "premature end of data in element <{}>",
                unclosed.name
            )));
        }
        match self.root.take() {
            Some(root) => {
                self.state = ParseState::Finalized;
                Ok(Document { root })
            }
            None => {
                self.state = ParseState::Failed;
                Err(Self::error("Failed to parse XML: no root element"))
            }
        }
    }

    fn settle(&mut self, result: Result<(), FlickrError>) -> Result<(), FlickrError> {
        if result.is_err() {
            self.state = ParseState::Failed;
            self.pending.clear();
        }
        result
    }

    // Reads events from pending[..limit]. An unterminated construct is left for the next
    // chunk unless this is the end of the document; any other syntax error fails at once.
    fn consume(&mut self, limit: usize, at_eof: bool) -> Result<(), FlickrError> {
        let data = std::mem::take(&mut self.pending);
        let mut reader = Reader::from_reader(&data[..limit]);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut consumed = 0;
        let result = loop {
            match reader.read_event() {
                Ok(Event::Eof) => break Ok(()),
                Ok(event) => {
                    if let Err(err) = self.apply(event) {
                        break Err(err);
                    }
                    consumed = reader.buffer_position() as usize;
                }
                Err(quick_xml::Error::Syntax(err)) if !at_eof && is_unclosed(&err) => {
                    log::debug!("Waiting for more data after {}: {}", consumed, err);
                    break Ok(());
                }
                Err(err) => break Err(Self::error(&err.to_string())),
            }
        };
        self.pending = data;
        self.pending.drain(..consumed);
        result
    }

    fn apply(&mut self, event: Event<'_>) -> Result<(), FlickrError> {
        match event {
            Event::Start(start) => {
                let element = Self::element_from(&start)?;
                self.check_can_open(&element)?;
                self.open.push(element);
            }
            Event::Empty(start) => {
                let element = Self::element_from(&start)?;
                self.check_can_open(&element)?;
                self.close(element);
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                match self.open.pop() {
                    Some(element) if element.name == name => self.close(element),
                    Some(element) => {
                        return Err(Self::error(&format!(
                            "expected </{}>, found </{}>",
                            element.name, name
                        )));
                    }
                    None => return Err(Self::error(&format!("unexpected </{}>", name))),
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| Self::error(&e.to_string()))?;
                self.text(&text)?;
            }
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                self.text(&String::from_utf8_lossy(&bytes))?;
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
            Event::Eof => {}
        }
        Ok(())
    }

    fn element_from(start: &BytesStart<'_>) -> Result<Element, FlickrError> {
        let mut element = Element::new(&String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Self::error(&e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Self::error(&e.to_string()))?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn check_can_open(&self, element: &Element) -> Result<(), FlickrError> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(Self::error(&format!(
                "extra content at the end of the document: <{}>",
                element.name
            )));
        }
        Ok(())
    }

    fn close(&mut self, element: Element) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Element(element)),
            None => self.root = Some(element),
        }
    }

    fn text(&mut self, text: &str) -> Result<(), FlickrError> {
        match self.open.last_mut() {
            Some(parent) => {
                parent.push_text(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(Self::error("text content outside of the root element")),
        }
    }

    fn error(msg: &str) -> FlickrError {
        FlickrError::XmlParse(msg.to_string())
    }
}

fn is_unclosed(err: &SyntaxError) -> bool {
    matches!(
        err,
        SyntaxError::UnclosedTag
            | SyntaxError::UnclosedComment
            | SyntaxError::UnclosedCData
            | SyntaxError::UnclosedDoctype
            | SyntaxError::UnclosedPIOrXmlDecl
    )
}
