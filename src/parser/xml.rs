//! Project document parsing
//!
//! Builds a `ProjectDocument` from the event stream of `quick_xml`. Every node keeps
//! the slice of source text it was read from; namespace bindings are tracked while
//! descending so each element knows its expanded name.

use std::collections::HashMap;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{Attribute, Element, Node, ProjectDocument};
use crate::error::ParseError;

/// Namespace permanently bound to the `xml` prefix
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse project text into a document
///
/// Fails on anything that is not a well-formed document with a single root element.
/// A leading byte order mark is ignored.
pub fn parse_project(text: &str) -> Result<ProjectDocument, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_comments = true;
    let mut builder = TreeBuilder::default();

    loop {
        let start = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                let offset = reader.error_position() as usize;
                return Err(error_at(text, offset, err.to_string()));
            }
        };
        let end = reader.buffer_position() as usize;
        let raw = &text[start..end];

        let step = match event {
            Event::Decl(_) => builder.declaration(raw),
            Event::Start(e) => builder.open(&e, raw),
            Event::Empty(e) => builder.open(&e, raw).and_then(|_| builder.close(None)),
            Event::End(_) => builder.close(Some(raw)),
            Event::Text(_) => builder.text(raw),
            Event::CData(_) => builder.cdata(raw),
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {
                builder.push(Node::Markup(raw.to_string()))
            }
            Event::Eof => break,
        };
        step.map_err(|message| error_at(text, start, message))?;
    }

    builder
        .finish()
        .map_err(|message| error_at(text, text.len(), message))
}

fn error_at(text: &str, offset: usize, message: String) -> ParseError {
    let (line, column) = offset_to_line_col(text, offset);
    ParseError::new(message, line, column)
}

/// Convert a byte offset to (line, column) coordinates
fn offset_to_line_col(text: &str, offset: usize) -> (u32, u32) {
    let mut line = 0u32;
    let mut col = 0u32;

    for (i, ch) in text.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// An element whose end tag has not been read yet
struct OpenElement {
    element: Element,
    /// Prefix bindings in scope for this element's content
    prefixes: HashMap<String, String>,
}

#[derive(Default)]
struct TreeBuilder {
    declaration: Option<String>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    stack: Vec<OpenElement>,
}

impl TreeBuilder {
    fn declaration(&mut self, raw: &str) -> Result<(), String> {
        let at_start = self.prolog.is_empty() && self.root.is_none() && self.declaration.is_none();
        if !at_start {
            return Err("XML declaration is only allowed at the start of the document".to_string());
        }
        self.declaration = Some(raw.to_string());
        Ok(())
    }

    fn open(&mut self, start: &BytesStart<'_>, raw: &str) -> Result<(), String> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err("document has more than one root element".to_string());
        }

        check_start_tag(raw)?;
        let qname = start.name();
        let name = utf8(qname.as_ref())?;
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let key = utf8(attr.key.as_ref())?;
            let value = unescape(utf8(&attr.value)?).map_err(|err| err.to_string())?;
            attributes.push(Attribute::new(key, value.into_owned()));
        }

        let parent = self.stack.last();
        let mut prefixes = parent.map(|p| p.prefixes.clone()).unwrap_or_default();
        let mut default_namespace = parent.and_then(|p| p.element.default_namespace.clone());
        for attr in &attributes {
            if attr.name == "xmlns" {
                default_namespace = Some(attr.value.clone()).filter(|ns| !ns.is_empty());
            } else if let Some(prefix) = attr.name.strip_prefix("xmlns:") {
                if attr.value.is_empty() {
                    return Err(format!("namespace prefix '{}' cannot be unbound", prefix));
                }
                prefixes.insert(prefix.to_string(), attr.value.clone());
            }
        }

        let (prefix, local_name) = match name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, name),
        };
        let namespace = match prefix {
            None => default_namespace.clone(),
            Some("xml") => Some(XML_NAMESPACE.to_string()),
            Some(prefix) => match prefixes.get(prefix) {
                Some(ns) => Some(ns.clone()),
                None => return Err(format!("unbound namespace prefix '{}'", prefix)),
            },
        };

        let mut element = Element::new(local_name);
        element.prefix = prefix.map(str::to_string);
        element.namespace = namespace;
        element.default_namespace = default_namespace;
        element.attributes = attributes;
        element.start_tag = Some(raw.to_string());

        self.stack.push(OpenElement { element, prefixes });
        Ok(())
    }

    /// Close the innermost element; `end_tag` is `None` for self-closing elements
    fn close(&mut self, end_tag: Option<&str>) -> Result<(), String> {
        let Some(mut open) = self.stack.pop() else {
            return Err("end tag without a matching start tag".to_string());
        };

        if let Some(raw) = end_tag {
            let name = raw
                .trim_start_matches("</")
                .trim_end_matches('>')
                .trim_end();
            if name != open.element.name() {
                return Err(format!(
                    "expected </{}>, found {}",
                    open.element.name(),
                    raw
                ));
            }
            open.element.end_tag = Some(raw.to_string());
        }

        match self.stack.last_mut() {
            Some(parent) => parent.element.children.push(Node::Element(open.element)),
            None => self.root = Some(open.element),
        }
        Ok(())
    }

    fn text(&mut self, raw: &str) -> Result<(), String> {
        if self.stack.is_empty() && !raw.chars().all(char::is_whitespace) {
            return Err("text is not allowed outside of the root element".to_string());
        }
        if raw.contains("]]>") {
            return Err("']]>' is not allowed in character data".to_string());
        }
        unescape(raw).map_err(|err| err.to_string())?;
        self.push(Node::Text(raw.to_string()))
    }

    fn cdata(&mut self, raw: &str) -> Result<(), String> {
        if self.stack.is_empty() {
            return Err("CDATA is not allowed outside of the root element".to_string());
        }
        let content = raw
            .strip_prefix("<![CDATA[")
            .and_then(|rest| rest.strip_suffix("]]>"))
            .unwrap_or(raw);
        self.push(Node::CData(content.to_string()))
    }

    fn push(&mut self, node: Node) -> Result<(), String> {
        match self.stack.last_mut() {
            Some(open) => open.element.children.push(node),
            None if self.root.is_none() => self.prolog.push(node),
            None => self.epilog.push(node),
        }
        Ok(())
    }

    fn finish(self) -> Result<ProjectDocument, String> {
        if let Some(open) = self.stack.last() {
            return Err(format!("unclosed element <{}>", open.element.name()));
        }
        let root = self
            .root
            .ok_or_else(|| "document has no root element".to_string())?;
        Ok(ProjectDocument {
            declaration: self.declaration,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|err| err.to_string())
}

/// Check the lexical form of a start tag the reader passed through unchecked
///
/// `raw` is the whole tag, `<` through `>`. Names must be XML names, attributes must
/// be separated by whitespace and quoted values must not contain `<`.
fn check_start_tag(raw: &str) -> Result<(), String> {
    let body = raw
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| format!("malformed start tag {}", raw))?;
    let body = body.strip_suffix('/').unwrap_or(body);

    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    check_name(&body[..name_end], "element")?;

    let mut rest = &body[name_end..];
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return Ok(());
        }
        if trimmed.len() == rest.len() {
            return Err(format!("missing whitespace before attribute in {}", raw));
        }

        let (key, after_key) = trimmed
            .split_once('=')
            .ok_or_else(|| format!("attribute without a value in {}", raw))?;
        check_name(key.trim_end(), "attribute")?;

        let after_eq = after_key.trim_start();
        let quote = after_eq
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| format!("unquoted attribute value in {}", raw))?;
        let value_and_rest = &after_eq[1..];
        let close = value_and_rest
            .find(quote)
            .ok_or_else(|| format!("unterminated attribute value in {}", raw))?;
        if value_and_rest[..close].contains('<') {
            return Err(format!("'<' is not allowed in attribute values: {}", raw));
        }
        rest = &value_and_rest[close + 1..];
    }
}

fn check_name(name: &str, kind: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => is_name_start(first) && chars.all(is_name_char),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("invalid {} name '{}'", kind, name))
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_alphanumeric() || matches!(c, '-' | '.' | '\u{b7}')
}
