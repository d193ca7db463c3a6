//! Project document model
//!
//! A `ProjectDocument` is the element tree of a generated project file. Nodes keep the
//! raw source text they were parsed from, so serializing a document reproduces every
//! region that was not modified byte-for-byte. Only elements that were created or
//! reopened during rewriting are rendered from their parts.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};

use crate::schema::QualifiedName;

/// Indentation step used by generated project files
const INDENT: &str = "  ";

/// A node inside an element or at document level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element
    Element(Element),
    /// Character data, stored escaped exactly as it appeared in the source
    Text(String),
    /// The content of a CDATA section
    CData(String),
    /// Comments, processing instructions and doctype declarations, kept verbatim
    Markup(String),
}

impl Node {
    fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(raw) if raw.chars().all(char::is_whitespace))
    }
}

/// An attribute with its unescaped value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name as written, including any prefix
    pub name: String,
    /// The unescaped value
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element of the project tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) prefix: Option<String>,
    pub(crate) local_name: String,
    /// Namespace the element name resolves to
    pub(crate) namespace: Option<String>,
    /// Default namespace in scope for unprefixed children
    pub(crate) default_namespace: Option<String>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<Node>,
    /// Source text of the start tag, `None` once the element must be re-rendered
    pub(crate) start_tag: Option<String>,
    /// Source text of the end tag
    pub(crate) end_tag: Option<String>,
}

/// Position of an element as child indices from the root element
pub type ElementPath = Vec<usize>;

impl Element {
    /// Create an unprefixed element with no namespace
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
            namespace: None,
            default_namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
            start_tag: None,
            end_tag: None,
        }
    }

    /// The element name as written, e.g. `msb:PropertyGroup`
    pub fn name(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.local_name)),
            None => Cow::Borrowed(&self.local_name),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether the element's expanded name equals `name`
    pub fn is(&self, name: &QualifiedName) -> bool {
        self.local_name == name.local && self.namespace.as_deref() == name.namespace()
    }

    /// Look up an attribute by its name as written
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements in document order
    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// The concatenated, unescaped character data of this element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Replace all content with a single text node
    pub fn set_text(&mut self, value: &str) {
        self.open();
        self.children = vec![Node::Text(escape(value).into_owned())];
    }

    /// Create an element that can be appended to this one and lands in `namespace`
    ///
    /// The child inherits this element's default namespace when it matches, reuses
    /// this element's prefix when that prefix is bound to `namespace`, and declares
    /// its own default namespace otherwise.
    pub fn new_child(&self, local_name: &str, namespace: Option<&str>) -> Element {
        let mut child = Element::new(local_name);
        child.namespace = namespace.map(str::to_string);
        child.default_namespace = self.default_namespace.clone();

        if self.default_namespace.as_deref() == namespace {
            return child;
        }
        if self.prefix.is_some() && self.namespace.as_deref() == namespace {
            child.prefix = self.prefix.clone();
            return child;
        }

        child
            .attributes
            .push(Attribute::new("xmlns", namespace.unwrap_or_default()));
        child.default_namespace = namespace.map(str::to_string);
        child
    }

    /// Append a child element, indented like the existing children
    pub fn append_child(&mut self, child: Element) {
        self.open();

        let indent = self.child_indent();
        let closing = match self.children.last() {
            Some(Node::Text(raw)) if raw.chars().all(char::is_whitespace) => Some(raw.clone()),
            _ => None,
        };
        if closing.is_some() {
            self.children.pop();
        }

        // Without a sibling to copy from, nest one level deeper than the end tag
        let indent = indent.or_else(|| closing.as_ref().map(|raw| format!("{}{}", raw, INDENT)));
        if let Some(indent) = indent {
            self.children.push(Node::Text(indent));
        }
        self.children.push(Node::Element(child));
        if let Some(closing) = closing {
            self.children.push(Node::Text(closing));
        }
    }

    /// Whitespace in front of the first child element
    fn child_indent(&self) -> Option<String> {
        let first = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(_)))?;
        match first.checked_sub(1).map(|i| &self.children[i]) {
            Some(Node::Text(raw)) if raw.chars().all(char::is_whitespace) => Some(raw.clone()),
            _ => None,
        }
    }

    /// Turn a self-closing start tag into an opening one so content can be added
    fn open(&mut self) {
        if let Some(tag) = &self.start_tag {
            if let Some(head) = tag.strip_suffix("/>") {
                self.start_tag = Some(format!("{}>", head.trim_end()));
            }
        }
    }

    fn is_self_closing(&self) -> bool {
        match &self.start_tag {
            Some(tag) => tag.ends_with("/>"),
            None => self.children.is_empty(),
        }
    }

    fn write_to(&self, out: &mut String) {
        match &self.start_tag {
            Some(tag) => out.push_str(tag),
            None => {
                out.push('<');
                out.push_str(&self.name());
                for attr in &self.attributes {
                    write_attribute(attr, out);
                }
                out.push_str(if self.children.is_empty() { " />" } else { ">" });
            }
        }

        if self.is_self_closing() {
            return;
        }

        for child in &self.children {
            write_node(child, out);
        }

        match &self.end_tag {
            Some(tag) => out.push_str(tag),
            None => {
                out.push_str("</");
                out.push_str(&self.name());
                out.push('>');
            }
        }
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(raw) => match unescape(raw) {
                Ok(text) => out.push_str(&text),
                Err(_) => out.push_str(raw),
            },
            Node::CData(content) => out.push_str(content),
            Node::Element(el) => collect_text(el, out),
            Node::Markup(_) => {}
        }
    }
}

fn write_attribute(attr: &Attribute, out: &mut String) {
    out.push(' ');
    out.push_str(&attr.name);
    out.push_str("=\"");
    out.push_str(&escape(&attr.value));
    out.push('"');
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(el) => el.write_to(out),
        Node::Text(raw) | Node::Markup(raw) => out.push_str(raw),
        Node::CData(content) => {
            out.push_str("<![CDATA[");
            out.push_str(content);
            out.push_str("]]>");
        }
    }
}

/// A parsed project file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDocument {
    /// The `<?xml ...?>` declaration as written
    pub(crate) declaration: Option<String>,
    /// Nodes between the declaration and the root element
    pub(crate) prolog: Vec<Node>,
    pub(crate) root: Element,
    /// Nodes after the root element
    pub(crate) epilog: Vec<Node>,
}

impl ProjectDocument {
    /// Parse project text into a document
    pub fn parse(text: &str) -> Result<Self, crate::error::ParseError> {
        crate::parser::parse_project(text)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The namespace declared by the root's `xmlns` attribute
    ///
    /// An empty declaration means no namespace.
    pub fn root_namespace(&self) -> Option<&str> {
        self.root.attribute("xmlns").filter(|ns| !ns.is_empty())
    }

    /// All elements in document order, starting with the root
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![&self.root],
        }
    }

    /// Elements with the given expanded name in document order
    pub fn elements_named<'a>(
        &'a self,
        name: &'a QualifiedName,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |el| el.is(name))
    }

    /// Paths of elements with the given expanded name in document order
    pub fn paths_of(&self, name: &QualifiedName) -> Vec<ElementPath> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        collect_paths(&self.root, name, &mut current, &mut paths);
        paths
    }

    pub fn element(&self, path: &[usize]) -> Option<&Element> {
        let mut element = &self.root;
        for &index in path {
            element = match element.children.get(index)? {
                Node::Element(el) => el,
                _ => return None,
            };
        }
        Some(element)
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut element = &mut self.root;
        for &index in path {
            element = match element.children.get_mut(index)? {
                Node::Element(el) => el,
                _ => return None,
            };
        }
        Some(element)
    }

    /// Render the document
    ///
    /// A declaration is written first and followed by `line_ending`; whitespace that
    /// separated it from the rest of the document is replaced by that separator.
    pub fn serialize(&self, line_ending: &str) -> String {
        let mut out = String::new();

        let mut prolog = self.prolog.as_slice();
        if let Some(declaration) = &self.declaration {
            out.push_str(declaration);
            out.push_str(line_ending);
            while let Some((first, rest)) = prolog.split_first() {
                if !first.is_whitespace() {
                    break;
                }
                prolog = rest;
            }
        }

        for node in prolog {
            write_node(node, &mut out);
        }
        self.root.write_to(&mut out);
        for node in &self.epilog {
            write_node(node, &mut out);
        }
        out
    }
}

fn collect_paths(
    element: &Element,
    name: &QualifiedName,
    current: &mut ElementPath,
    out: &mut Vec<ElementPath>,
) {
    if element.is(name) {
        out.push(current.clone());
    }
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(el) = child {
            current.push(index);
            collect_paths(el, name, current, out);
            current.pop();
        }
    }
}

/// Pre-order iterator over the elements of a document
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.child_elements().rev());
        Some(element)
    }
}
