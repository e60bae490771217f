//! Owned element tree built from a scraper parse.
//!
//! Each element is classified once while the tree is copied, so the
//! renderers match on [`ElementKind`] instead of re-reading tag names.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Heading(u8),
    Pre,
    Code,
    Image,
    Table,
    TableRow,
    TableCell { header: bool },
    /// `p` and `div`, the blocks whose text is emitted as prose.
    Block,
    Container,
}

impl ElementKind {
    pub fn is_code(self) -> bool {
        matches!(self, ElementKind::Pre | ElementKind::Code)
    }
}

/// Structural classification by tag name.
pub fn classify(tag: &str) -> ElementKind {
    match tag {
        "h1" => ElementKind::Heading(1),
        "h2" => ElementKind::Heading(2),
        "h3" => ElementKind::Heading(3),
        "h4" => ElementKind::Heading(4),
        "h5" => ElementKind::Heading(5),
        "h6" => ElementKind::Heading(6),
        "pre" => ElementKind::Pre,
        "code" => ElementKind::Code,
        "img" => ElementKind::Image,
        "table" => ElementKind::Table,
        "tr" => ElementKind::TableRow,
        "th" => ElementKind::TableCell { header: true },
        "td" => ElementKind::TableCell { header: false },
        "p" | "div" => ElementKind::Block,
        _ => ElementKind::Container,
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    kind: ElementKind,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        Self {
            kind: classify(&tag),
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Descendants paired with their direct parent.
    pub fn descendants_with_parent(&self) -> impl Iterator<Item = (&Element, &Element)> {
        let mut stack: Vec<(&Element, &Element)> =
            self.child_elements().map(|child| (child, self)).collect();
        stack.reverse();
        std::iter::from_fn(move || {
            let (element, parent) = stack.pop()?;
            let start = stack.len();
            stack.extend(element.child_elements().map(|child| (child, element)));
            stack[start..].reverse();
            Some((element, parent))
        })
    }

    pub fn find_all(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.descendants().filter(move |e| e.kind == kind)
    }

    pub fn contains_any(&self, pred: impl Fn(ElementKind) -> bool) -> bool {
        self.descendants().any(|e| pred(e.kind))
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => stack.extend(element.children.iter().rev()),
            }
        }
        out
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.child_elements());
        self.stack[start..].reverse();
        Some(element)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a whole HTML document. Nesting past `max_depth` is rejected.
    pub fn parse(html: &str, max_depth: usize) -> Result<Self> {
        let parsed = Html::parse_document(html);
        let root = copy_element(parsed.root_element(), 0, max_depth)?;
        Ok(Self { root })
    }

    pub fn from_root(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn body(&self) -> Option<&Element> {
        if self.root.tag == "body" {
            return Some(&self.root);
        }
        self.root.descendants().find(|e| e.tag == "body")
    }

    pub fn title(&self) -> Option<String> {
        self.root
            .descendants()
            .find(|e| e.tag == "title")
            .map(|e| e.text().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn copy_element(source: ElementRef, depth: usize, max_depth: usize) -> Result<Element> {
    if depth > max_depth {
        return Err(ConvertError::ParseFailure(format!(
            "element nesting exceeds {max_depth} levels"
        )));
    }

    let value = source.value();
    let mut element = Element::new(value.name());
    element.attrs = value
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    for child in source.children() {
        match child.value() {
            ScraperNode::Text(text) => element.children.push(Node::Text(text.text.to_string())),
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    element
                        .children
                        .push(Node::Element(copy_element(child_element, depth + 1, max_depth)?));
                }
            }
            _ => {}
        }
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("h3"), ElementKind::Heading(3));
        assert_eq!(classify("th"), ElementKind::TableCell { header: true });
        assert_eq!(classify("div"), ElementKind::Block);
        assert_eq!(classify("span"), ElementKind::Container);
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let doc = Document::parse("<h1>a</h1><p>b <em>c</em></p><h2>d</h2>", 64).unwrap();
        let body = doc.body().unwrap();
        let tags: Vec<&str> = body.descendants().map(|e| e.tag()).collect();
        assert_eq!(tags, ["h1", "p", "em", "h2"]);
        assert_eq!(body.text(), "ab cd");
    }

    #[test]
    fn test_title() {
        let doc = Document::parse("<title> Run 42 </title><p>x</p>", 64).unwrap();
        assert_eq!(doc.title().as_deref(), Some("Run 42"));
    }

    #[test]
    fn test_parent_tracking() {
        let doc = Document::parse("<pre><code>x</code></pre><code>y</code>", 64).unwrap();
        let pairs: Vec<(&str, &str)> = doc
            .body()
            .unwrap()
            .descendants_with_parent()
            .map(|(e, p)| (e.tag(), p.tag()))
            .collect();
        assert_eq!(pairs, [("pre", "body"), ("code", "pre"), ("code", "body")]);
    }

    #[test]
    fn test_nesting_limit() {
        let html = "<div>".repeat(40);
        let err = Document::parse(&html, 10).unwrap_err();
        assert!(matches!(err, ConvertError::ParseFailure(_)));
    }
}
