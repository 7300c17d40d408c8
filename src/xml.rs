//! Owned XML element tree with namespace-agnostic child lookup.
//!
//! Tags are kept in Clark notation (`{namespace-uri}local`), so the local name
//! is whatever follows the closing brace. Lookups by name compare local names
//! only, which lets the same code walk `SOAP-ENV:Body` and a bare `Body`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Parse(#[from] roxmltree::Error),
}

/// Strip any `{namespace}` prefix from a tag.
pub fn local_name(tag: &str) -> &str {
    match tag.rsplit_once('}') {
        Some((_, local)) => local,
        None => tag,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Parse a document and return its root element.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let document = roxmltree::Document::parse(text)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let name = node.tag_name();
        let tag = match name.namespace() {
            Some(namespace) => format!("{{{}}}{}", namespace, name.name()),
            None => name.name().to_string(),
        };

        Self {
            tag,
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            text: node.text().map(str::to_string),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    /// Full tag, including the namespace prefix if there is one.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text before the first child element, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// All direct children with the given local name, in document order.
    pub fn children_named(&self, name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|child| child.local_name() == name)
            .collect()
    }

    /// First direct child with the given local name.
    pub fn child_named(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.local_name() == name)
    }

    /// Follow `child_named` through each name in turn.
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names
            .iter()
            .try_fold(self, |element, name| element.child_named(name))
    }
}
