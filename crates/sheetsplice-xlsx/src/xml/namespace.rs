//! Namespace prefix bindings in scope at one element

/// The `xmlns` bindings visible at one point of a document
///
/// Each element derives its own scope from its parent's with
/// [`Namespaces::enter`], so a scope never changes once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    default: Option<String>,
    /// `(prefix, uri)` pairs, innermost declaration last
    prefixes: Vec<(String, String)>,
}

impl Namespaces {
    /// The scope inside an element carrying these (raw) attributes
    pub fn enter<'a, I>(&self, attrs: I) -> Namespaces
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut scope = self.clone();
        for (name, value) in attrs {
            if name == "xmlns" {
                scope.default = (!value.is_empty()).then(|| value.to_string());
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                scope.prefixes.retain(|(p, _)| p != prefix);
                scope
                    .prefixes
                    .push((prefix.to_string(), value.to_string()));
            }
        }
        scope
    }

    /// The URI bound to `prefix`, if any
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// The innermost prefix bound to `uri`
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .rev()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
    }

    /// Rewrite an element name to `prefix:local` using the innermost prefix
    /// bound to its namespace
    ///
    /// Unprefixed names in a default namespace that also has a prefix take
    /// that prefix; names with no resolvable namespace are returned as-is.
    pub fn element_name(&self, raw: &str) -> String {
        match raw.split_once(':') {
            Some((prefix, local)) => self.rebind(raw, prefix, local),
            None => match self.default.as_deref().and_then(|uri| self.prefix_for(uri)) {
                Some(prefix) => format!("{}:{}", prefix, raw),
                None => raw.to_string(),
            },
        }
    }

    /// Rewrite an attribute name the same way as [`Namespaces::element_name`]
    ///
    /// Unprefixed attributes belong to no namespace and are never rewritten.
    pub fn attribute_name(&self, raw: &str) -> String {
        match raw.split_once(':') {
            Some(("xmlns", _)) | None => raw.to_string(),
            Some((prefix, local)) => self.rebind(raw, prefix, local),
        }
    }

    fn rebind(&self, raw: &str, prefix: &str, local: &str) -> String {
        match self.uri(prefix).and_then(|uri| self.prefix_for(uri)) {
            Some(bound) if bound != prefix => format!("{}:{}", bound, local),
            _ => raw.to_string(),
        }
    }
}
