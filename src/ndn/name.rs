use bytes::Bytes;
use std::fmt::{self, Write};
use std::str::FromStr;
use thiserror::Error;

/// TLV type of a plain (generic) name component.
pub const GENERIC_COMPONENT: u64 = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Invalid percent escape in component: {0}")]
    InvalidEscape(String),

    #[error("Invalid name component: {0}")]
    InvalidComponent(String),
}

/// One component of a hierarchical name: a TLV type plus opaque bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Component {
    kind: u64,
    value: Bytes,
}

impl Component {
    /// Generic component holding `value`.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self::typed(GENERIC_COMPONENT, value)
    }

    pub fn typed(kind: u64, value: impl Into<Bytes>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> u64 {
        self.kind
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The component's bytes as text, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    /// NDN URI form of this component.
    pub fn to_escaped(&self) -> String {
        let mut out = String::with_capacity(self.value.len());
        if self.kind != GENERIC_COMPONENT {
            let _ = write!(out, "{}=", self.kind);
        }
        escape_into(&mut out, &self.value);
        out
    }

    /// Parse one URI path segment (without slashes).
    pub fn from_escaped(segment: &str) -> Result<Self, NameError> {
        let (kind, text) = match segment.split_once('=') {
            Some((kind, text)) if !kind.is_empty() && kind.bytes().all(|b| b.is_ascii_digit()) => {
                let kind = kind
                    .parse::<u64>()
                    .map_err(|_| NameError::InvalidComponent(segment.to_string()))?;
                (kind, text)
            }
            _ => (GENERIC_COMPONENT, segment),
        };

        let mut value = unescape(text)?;
        if !value.is_empty() && value.iter().all(|&b| b == b'.') {
            // "..." is the empty component, "...." a single period, and so on
            if value.len() < 3 {
                return Err(NameError::InvalidComponent(segment.to_string()));
            }
            value.truncate(value.len() - 3);
        }
        Ok(Self::typed(kind, value))
    }
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Component::new(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Component::new(Bytes::from(value.into_bytes()))
    }
}

impl From<&[u8]> for Component {
    fn from(value: &[u8]) -> Self {
        Component::new(Bytes::copy_from_slice(value))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_escaped())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.to_escaped())
    }
}

fn escape_into(out: &mut String, value: &[u8]) {
    if value.iter().all(|&b| b == b'.') {
        out.push_str("...");
        out.extend(value.iter().map(|_| '.'));
        return;
    }
    for &b in value {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
    }
}

fn unescape(text: &str) -> Result<Vec<u8>, NameError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| NameError::InvalidEscape(text.to_string()))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Hierarchical name: an ordered sequence of components.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// The empty (root) name, `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an NDN URI such as `/ndn/ucla.edu/%C1.M.K`. An `ndn:` scheme
    /// prefix is accepted; empty path segments are skipped.
    pub fn from_uri(uri: &str) -> Result<Self, NameError> {
        let path = uri.strip_prefix("ndn:").unwrap_or(uri);
        let components = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(Component::from_escaped)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    pub fn to_uri(&self) -> String {
        if self.components.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for component in &self.components {
            out.push('/');
            out.push_str(&component.to_escaped());
        }
        out
    }

    /// Builder-style append of one component.
    pub fn append(mut self, component: impl Into<Component>) -> Self {
        self.components.push(component.into());
        self
    }

    /// Builder-style append of every component of `other`.
    pub fn append_name(mut self, other: &Name) -> Self {
        self.components.extend(other.components.iter().cloned());
        self
    }

    pub fn push(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// First `len` components.
    pub fn prefix(&self, len: usize) -> Name {
        Name {
            components: self.components[..len.min(self.components.len())].to_vec(),
        }
    }

    /// True if every component of `self` matches the start of `other`.
    /// The empty name is a prefix of every name.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.components.len() <= other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| a == b)
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::from_uri(s)
    }
}

impl FromIterator<Component> for Name {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Name {
            components: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.to_uri())
    }
}

/// Convert a dotted DNS name to a hierarchical name: labels are reversed and
/// empty labels skipped, so `www.ucla.edu.` becomes `/edu/ucla/www`.
pub fn ndnify(dns_name: &str) -> Name {
    dns_name
        .split('.')
        .rev()
        .filter(|label| !label.is_empty())
        .map(Component::from)
        .collect()
}

/// Convert a hierarchical name to a dotted string, components in order, each
/// followed by a dot. The empty name becomes the empty string.
pub fn dnsify(name: &Name) -> String {
    let mut out = String::new();
    for component in name.components() {
        out.push_str(&component.to_escaped());
        out.push('.');
    }
    out
}

fn is_root(zone: &str) -> bool {
    zone.is_empty() || zone == "."
}

/// Strip `zone` from the end of `dname` when it is a suffix on a label
/// boundary; otherwise return `dname` unchanged.
pub fn relativize<'a>(dname: &'a str, zone: &str) -> &'a str {
    if is_root(zone) {
        return dname;
    }
    if dname == zone {
        return "";
    }
    match dname.strip_suffix(zone) {
        Some(rest) if rest.ends_with('.') => rest,
        _ => dname,
    }
}

/// Inverse of [`relativize`]: place a relative name back under `zone`.
pub fn qualify(relative: &str, zone: &str) -> String {
    if is_root(zone) {
        return relative.to_string();
    }
    if relative.is_empty() {
        return zone.to_string();
    }
    if relative.ends_with('.') {
        format!("{}{}", relative, zone)
    } else {
        format!("{}.{}", relative, zone)
    }
}
