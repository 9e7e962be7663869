//! TCAP Information Element
//!
//! An [`Ie`] is one TLV node. Constructed elements may carry a parsed view
//! of their nested elements in [`Ie::children`]; the raw value bytes are
//! kept either way.

use crate::ber::encoder::BerEncoder;
use crate::ber::types::{Tag, TagForm};
use bytes::Bytes;
use serde::Serialize;
use std::fmt::{self, Write as _};

/// General structure of a TCAP Information Element
///
/// # Invariants
///
/// `length() == value().len()` for every element observable outside this
/// crate. The length is derived from the value on construction and there
/// is no API to change either afterwards.
///
/// # Buffer Sharing
///
/// Values are [`Bytes`] views. Elements parsed from a `Bytes` buffer share
/// its storage without copying; the storage stays alive as long as any
/// element references it and cannot be mutated underneath them.
///
/// # Truncated Elements
///
/// The lenient recursive parser may meet an element whose declared length
/// runs past the end of its enclosing buffer. It records such an element
/// with an empty value and keeps the declared length aside, see
/// [`Ie::is_truncated`] and [`Ie::declared_length`].
#[derive(Debug, Clone, Serialize)]
pub struct Ie {
    tag: Tag,
    length: usize,
    #[serde(serialize_with = "serialize_hex")]
    value: Bytes,
    #[serde(rename = "ie", skip_serializing_if = "Vec::is_empty")]
    children: Vec<Ie>,
    /// Bytes occupied in the source buffer, header included
    #[serde(skip)]
    wire_len: usize,
    /// Declared length of a truncated element
    #[serde(skip_serializing_if = "Option::is_none")]
    truncated: Option<usize>,
}

impl Ie {
    /// Create a new IE from a tag and its value bytes
    ///
    /// The length is derived from `value`.
    pub fn new(tag: Tag, value: impl Into<Bytes>) -> Self {
        let mut ie = Self {
            tag,
            length: 0,
            value: value.into(),
            children: Vec::new(),
            wire_len: 0,
            truncated: None,
        };
        ie.set_length();
        ie
    }

    /// Create a constructed IE whose value is the encoding of `children`
    ///
    /// The children are kept as the parsed view, so the element looks the
    /// same as one produced by the recursive parser. The form bit of `tag`
    /// is forced to constructed; class and code are kept.
    pub fn with_children(tag: Tag, children: Vec<Ie>) -> Self {
        let tag = Tag::new(tag.class(), TagForm::Constructed, tag.code());
        let mut encoder = BerEncoder::with_capacity(children.iter().map(Ie::marshal_len).sum());
        for child in &children {
            encoder.encode_ie(child);
        }
        let mut ie = Self::new(tag, encoder.into_bytes());
        ie.children = children;
        ie
    }

    /// Element sliced out of a parsed buffer
    pub(crate) fn from_wire(tag: Tag, value: Bytes, wire_len: usize) -> Self {
        let mut ie = Self::new(tag, value);
        ie.wire_len = wire_len;
        ie
    }

    /// Element whose declared length overran the parsed buffer
    pub(crate) fn truncated(tag: Tag, declared: usize, wire_len: usize) -> Self {
        let mut ie = Self::new(tag, Bytes::new());
        ie.wire_len = wire_len;
        ie.truncated = Some(declared);
        ie
    }

    pub(crate) fn set_children(&mut self, children: Vec<Ie>) {
        self.children = children;
    }

    /// Re-derive the length field from the value
    fn set_length(&mut self) {
        self.length = self.value.len();
        self.wire_len = self.marshal_len();
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Length of the value in bytes
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Nested elements found by the recursive parser
    pub fn children(&self) -> &[Ie] {
        &self.children
    }

    pub fn is_constructed(&self) -> bool {
        self.tag.is_constructed()
    }

    /// Check whether the declared length overran the buffer during parsing
    pub fn is_truncated(&self) -> bool {
        self.truncated.is_some()
    }

    /// Length announced by the wire header
    ///
    /// Equal to [`Ie::length`] unless the element is truncated.
    pub fn declared_length(&self) -> usize {
        self.truncated.unwrap_or(self.length)
    }

    /// Number of bytes the element occupied in the buffer it was parsed from
    ///
    /// For elements built in memory, and for parsed elements with a
    /// minimal length header, this equals [`Ie::marshal_len`]. It differs
    /// for non-minimal long-form headers and for truncated elements.
    pub fn wire_len(&self) -> usize {
        self.wire_len
    }

    /// Render the element and its children as an indented tree
    ///
    /// For diagnostics only; this is not a wire format.
    pub fn render_tree(&self) -> String {
        Tree(self).to_string()
    }

    fn render_into<W: fmt::Write>(&self, out: &mut W, depth: usize) -> fmt::Result {
        let tag = self.tag;
        write!(
            out,
            "{:indent$}{} ({}, {}, {}) len={}",
            "",
            tag,
            tag.class(),
            tag.form(),
            tag.code(),
            self.length,
            indent = depth * 2
        )?;
        if let Some(declared) = self.truncated {
            write!(out, " truncated(declared={})", declared)?;
        }
        if self.children.is_empty() && !self.value.is_empty() {
            write!(out, " value={}", Hex(&self.value))?;
        }
        out.write_char('\n')?;
        for child in &self.children {
            child.render_into(out, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented tree view of an element, see [`Ie::render_tree`]
struct Tree<'a>(&'a Ie);

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render_into(f, 0)
    }
}

/// Elements compare by content; where they were parsed from is ignored
impl PartialEq for Ie {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.length == other.length
            && self.value == other.value
            && self.children == other.children
            && self.truncated == other.truncated
    }
}

impl Eq for Ie {}

impl fmt::Display for Ie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Tag: {}, Length: {}, Value: {}, IE: [",
            self.tag,
            self.length,
            Hex(&self.value)
        )?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str("]}")
    }
}

/// Lowercase hex rendering of a byte slice
struct Hex<'a>(&'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

fn serialize_hex<S: serde::Serializer>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&Hex(value))
}
