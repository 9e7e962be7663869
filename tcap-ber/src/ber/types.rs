//! BER encoding types (Tag, Length)

use bytes::BufMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use tcap_core::{TcapError, TcapResult};

/// Largest number of long-form length octets accepted by the decoder.
///
/// The decoded length is accumulated into 32 bits.
pub const MAX_LENGTH_OCTETS: usize = 4;

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **ApplicationWide**: Application-wide types (TCAP message types)
/// - **ContextSpecific**: Context-dependent types (used in SEQUENCE/SET)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application-wide class (01)
    ApplicationWide = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl TagClass {
    /// Get tag class from the two low bits of `bits`
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => TagClass::Universal,
            1 => TagClass::ApplicationWide,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    /// Convert tag class to its position in the tag byte
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagClass::Universal => "universal",
            TagClass::ApplicationWide => "application",
            TagClass::ContextSpecific => "context-specific",
            TagClass::Private => "private",
        };
        f.write_str(name)
    }
}

/// Primitive/Constructed flag of a tag (bit 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagForm {
    /// The value is the literal content
    Primitive = 0,
    /// The value is a sequence of nested elements
    Constructed = 1,
}

impl TagForm {
    /// Get form from the low bit of `bit`
    pub fn from_bit(bit: u8) -> Self {
        if bit & 0x01 == 0 {
            TagForm::Primitive
        } else {
            TagForm::Constructed
        }
    }

    /// Convert form to its position in the tag byte
    pub fn to_bits(self) -> u8 {
        (self as u8) << 5
    }
}

impl fmt::Display for TagForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagForm::Primitive => f.write_str("primitive"),
            TagForm::Constructed => f.write_str("constructed"),
        }
    }
}

/// Single-byte TCAP tag
///
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C F T T T T T
/// ```
/// Where:
/// - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
/// - F = Primitive (0) or Constructed (1)
/// - TTTTT = Tag code (0-31)
///
/// A tag is immutable once built. High tag numbers (the multi-byte form)
/// are not decoded: a code of 31 is just another 5-bit code here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(u8);

impl Tag {
    /// Pack a tag from its sub-fields
    ///
    /// `code` must be in `0..=31`. Larger values are truncated to their
    /// low 5 bits, which yields a different tag than the caller intended.
    pub fn new(class: TagClass, form: TagForm, code: u8) -> Self {
        Tag(class.to_bits() | form.to_bits() | (code & 0x1F))
    }

    /// Pack a tag from raw integer sub-fields
    ///
    /// Preconditions: `class` in `0..=3`, `form` in `0..=1`, `code` in
    /// `0..=31`. Each field is masked to its width, so out-of-range input
    /// gives a truncated tag rather than an error.
    pub fn from_fields(class: u8, form: u8, code: u8) -> Self {
        Self::new(TagClass::from_bits(class), TagForm::from_bit(form), code)
    }

    /// Create a Universal class primitive tag
    pub fn universal_primitive(code: u8) -> Self {
        Self::new(TagClass::Universal, TagForm::Primitive, code)
    }

    /// Create a Universal class constructed tag
    pub fn universal_constructed(code: u8) -> Self {
        Self::new(TagClass::Universal, TagForm::Constructed, code)
    }

    /// Create an Application class primitive tag
    pub fn application_primitive(code: u8) -> Self {
        Self::new(TagClass::ApplicationWide, TagForm::Primitive, code)
    }

    /// Create an Application class constructed tag
    pub fn application_constructed(code: u8) -> Self {
        Self::new(TagClass::ApplicationWide, TagForm::Constructed, code)
    }

    /// Create a Context-specific class primitive tag
    pub fn context_specific_primitive(code: u8) -> Self {
        Self::new(TagClass::ContextSpecific, TagForm::Primitive, code)
    }

    /// Create a Context-specific class constructed tag
    pub fn context_specific_constructed(code: u8) -> Self {
        Self::new(TagClass::ContextSpecific, TagForm::Constructed, code)
    }

    /// Create a Private class primitive tag
    pub fn private_primitive(code: u8) -> Self {
        Self::new(TagClass::Private, TagForm::Primitive, code)
    }

    /// Create a Private class constructed tag
    pub fn private_constructed(code: u8) -> Self {
        Self::new(TagClass::Private, TagForm::Constructed, code)
    }

    /// Get tag class (bits 8-7)
    pub fn class(&self) -> TagClass {
        TagClass::from_bits(self.0 >> 6)
    }

    /// Get tag form (bit 6)
    pub fn form(&self) -> TagForm {
        TagForm::from_bit(self.0 >> 5)
    }

    /// Get tag code (bits 5-1)
    pub fn code(&self) -> u8 {
        self.0 & 0x1F
    }

    /// Check if the tag marks a constructed element
    pub fn is_constructed(&self) -> bool {
        self.form() == TagForm::Constructed
    }

    /// Get the encoded tag byte
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        Tag(value)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::LowerHex for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// BER Length encoding
///
/// BER length can be encoded in two forms:
/// - **Short form**: For lengths 0-127 (1 byte)
/// - **Long form**: For lengths > 127 (header byte + 1-4 length bytes)
///
/// # Encoding Format
///
/// Short form:
/// ```text
/// Byte: 0 L L L L L L L
/// ```
/// Where L = length value (0-127)
///
/// Long form:
/// ```text
/// First byte:  1 N N N N N N N  (N = number of length bytes)
/// Following bytes: L L L L L L L L  (big-endian length value)
/// ```
///
/// The long form always uses the minimal number of length bytes. A header
/// byte of exactly `0x80` announces the indefinite form, which is not
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    /// Short form: length 0-127
    Short(u8),
    /// Long form: length > 127, encoded with length-of-length
    Long(usize),
}

impl BerLength {
    /// Create a new BER length
    ///
    /// Automatically chooses short or long form based on the length value.
    pub fn new(length: usize) -> Self {
        if length < 128 {
            BerLength::Short(length as u8)
        } else {
            BerLength::Long(length)
        }
    }

    /// Get the length value
    pub fn value(&self) -> usize {
        match self {
            BerLength::Short(l) => *l as usize,
            BerLength::Long(l) => *l,
        }
    }

    /// Number of big-endian bytes following the long-form header byte
    fn octet_count(length: usize) -> usize {
        let bits = (usize::BITS - length.leading_zeros()) as usize;
        bits.div_ceil(8).max(1)
    }

    /// Number of bytes `encode` produces, computed without encoding
    pub fn encoded_len(&self) -> usize {
        match self.value() {
            0..=127 => 1,
            length => 1 + Self::octet_count(length),
        }
    }

    /// Append the length header to `buf`
    ///
    /// The form follows the value, not the variant: `Short(200)` and
    /// `Long(5)` encode exactly as `BerLength::new(200)` and
    /// `BerLength::new(5)` do.
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        let length = self.value();
        if length < 128 {
            buf.put_u8(length as u8);
        } else {
            let num_bytes = Self::octet_count(length);
            buf.put_u8(0x80 | num_bytes as u8);
            buf.put_uint(length as u64, num_bytes);
        }
    }

    /// Encode length to bytes
    ///
    /// # Returns
    /// Encoded length bytes (1 byte for short form, 2-9 bytes for long form)
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut result);
        result
    }

    /// Decode length from bytes, starting at the length header
    ///
    /// # Returns
    /// Returns `Ok((BerLength, bytes_consumed))` if successful, `Err` otherwise
    ///
    /// # Error Handling
    /// Returns error if:
    /// - Buffer is too short for the header or its length bytes
    /// - The header announces the indefinite form (`0x80`)
    /// - The header announces more than [`MAX_LENGTH_OCTETS`] length bytes
    pub fn decode(data: &[u8]) -> TcapResult<(Self, usize)> {
        let Some(&first_byte) = data.first() else {
            return Err(TcapError::truncated(1, 0));
        };

        if (first_byte & 0x80) == 0 {
            return Ok((BerLength::Short(first_byte), 1));
        }

        let num_bytes = (first_byte & 0x7F) as usize;

        if num_bytes == 0 {
            return Err(TcapError::UnsupportedEncoding(
                "indefinite length not supported".to_string(),
            ));
        }

        if num_bytes > MAX_LENGTH_OCTETS {
            return Err(TcapError::UnsupportedEncoding(format!(
                "long-form length uses {} bytes (max {})",
                num_bytes, MAX_LENGTH_OCTETS
            )));
        }

        let Some(octets) = data.get(1..1 + num_bytes) else {
            return Err(TcapError::truncated(1 + num_bytes, data.len()));
        };

        let length = octets
            .iter()
            .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);

        Ok((BerLength::Long(length as usize), 1 + num_bytes))
    }
}

/// Decode the length of the element starting at `b[0]`
///
/// The tag occupies `b[0]` and the length header starts at `b[1]`.
///
/// # Returns
/// `(length, header_bytes_consumed)`, where the consumed count covers the
/// header byte and any long-form length bytes but not the tag.
pub fn decode_element_length(b: &[u8]) -> TcapResult<(usize, usize)> {
    if b.len() < 2 {
        return Err(TcapError::truncated(2, b.len()));
    }
    let (length, consumed) = BerLength::decode(&b[1..]).map_err(|err| match err {
        // Report sizes relative to the whole element
        TcapError::TruncatedBuffer { needed, available } => {
            TcapError::truncated(needed + 1, available + 1)
        }
        other => other,
    })?;
    Ok((length.value(), consumed))
}
