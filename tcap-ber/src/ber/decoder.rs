//! BER decoder for TCAP Information Elements
//!
//! Two parse modes are provided:
//!
//! - **Flat** ([`Ie::parse`], [`parse_multi`], [`BerDecoder`]): strict. Any
//!   short buffer or unsupported length aborts the call. Constructed
//!   elements are not expanded.
//! - **Recursive** ([`parse_ber`], [`Ie::parse_recursive`]): constructed
//!   elements are expanded into children. Nested elements are parsed
//!   leniently: an element whose length overruns its enclosing value is
//!   kept as a truncated node, and a value that fails to parse as a
//!   sequence yields zero children. Header errors of top-level elements
//!   are still returned.
//!
//! # Usage Example
//!
//! ```rust
//! use tcap_ber::ber::{parse_ber, Tag};
//!
//! let data = [0x30, 0x07, 0x02, 0x01, 0x01, 0x04, 0x02, 0xAA, 0xBB];
//! let ies = parse_ber(&data)?;
//! assert_eq!(ies[0].children().len(), 2);
//! assert_eq!(ies[0].children()[1].tag(), Tag::universal_primitive(4));
//! # Ok::<(), tcap_ber::TcapError>(())
//! ```

use crate::ber::config::ParseConfig;
use crate::ber::ie::Ie;
use crate::ber::types::{decode_element_length, Tag};
use bytes::{Buf, Bytes};
use tcap_core::{TcapError, TcapResult};

/// Smallest element: tag byte and a short-form length of zero
pub const MIN_ELEMENT_LEN: usize = 2;

/// Flat BER decoder over a shared buffer
///
/// The decoder maintains a position that advances by the wire size of
/// each decoded element, so a concatenation of elements can be read one
/// at a time. Decoded values are views into the decoder's buffer.
pub struct BerDecoder {
    buffer: Bytes,
    position: usize,
}

impl BerDecoder {
    /// Create a new BER decoder
    ///
    /// Passing a `Bytes` shares its storage; anything else is converted
    /// into one.
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
            position: 0,
        }
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Decode the next element without expanding constructed values
    ///
    /// On error the position is left unchanged.
    pub fn decode_ie(&mut self) -> TcapResult<Ie> {
        let rest = self.buffer.slice(self.position..);
        let ie = parse_flat(&rest)?;
        self.position += ie.wire_len();
        Ok(ie)
    }

    /// Decode every remaining element, stopping at the first error
    pub fn decode_all(&mut self) -> TcapResult<Vec<Ie>> {
        let mut ies = Vec::new();
        while self.has_remaining() {
            ies.push(self.decode_ie()?);
        }
        Ok(ies)
    }
}

/// Strict single-element parse
fn parse_flat(buf: &Bytes) -> TcapResult<Ie> {
    if buf.len() < MIN_ELEMENT_LEN {
        return Err(TcapError::truncated(MIN_ELEMENT_LEN, buf.len()));
    }

    let tag = Tag::from(buf[0]);
    let (length, header_len) = decode_element_length(buf)?;
    let start = 1 + header_len;
    let end = start.saturating_add(length);
    if buf.len() < end {
        return Err(TcapError::truncated(end, buf.len()));
    }

    log::trace!("decoded element {} with {} value bytes", tag, length);
    Ok(Ie::from_wire(tag, buf.slice(start..end), end))
}

/// Lenient single-element parse at nesting level `depth`
///
/// Follows ReadTag -> ReadLength -> SliceValue -> MaybeRecurse. Only the
/// first two steps can fail.
fn parse_recursive_at(buf: &Bytes, depth: usize, config: &ParseConfig) -> TcapResult<Ie> {
    if buf.len() < MIN_ELEMENT_LEN {
        return Err(TcapError::truncated(MIN_ELEMENT_LEN, buf.len()));
    }

    let tag = Tag::from(buf[0]);
    let (length, header_len) = decode_element_length(buf)?;
    let start = 1 + header_len;
    let end = start.saturating_add(length);
    if end > buf.len() {
        log::debug!(
            "element {} declares {} value bytes but only {} remain, keeping it truncated",
            tag,
            length,
            buf.len().saturating_sub(start)
        );
        return Ok(Ie::truncated(tag, length, end));
    }

    let mut ie = Ie::from_wire(tag, buf.slice(start..end), end);
    log::trace!("decoded element {} at depth {} with {} value bytes", tag, depth, length);

    if tag.is_constructed() {
        if depth >= config.max_depth {
            log::debug!(
                "element {} at depth {} exceeds nesting limit {}, not expanding",
                tag,
                depth,
                config.max_depth
            );
        } else {
            match parse_sequence_recursive(ie.value().clone(), depth + 1, config) {
                Ok(children) => ie.set_children(children),
                Err(err) => log::debug!("nested elements of {} dropped: {}", tag, err),
            }
        }
    }

    Ok(ie)
}

/// Parse a concatenation of elements, expanding constructed ones
fn parse_sequence_recursive(
    mut buf: Bytes,
    depth: usize,
    config: &ParseConfig,
) -> TcapResult<Vec<Ie>> {
    let mut ies = Vec::new();
    while !buf.is_empty() {
        let ie = parse_recursive_at(&buf, depth, config)?;
        let consumed = cursor_advance(&ie);
        ies.push(ie);

        if consumed > buf.len() {
            log::debug!(
                "element needs {} bytes but only {} remain at depth {}, ending sequence",
                consumed,
                buf.len(),
                depth
            );
            break;
        }
        buf.advance(consumed);
    }
    Ok(ies)
}

/// Bytes to skip after a recursively parsed element
///
/// When the first child does not fill the parent's value, the children
/// are trusted over the declared length: the cursor moves past the
/// parent header plus the sum of the children. With a short-form header
/// this is the comparison of the first child's size against
/// `marshal_len() - 2`.
fn cursor_advance(ie: &Ie) -> usize {
    let Some(first) = ie.children().first() else {
        return ie.wire_len();
    };

    let header = ie.wire_len() - ie.declared_length();
    if first.wire_len() < ie.wire_len() - header {
        ie.children()
            .iter()
            .fold(header, |acc, child| acc.saturating_add(child.wire_len()))
    } else {
        ie.wire_len()
    }
}

impl Ie {
    /// Parse a single element without expanding constructed values
    ///
    /// The input is copied once; use [`Ie::parse_bytes`] to share an
    /// existing buffer instead.
    ///
    /// # Error Handling
    /// - `TruncatedBuffer` if `b` is shorter than 2 bytes or than the
    ///   declared element
    /// - `UnsupportedEncoding` for indefinite or oversized length headers
    pub fn parse(b: &[u8]) -> TcapResult<Ie> {
        Self::parse_bytes(Bytes::copy_from_slice(b))
    }

    /// Parse a single element, sharing `b` as the value storage
    pub fn parse_bytes(b: Bytes) -> TcapResult<Ie> {
        parse_flat(&b)
    }

    /// Parse a single element, expanding constructed values
    pub fn parse_recursive(b: &[u8]) -> TcapResult<Ie> {
        Self::parse_recursive_bytes(Bytes::copy_from_slice(b))
    }

    /// Parse a single element recursively, sharing `b` as the value storage
    pub fn parse_recursive_bytes(b: Bytes) -> TcapResult<Ie> {
        parse_recursive_at(&b, 0, &ParseConfig::default())
    }
}

/// Parse a concatenation of elements without expanding constructed values
///
/// Fails on the first element that does not parse.
pub fn parse_multi(b: &[u8]) -> TcapResult<Vec<Ie>> {
    parse_multi_bytes(Bytes::copy_from_slice(b))
}

/// Flat sequence parse sharing `b` as the value storage
pub fn parse_multi_bytes(b: Bytes) -> TcapResult<Vec<Ie>> {
    BerDecoder::new(b).decode_all()
}

/// Parse a concatenation of elements, expanding constructed ones
pub fn parse_ber(b: &[u8]) -> TcapResult<Vec<Ie>> {
    parse_ber_bytes(Bytes::copy_from_slice(b))
}

/// Recursive sequence parse sharing `b` as the value storage
pub fn parse_ber_bytes(b: Bytes) -> TcapResult<Vec<Ie>> {
    parse_ber_with(b, &ParseConfig::default())
}

/// Recursive sequence parse with explicit settings
pub fn parse_ber_with(b: Bytes, config: &ParseConfig) -> TcapResult<Vec<Ie>> {
    parse_sequence_recursive(b, 0, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::types::TagClass;

    #[test]
    fn test_parse_octet_string() {
        let ie = Ie::parse(&[0x04, 0x02, 0xAA, 0xBB]).unwrap();
        assert_eq!(ie.tag(), Tag::universal_primitive(4));
        assert_eq!(ie.length(), 2);
        assert_eq!(&ie.value()[..], &[0xAA, 0xBB]);
        assert!(ie.children().is_empty());
    }

    #[test]
    fn test_parse_empty_value() {
        let ie = Ie::parse(&[0x05, 0x00]).unwrap();
        assert_eq!(ie.tag(), Tag::universal_primitive(5));
        assert_eq!(ie.length(), 0);
        assert_eq!(ie.marshal_len(), 2);
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(Ie::parse(&[]), Err(TcapError::truncated(2, 0)));
        assert_eq!(Ie::parse(&[0x04]), Err(TcapError::truncated(2, 1)));
        assert_eq!(
            Ie::parse(&[0x04, 0x05, 0xAA]),
            Err(TcapError::truncated(7, 3))
        );
        assert_eq!(
            Ie::parse(&[0x04, 0x82, 0x01]),
            Err(TcapError::truncated(4, 3))
        );
    }

    #[test]
    fn test_parse_indefinite_length() {
        assert!(matches!(
            Ie::parse(&[0x30, 0x80, 0x04, 0x00, 0x00, 0x00]),
            Err(TcapError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_parse_long_form_value() {
        let mut data = vec![0x04, 0x81, 0x80];
        data.extend((0..128).map(|i| i as u8));
        let ie = Ie::parse(&data).unwrap();
        assert_eq!(ie.length(), 128);
        assert_eq!(ie.value()[0], 0);
        assert_eq!(ie.value()[127], 127);
        assert_eq!(ie.wire_len(), data.len());
    }

    #[test]
    fn test_parse_non_minimal_long_form() {
        // 0x81 0x02 announces a length of 2 that would fit the short form
        let data = [0x04, 0x81, 0x02, 0xAA, 0xBB, 0x05, 0x00];
        let ies = parse_multi(&data).unwrap();
        assert_eq!(ies.len(), 2);
        assert_eq!(ies[0].wire_len(), 5);
        assert_eq!(ies[0].marshal_len(), 4);
        assert_eq!(ies[1].tag(), Tag::universal_primitive(5));
    }

    #[test]
    fn test_parse_multi() {
        let data = [0x02, 0x01, 0x7B, 0x04, 0x02, 0xAA, 0xBB, 0x30, 0x02, 0x05, 0x00];
        let ies = parse_multi(&data).unwrap();
        assert_eq!(ies.len(), 3);
        assert_eq!(ies[0].tag().code(), 2);
        assert_eq!(ies[1].tag().code(), 4);
        // flat mode never expands constructed elements
        assert!(ies[2].is_constructed());
        assert!(ies[2].children().is_empty());
        assert_eq!(ies.iter().map(Ie::wire_len).sum::<usize>(), data.len());
    }

    #[test]
    fn test_parse_multi_aborts_on_short_element() {
        let data = [0x02, 0x01, 0x7B, 0x04, 0x05, 0xAA];
        assert_eq!(parse_multi(&data), Err(TcapError::truncated(7, 3)));
    }

    #[test]
    fn test_decoder_position() {
        let mut decoder = BerDecoder::new(Bytes::from_static(&[0x02, 0x01, 0x7B, 0x04, 0x00, 0xFF]));
        decoder.decode_ie().unwrap();
        assert_eq!(decoder.position(), 3);
        decoder.decode_ie().unwrap();
        assert_eq!(decoder.remaining(), 1);
        assert!(decoder.decode_ie().is_err());
        assert_eq!(decoder.position(), 5);
    }

    #[test]
    fn test_parse_ber_constructed() {
        let data = [0x30, 0x07, 0x02, 0x01, 0x01, 0x04, 0x02, 0xAA, 0xBB];
        let ies = parse_ber(&data).unwrap();
        assert_eq!(ies.len(), 1);

        let seq = &ies[0];
        assert_eq!(seq.length(), 7);
        assert_eq!(seq.children().len(), 2);
        assert_eq!(seq.children()[0].tag(), Tag::universal_primitive(2));
        assert_eq!(&seq.children()[0].value()[..], &[0x01]);
        assert_eq!(seq.children()[1].tag(), Tag::universal_primitive(4));
        assert_eq!(&seq.children()[1].value()[..], &[0xAA, 0xBB]);
    }

    #[test]
    fn test_parse_ber_tcap_begin() {
        // Begin { otid, components { invoke { id, opcode, parameter } } }
        let data = [
            0x62, 0x12, // Begin
            0x48, 0x04, 0x00, 0x00, 0x00, 0x01, // otid
            0x6C, 0x0A, // component portion
            0xA1, 0x08, // invoke
            0x02, 0x01, 0x01, // invoke id
            0x02, 0x01, 0x2D, // local operation code
            0x30, 0x00, // empty parameter sequence
        ];
        let ies = parse_ber(&data).unwrap();
        assert_eq!(ies.len(), 1);

        let begin = &ies[0];
        assert_eq!(begin.tag().class(), TagClass::ApplicationWide);
        assert_eq!(begin.children().len(), 2);

        let components = &begin.children()[1];
        let invoke = &components.children()[0];
        assert_eq!(invoke.tag(), Tag::context_specific_constructed(1));
        assert_eq!(invoke.children().len(), 3);
        assert_eq!(&invoke.children()[1].value()[..], &[0x2D]);
        assert!(invoke.children()[2].children().is_empty());
    }

    #[test]
    fn test_parse_ber_keeps_following_elements() {
        let data = [0x30, 0x03, 0x04, 0x01, 0xAA, 0x02, 0x01, 0x07];
        let ies = parse_ber(&data).unwrap();
        assert_eq!(ies.len(), 2);
        assert_eq!(ies[1].tag(), Tag::universal_primitive(2));
    }

    #[test]
    fn test_parse_ber_nested_overrun_is_truncated_node() {
        let data = [0x30, 0x04, 0x04, 0x05, 0xAA, 0xBB];
        let ies = parse_ber(&data).unwrap();
        assert_eq!(ies.len(), 1);

        let seq = &ies[0];
        assert_eq!(seq.length(), 4);
        assert_eq!(seq.children().len(), 1);

        let child = &seq.children()[0];
        assert!(child.is_truncated());
        assert_eq!(child.declared_length(), 5);
        assert!(child.value().is_empty());
        assert_eq!(child.length(), 0);
    }

    #[test]
    fn test_parse_ber_nested_failure_yields_no_children() {
        // trailing single byte inside the sequence
        let ies = parse_ber(&[0x30, 0x04, 0x04, 0x01, 0xAA, 0x05]).unwrap();
        assert_eq!(ies.len(), 1);
        assert!(ies[0].children().is_empty());
        assert_eq!(ies[0].length(), 4);

        // indefinite length inside the sequence
        let ies = parse_ber(&[0x30, 0x02, 0x30, 0x80]).unwrap();
        assert!(ies[0].children().is_empty());
        assert_eq!(&ies[0].value()[..], &[0x30, 0x80]);
    }

    #[test]
    fn test_parse_ber_top_level_errors_propagate() {
        assert_eq!(parse_ber(&[0x04]), Err(TcapError::truncated(2, 1)));
        assert!(matches!(
            parse_ber(&[0x30, 0x80]),
            Err(TcapError::UnsupportedEncoding(_))
        ));
        assert!(parse_ber(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_ber_top_level_overrun() {
        let ies = parse_ber(&[0x04, 0x05, 0xAA]).unwrap();
        assert_eq!(ies.len(), 1);
        assert!(ies[0].is_truncated());
    }

    #[test]
    fn test_parse_ber_overrunning_child_ends_sequence() {
        // The second child overruns the sequence value, so the children
        // account for more bytes than the parent and the cursor runs out.
        let data = [0x30, 0x05, 0x04, 0x01, 0xAA, 0x04, 0x09, 0x02, 0x01, 0x07];
        let ies = parse_ber(&data).unwrap();
        assert_eq!(ies.len(), 1);
        assert_eq!(ies[0].children().len(), 2);
        assert!(ies[0].children()[1].is_truncated());
    }

    #[test]
    fn test_parse_ber_max_depth() {
        let leaf = Ie::new(Tag::universal_primitive(4), Bytes::from_static(&[0xAA]));
        let inner = Ie::with_children(Tag::universal_constructed(16), vec![leaf]);
        let outer = Ie::with_children(Tag::universal_constructed(16), vec![inner]);

        let config = ParseConfig::default().with_max_depth(1);
        let ies = parse_ber_with(outer.marshal(), &config).unwrap();
        let parsed_inner = &ies[0].children()[0];
        assert!(parsed_inner.is_constructed());
        assert!(parsed_inner.children().is_empty());
        assert_eq!(&parsed_inner.value()[..], &[0x04, 0x01, 0xAA]);

        let ies = parse_ber_bytes(outer.marshal()).unwrap();
        assert_eq!(ies[0], outer);
    }

    #[test]
    fn test_parse_ber_deep_nesting_is_bounded() {
        let mut ie = Ie::new(Tag::universal_primitive(4), Bytes::new());
        for _ in 0..200 {
            ie = Ie::with_children(Tag::universal_constructed(16), vec![ie]);
        }

        let ies = parse_ber_bytes(ie.marshal()).unwrap();
        let mut levels = 0;
        let mut node = &ies[0];
        while let Some(child) = node.children().first() {
            node = child;
            levels += 1;
        }
        assert_eq!(levels, ParseConfig::default().max_depth);
    }

    #[test]
    fn test_parse_shares_buffer() {
        let data = Bytes::from(vec![0x30, 0x03, 0x04, 0x01, 0xAA]);
        let range = data.as_ptr() as usize..data.as_ptr() as usize + data.len();

        let ies = parse_ber_bytes(data.clone()).unwrap();
        let child_value = ies[0].children()[0].value();
        assert!(range.contains(&(child_value.as_ptr() as usize)));
    }

    #[test]
    fn test_parse_recursive_single() {
        let ie = Ie::parse_recursive(&[0xA1, 0x03, 0x02, 0x01, 0x05, 0xFF]).unwrap();
        assert_eq!(ie.children().len(), 1);
        assert_eq!(ie.wire_len(), 5);
    }
}
