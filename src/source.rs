use crate::error::Result;

/// Borrow raw document bytes as UTF-8, skipping a leading byte order mark.
pub fn decode_utf8(raw: &[u8]) -> Result<&str> {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    Ok(std::str::from_utf8(raw)?)
}

/// Namespace-aware parse of a source document. Inline documents commonly
/// carry an XHTML doctype, so DTDs are allowed.
pub fn parse_document(text: &str) -> Result<roxmltree::Document<'_>> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    Ok(roxmltree::Document::parse_with_options(text, options)?)
}
