//! The two error kinds the codec ever raises.
//!
//! Every fallible operation in this crate returns one of these, wrapped in
//! [`CodecError`] at the points where both a parse and an encode step can
//! fail. Both carry the offending source fragment so a caller reporting a
//! bad line doesn't need to re-slice the input.

/// An assembly line could not be parsed: unknown keyword, malformed address
/// expression, multiple type prefixes, an illegal register token, or a bad
/// condition/arithmetic symbol.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("syntax error in {fragment:?}: {reason}")]
pub struct SyntaxError {
    /// Human-readable explanation of what was expected.
    pub reason: String,
    /// The source fragment that failed to parse.
    pub fragment: String,
}

impl SyntaxError {
    /// Builds a `SyntaxError` from a reason and the fragment that caused it.
    pub fn new(reason: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            fragment: fragment.into(),
        }
    }
}

/// A value or field was out of range for its declared width: a register
/// index `>= 16`, an immediate that overflows its width, an offset wider
/// than its nibble count, or an unrecognized enum value while decoding.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("encoding error in {fragment:?}: {reason}")]
pub struct EncodingError {
    /// Human-readable explanation of the violated constraint.
    pub reason: String,
    /// The source fragment (assembly operand or hex line) that caused it.
    pub fragment: String,
}

impl EncodingError {
    /// Builds an `EncodingError` from a reason and the fragment that caused it.
    pub fn new(reason: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            fragment: fragment.into(),
        }
    }
}

/// Either of the two kinds this crate's codec can produce.
///
/// Dispatcher-level functions that both parse text and validate field
/// ranges return this; single-purpose helpers return the narrower type
/// directly and let `?`/`From` widen it at the call site.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// See [`SyntaxError`].
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// See [`EncodingError`].
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl CodecError {
    /// The offending source fragment, regardless of which kind this is.
    pub fn fragment(&self) -> &str {
        match self {
            CodecError::Syntax(e) => &e.fragment,
            CodecError::Encoding(e) => &e.fragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_displays_reason_and_fragment() {
        let err = SyntaxError::new("unknown register", "r16");
        assert_eq!(err.to_string(), "syntax error in \"r16\": unknown register");
    }

    #[test]
    fn encoding_error_displays_reason_and_fragment() {
        let err = EncodingError::new("value overflows u8", "0x1ff");
        assert_eq!(
            err.to_string(),
            "encoding error in \"0x1ff\": value overflows u8"
        );
    }

    #[test]
    fn codec_error_widens_from_either_kind() {
        let syn: CodecError = SyntaxError::new("bad", "x").into();
        let enc: CodecError = EncodingError::new("bad", "y").into();
        assert_eq!(syn.fragment(), "x");
        assert_eq!(enc.fragment(), "y");
    }
}
