//! Conversion between protocol types and their protobuf wire form.
//!
//! Encoding goes through [`prost`]; this module only defines the mapping
//! trait and the helpers shared by the message modules.

use bytes::Bytes;
use prost::Message;

use crate::error::ProtocolError;

/// A protocol type with a protobuf wire representation.
///
/// Encoding never fails. Decoding fails on malformed protobuf input, and on
/// well-formed input that is missing a field the protocol requires.
pub trait WireMessage: Sized {
    /// The generated wire message.
    type Proto: Message + Default;

    /// Convert into the wire message.
    fn to_proto(&self) -> Self::Proto;

    /// Convert from a decoded wire message.
    fn from_proto(proto: Self::Proto) -> Result<Self, ProtocolError>;

    /// Encode into a fresh buffer.
    #[must_use]
    fn encode(&self) -> Bytes {
        Bytes::from(self.to_proto().encode_to_vec())
    }

    /// Decode from a buffer.
    fn decode(src: Bytes) -> Result<Self, ProtocolError> {
        Self::from_proto(Self::Proto::decode(src)?)
    }
}

/// Unwrap a singular message field the protocol requires.
pub(crate) fn required<T>(field: Option<T>, name: &'static str) -> Result<T, ProtocolError> {
    field.ok_or(ProtocolError::MissingField(name))
}

/// Convert every element of a repeated field.
pub(crate) fn from_protos<T: WireMessage>(protos: Vec<T::Proto>) -> Result<Vec<T>, ProtocolError> {
    protos.into_iter().map(T::from_proto).collect()
}

/// Convert a slice into a repeated field.
pub(crate) fn to_protos<T: WireMessage>(items: &[T]) -> Vec<T::Proto> {
    items.iter().map(WireMessage::to_proto).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_truncated_input_is_decode_error() {
        // field 4 (text) claims 5 bytes, only 2 follow
        let err = Value::decode(Bytes::from_static(&[0x22, 0x05, b'h', b'i'])).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let err = Value::decode(Bytes::from_static(&[0x22, 0x01, 0xFF])).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_required_field() {
        assert_eq!(required(Some(1), "x"), Ok(1));
        assert_eq!(
            required::<u8>(None, "Stmt.sql"),
            Err(ProtocolError::MissingField("Stmt.sql"))
        );
    }
}
