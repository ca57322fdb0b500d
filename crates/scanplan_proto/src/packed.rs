//! Simple packed encoding of protobuf messages.
//!
//! Length-prefixed encoding into a byte buffer for arbitrary messages. Message
//! schemas are runtime only concepts and are defined by the order and types
//! of messages encoded into the buffer.

use prost::Message;
use scanplan_error::{DbError, Result};

const LEN_PREFIX: usize = 8;

#[derive(Debug)]
pub struct PackedEncoder<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> PackedEncoder<'a> {
    /// Create a new packed encoder that will write the provided buffer.
    ///
    /// Encoded messages will start at the end of the buffer to enable multiple
    /// instantiations of the encoder without clobbering previously written
    /// data.
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        PackedEncoder { buf }
    }

    /// Encode a message into the buffer.
    pub fn encode_next<M: Message>(&mut self, msg: &M) -> Result<()> {
        let msg_len = msg.encoded_len();
        self.buf.reserve(LEN_PREFIX + msg_len);
        self.buf.extend_from_slice(&(msg_len as u64).to_le_bytes());
        msg.encode(&mut *self.buf)?;

        Ok(())
    }
}

#[derive(Debug)]
pub struct PackedDecoder<'a> {
    buf: &'a [u8],
    n: usize,
}

impl<'a> PackedDecoder<'a> {
    /// Create a new packed decoder that will read from the provided buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        PackedDecoder { buf, n: 0 }
    }

    /// Returns true if every message in the buffer has been decoded.
    pub fn is_exhausted(&self) -> bool {
        self.n >= self.buf.len()
    }

    /// Decode the next message from the buffer.
    pub fn decode_next<M: Message + Default>(&mut self) -> Result<M> {
        let msg_len_buf: [u8; LEN_PREFIX] = self
            .buf
            .get(self.n..self.n + LEN_PREFIX)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| DbError::serialization("Buffer too small to contain message"))?;

        let msg_len = crate::index_from_u64(u64::from_le_bytes(msg_len_buf))?;
        self.n += LEN_PREFIX;

        let buf = self
            .buf
            .get(self.n..self.n.saturating_add(msg_len))
            .ok_or_else(|| {
                DbError::serialization("Buffer too small for message length")
                    .with_field("need", msg_len)
                    .with_field("have", self.buf.len() - self.n)
            })?;
        let msg = M::decode(buf)?;

        self.n += msg_len;

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use scanplan_error::ErrorKind;

    use super::*;
    use crate::messages::schema::{DataType, DataTypeId, DecimalTypeMeta};

    #[test]
    fn single_message() {
        let datatype = DataType {
            id: DataTypeId::Int16 as i32,
            decimal: None,
            list_child: None,
        };

        let mut buf = Vec::new();
        {
            let mut encoder = PackedEncoder::new(&mut buf);
            encoder.encode_next(&datatype).unwrap();
        }

        let mut decoder = PackedDecoder::new(&buf);
        let msg: DataType = decoder.decode_next().unwrap();

        assert_eq!(datatype, msg);
        assert!(decoder.is_exhausted());
    }

    #[test]
    fn multiple_messages() {
        let datatype = DataType {
            id: DataTypeId::Utf8 as i32,
            decimal: None,
            list_child: None,
        };
        let decimal_meta = DecimalTypeMeta {
            precision: 18,
            scale: 3,
        };

        let mut buf = Vec::new();
        {
            let mut encoder = PackedEncoder::new(&mut buf);
            encoder.encode_next(&datatype).unwrap();
            encoder.encode_next(&decimal_meta).unwrap();
        }

        let mut decoder = PackedDecoder::new(&buf);
        let msg1: DataType = decoder.decode_next().unwrap();
        let msg2: DecimalTypeMeta = decoder.decode_next().unwrap();

        assert_eq!(datatype, msg1);
        assert_eq!(decimal_meta, msg2);
        assert_eq!(18, msg2.precision);
    }

    #[test]
    fn truncated_buffer() {
        let decimal_meta = DecimalTypeMeta {
            precision: 18,
            scale: 3,
        };
        let mut buf = Vec::new();
        PackedEncoder::new(&mut buf)
            .encode_next(&decimal_meta)
            .unwrap();
        buf.truncate(buf.len() - 1);

        let mut decoder = PackedDecoder::new(&buf);
        let err = decoder.decode_next::<DecimalTypeMeta>().unwrap_err();
        assert_eq!(ErrorKind::Serialization, err.kind());

        let err = PackedDecoder::new(&[1, 2, 3])
            .decode_next::<DecimalTypeMeta>()
            .unwrap_err();
        assert_eq!(ErrorKind::Serialization, err.kind());
    }

    #[test]
    fn oversized_length_prefix() {
        let mut buf = u64::MAX.to_le_bytes().to_vec();
        buf.extend_from_slice(&[8, 18]);

        let err = PackedDecoder::new(&buf)
            .decode_next::<DecimalTypeMeta>()
            .unwrap_err();
        assert_eq!(ErrorKind::Serialization, err.kind());
    }
}
