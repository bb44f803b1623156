//! Fixed-endian primitive codec.
//!
//! Integers are big-endian. `string` is a u8 length plus ASCII bytes;
//! `fixed_string(N)` is N ASCII bytes NUL-padded; `data` is a u16 length
//! plus raw bytes.

/// Raised by every decoder failure: short buffer or malformed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeserialError {
    #[error("buffer too short")]
    ShortBuffer,

    #[error("string is not ASCII")]
    NotAscii,
}

/// Appends primitives to a byte buffer.
#[derive(Default)]
pub struct Serializer {
    data: Vec<u8>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// u8 length followed by the ASCII bytes.
    ///
    /// # Panics
    ///
    /// Panics if the string exceeds 255 bytes or is not ASCII; both are
    /// programmer errors on the encode side.
    pub fn write_string(&mut self, value: &str) {
        assert!(value.is_ascii(), "wire strings are ASCII");
        assert!(value.len() <= u8::MAX as usize, "wire string too long");
        self.data.push(value.len() as u8);
        self.data.extend_from_slice(value.as_bytes());
    }

    /// Exactly `size` bytes, NUL-padded.
    ///
    /// # Panics
    ///
    /// Panics if the string exceeds `size` bytes or is not ASCII.
    pub fn write_fixed_string(&mut self, value: &str, size: usize) {
        assert!(value.is_ascii(), "wire strings are ASCII");
        assert!(value.len() <= size, "fixed string too long");
        self.data.extend_from_slice(value.as_bytes());
        self.data.extend(std::iter::repeat(0u8).take(size - value.len()));
    }

    /// u16 length followed by the raw bytes.
    ///
    /// # Panics
    ///
    /// Panics if the payload exceeds a u16 length.
    pub fn write_data(&mut self, value: &[u8]) {
        assert!(value.len() <= u16::MAX as usize, "data field too long");
        self.write_u16(value.len() as u16);
        self.data.extend_from_slice(value);
    }

    /// Append raw bytes with no framing.
    pub fn append(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

/// Consumes primitives from a byte buffer.
pub struct Deserializer<'a> {
    data: &'a [u8],
}

impl<'a> Deserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DeserialError> {
        if self.data.len() < n {
            return Err(DeserialError::ShortBuffer);
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8, DeserialError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DeserialError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DeserialError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_string(&mut self) -> Result<String, DeserialError> {
        let len = self.read_u8()? as usize;
        let bytes = self.take(len)?;
        if !bytes.is_ascii() {
            return Err(DeserialError::NotAscii);
        }
        Ok(String::from_utf8(bytes.to_vec()).expect("ASCII is UTF-8"))
    }

    /// Read `size` bytes and strip trailing NUL padding.
    pub fn read_fixed_string(&mut self, size: usize) -> Result<String, DeserialError> {
        let bytes = self.take(size)?;
        if !bytes.is_ascii() {
            return Err(DeserialError::NotAscii);
        }
        let end = bytes
            .iter()
            .rposition(|&b| b != 0)
            .map(|p| p + 1)
            .unwrap_or(0);
        Ok(String::from_utf8(bytes[..end].to_vec()).expect("ASCII is UTF-8"))
    }

    pub fn read_data(&mut self) -> Result<Vec<u8>, DeserialError> {
        let len = self.read_u16()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// Everything not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut serial = Serializer::new();
        serial.write_u16(0x1234);
        serial.write_u32(0xdeadbeef);
        assert_eq!(serial.finish(), [0x12, 0x34, 0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn string_roundtrip() {
        let mut serial = Serializer::new();
        serial.write_string("master");
        let data = serial.finish();
        assert_eq!(data[0], 6);

        let mut deserial = Deserializer::new(&data);
        assert_eq!(deserial.read_string().unwrap(), "master");
        assert!(deserial.is_empty());
    }

    #[test]
    fn fixed_string_nul_padded() {
        let mut serial = Serializer::new();
        serial.write_fixed_string("hello", 12);
        let data = serial.finish();
        assert_eq!(data.len(), 12);
        assert_eq!(&data[..5], b"hello");
        assert!(data[5..].iter().all(|&b| b == 0));

        let mut deserial = Deserializer::new(&data);
        assert_eq!(deserial.read_fixed_string(12).unwrap(), "hello");
    }

    #[test]
    fn data_roundtrip() {
        let mut serial = Serializer::new();
        serial.write_data(b"\x00\x01binary\xff");
        let data = serial.finish();

        let mut deserial = Deserializer::new(&data);
        assert_eq!(deserial.read_data().unwrap(), b"\x00\x01binary\xff");
    }

    #[test]
    fn short_buffer_is_an_error() {
        let mut deserial = Deserializer::new(&[0x12]);
        assert_eq!(deserial.read_u16().unwrap_err(), DeserialError::ShortBuffer);

        // A length byte promising more than is present.
        let mut deserial = Deserializer::new(&[5, b'a', b'b']);
        assert_eq!(
            deserial.read_string().unwrap_err(),
            DeserialError::ShortBuffer
        );
    }

    #[test]
    fn non_ascii_string_is_an_error() {
        let mut deserial = Deserializer::new(&[2, 0xc3, 0xa9]);
        assert_eq!(deserial.read_string().unwrap_err(), DeserialError::NotAscii);
    }

    #[test]
    fn remaining_exposes_tail() {
        let mut deserial = Deserializer::new(&[1, 2, 3, 4]);
        deserial.read_u16().unwrap();
        assert_eq!(deserial.remaining(), &[3, 4]);
    }
}
