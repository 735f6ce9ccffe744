// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CDR encapsulation primitives.
//!
//! Alignment is always computed relative to the first octet of the
//! encapsulation, which holds the byte-order flag.

use crate::engine_core::constants::limits;
use crate::engine_core::errors::CodecError;
use bytes::{BufMut, Bytes, BytesMut};

const BIG_ENDIAN: u8 = 0;
const LITTLE_ENDIAN: u8 = 1;

/// Big-endian CDR encapsulation writer.
pub struct CdrWriter {
    buf: BytesMut,
}

impl CdrWriter {
    #[must_use]
    pub fn new() -> Self {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_u8(BIG_ENDIAN);
        Self { buf }
    }

    fn align(&mut self, boundary: usize) {
        let pad = (boundary - self.buf.len() % boundary) % boundary;
        self.buf.put_bytes(0, pad);
    }

    pub fn write_octet(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.put_u8(u8::from(v));
    }

    pub fn write_u16(&mut self, v: u16) {
        self.align(2);
        self.buf.put_u16(v);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.align(2);
        self.buf.put_i16(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.align(4);
        self.buf.put_u32(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.align(4);
        self.buf.put_i32(v);
    }

    pub fn write_u64(&mut self, v: u64) {
        self.align(8);
        self.buf.put_u64(v);
    }

    /// Sequence length prefix.
    pub fn write_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
        self.write_u32(len);
        Ok(())
    }

    pub fn write_octets(&mut self, data: &[u8]) -> Result<(), CodecError> {
        self.write_len(data.len())?;
        self.buf.put_slice(data);
        Ok(())
    }

    pub fn write_string(&mut self, s: &str) -> Result<(), CodecError> {
        if s.as_bytes().contains(&0) {
            return Err(CodecError::InvalidString(format!(
                "interior NUL in {:?}",
                s
            )));
        }
        self.write_len(s.len() + 1)?;
        self.buf.put_slice(s.as_bytes());
        self.buf.put_u8(0);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for CdrWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// CDR encapsulation reader honouring the byte-order flag.
pub struct CdrReader<'a> {
    data: &'a [u8],
    pos: usize,
    little_endian: bool,
}

impl<'a> CdrReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, CodecError> {
        let flag = *data.first().ok_or(CodecError::Truncated {
            needed: 1,
            remaining: 0,
        })?;
        let little_endian = match flag {
            BIG_ENDIAN => false,
            LITTLE_ENDIAN => true,
            other => return Err(CodecError::InvalidByteOrder(other)),
        };
        Ok(Self {
            data,
            pos: 1,
            little_endian,
        })
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn align(&mut self, boundary: usize) -> Result<(), CodecError> {
        let pad = (boundary - self.pos % boundary) % boundary;
        self.take(pad).map(|_| ())
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        self.align(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_octet(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_octet()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBoolean(other)),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        let raw = self.take_array::<2>()?;
        Ok(if self.little_endian {
            u16::from_le_bytes(raw)
        } else {
            u16::from_be_bytes(raw)
        })
    }

    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        let raw = self.take_array::<4>()?;
        Ok(if self.little_endian {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        let raw = self.take_array::<8>()?;
        Ok(if self.little_endian {
            u64::from_le_bytes(raw)
        } else {
            u64::from_be_bytes(raw)
        })
    }

    /// Sequence length prefix, bounded by the bytes left in the buffer.
    ///
    /// Every element of every sequence we decode occupies at least one octet,
    /// so a length above `remaining()` can never be satisfied.
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = self.read_u32()? as usize;
        if len > self.remaining() || len > limits::MAX_SEQUENCE_LEN {
            return Err(CodecError::SequenceTooLong {
                len,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    pub fn read_octets(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_len()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()?;
        let raw = self.take(len)?;
        match raw.split_last() {
            Some((0, body)) => String::from_utf8(body.to_vec())
                .map_err(|e| CodecError::InvalidString(e.to_string())),
            _ => Err(CodecError::InvalidString(
                "missing NUL terminator".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_is_relative_to_encapsulation_start() {
        let mut w = CdrWriter::new();
        w.write_octet(7);
        w.write_u32(0x0102_0304);
        let bytes = w.into_bytes();
        // flag, octet, 2 pad, u32
        assert_eq!(&bytes[..], &[0, 7, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_string_layout() {
        let mut w = CdrWriter::new();
        w.write_string("ab").unwrap();
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..], &[0, 0, 0, 0, 0, 0, 0, 3, b'a', b'b', 0]);
        let mut r = CdrReader::new(&bytes).unwrap();
        assert_eq!(r.read_string().unwrap(), "ab");
    }

    #[test]
    fn test_string_with_nul_is_rejected_on_encode() {
        let mut w = CdrWriter::new();
        assert!(matches!(
            w.write_string("a\0b"),
            Err(CodecError::InvalidString(_))
        ));
    }

    #[test]
    fn test_little_endian_read() {
        let data = [1u8, 0, 0, 0, 0x04, 0x03, 0x02, 0x01];
        let mut r = CdrReader::new(&data).unwrap();
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_invalid_flag_and_truncation() {
        assert!(matches!(
            CdrReader::new(&[9]),
            Err(CodecError::InvalidByteOrder(9))
        ));
        let mut r = CdrReader::new(&[0, 0, 0]).unwrap();
        assert!(matches!(r.read_u32(), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn test_oversized_sequence_length_rejected() {
        let data = [0u8, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        let mut r = CdrReader::new(&data).unwrap();
        assert!(matches!(
            r.read_octets(),
            Err(CodecError::SequenceTooLong { .. })
        ));
    }
}
