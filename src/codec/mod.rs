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

//! Structural codec boundary.
//!
//! The SAS layer only ever asks to encode or decode a typed value to and from
//! an opaque octet sequence. `CdrValue` plays the role of the type descriptor;
//! `Codec` is the collaborator doing the work. `CdrEncapsCodec` is the CORBA
//! CDR encapsulation implementation used by default.

pub mod cdr;
mod types;

pub use cdr::{CdrReader, CdrWriter};

use crate::engine_core::errors::CodecError;
use bytes::Bytes;
use tracing::trace;

/// A type with a fixed CDR structural shape.
pub trait CdrValue: Sized {
    /// IDL name, used in diagnostics.
    const TYPE_NAME: &'static str;

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError>;

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError>;
}

/// Encode/decode an opaque octet sequence against a type.
pub trait Codec: Send + Sync {
    fn encode_value<T: CdrValue>(&self, value: &T) -> Result<Bytes, CodecError>;

    fn decode_value<T: CdrValue>(&self, data: &[u8]) -> Result<T, CodecError>;
}

/// CDR encapsulation codec (GIOP 1.2 rules, big-endian on encode).
#[derive(Debug, Clone, Copy, Default)]
pub struct CdrEncapsCodec;

impl CdrEncapsCodec {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Codec for CdrEncapsCodec {
    fn encode_value<T: CdrValue>(&self, value: &T) -> Result<Bytes, CodecError> {
        let mut w = CdrWriter::new();
        value.write_cdr(&mut w)?;
        trace!("Encoded {} into {} bytes", T::TYPE_NAME, w.len());
        Ok(w.into_bytes())
    }

    fn decode_value<T: CdrValue>(&self, data: &[u8]) -> Result<T, CodecError> {
        let mut r = CdrReader::new(data)?;
        let value = T::read_cdr(&mut r)?;
        trace!(
            "Decoded {} from {} bytes ({} trailing)",
            T::TYPE_NAME,
            data.len(),
            r.remaining()
        );
        Ok(value)
    }
}

impl<C: Codec> Codec for std::sync::Arc<C> {
    fn encode_value<T: CdrValue>(&self, value: &T) -> Result<Bytes, CodecError> {
        (**self).encode_value(value)
    }

    fn decode_value<T: CdrValue>(&self, data: &[u8]) -> Result<T, CodecError> {
        (**self).decode_value(data)
    }
}
