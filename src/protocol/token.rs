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

//! GSS Token Framing.
//!
//! Two independent bit-exact encodings:
//!
//! * RFC 2743 §3.2 exported names:
//!   `04 01 | u16 BE oid_len | oid | u32 BE name_len | name`
//! * GSSUP InitialContextToken generic framing:
//!   `60 | DER definite length | GSSUP OID | CDR(InitialContextToken)`
//!
//! Encoding errors are local defects and surface as `CodecError`. Decoding
//! untrusted input never errors: a buffer that does not parse is simply
//! "no match" (`None`), leaving the caller to decide on the reply.

use crate::codec::Codec;
use crate::engine_core::constants::gss;
use crate::engine_core::errors::CodecError;
use crate::engine_core::models::InitialContextToken;
use bytes::{BufMut, BytesMut};
use tracing::debug;

/// Encode an RFC 2743 exported name object.
pub fn encode_gss_name(mech_oid: &[u8], name: &[u8]) -> Result<Vec<u8>, CodecError> {
    let oid_len =
        u16::try_from(mech_oid.len()).map_err(|_| CodecError::LengthOverflow(mech_oid.len()))?;
    let name_len = u32::try_from(name.len()).map_err(|_| CodecError::LengthOverflow(name.len()))?;

    let mut out = BytesMut::with_capacity(2 + 2 + mech_oid.len() + 4 + name.len());
    out.put_slice(&gss::EXPORTED_NAME_TOK_ID);
    out.put_u16(oid_len);
    out.put_slice(mech_oid);
    out.put_u32(name_len);
    out.put_slice(name);
    Ok(out.to_vec())
}

/// Decode an exported name, requiring its mechanism to be `expected_oid`.
///
/// Returns `(oid, name)`. Trailing bytes after the name are rejected.
pub fn decode_gss_name(data: &[u8], expected_oid: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let rest = data.strip_prefix(&gss::EXPORTED_NAME_TOK_ID[..])?;

    let (oid_len, rest) = rest.split_first_chunk::<2>()?;
    let oid_len = u16::from_be_bytes(*oid_len) as usize;
    if rest.len() < oid_len {
        return None;
    }
    let (oid, rest) = rest.split_at(oid_len);
    if oid != expected_oid {
        debug!("Exported name carries unexpected mechanism {}", hex::encode(oid));
        return None;
    }

    let (name_len, rest) = rest.split_first_chunk::<4>()?;
    let name_len = u32::from_be_bytes(*name_len) as usize;
    if rest.len() != name_len {
        return None;
    }
    Some((oid.to_vec(), rest.to_vec()))
}

/// Exported name under the GSSUP mechanism.
pub fn encode_gssup_name(name: &str) -> Result<Vec<u8>, CodecError> {
    encode_gss_name(gss::GSSUP_MECH_OID, name.as_bytes())
}

/// Name bytes of a GSSUP exported name.
pub fn decode_gssup_name(data: &[u8]) -> Option<Vec<u8>> {
    decode_gss_name(data, gss::GSSUP_MECH_OID).map(|(_, name)| name)
}

/// Number of octets in the minimal DER definite-length field for `len`.
pub fn der_length_octets(len: usize) -> usize {
    match len {
        0..=0x7f => 1,
        0x80..=0xff => 2,
        0x100..=0xffff => 3,
        0x1_0000..=0xff_ffff => 4,
        _ => 5,
    }
}

fn put_der_length(out: &mut BytesMut, len: usize) -> Result<(), CodecError> {
    let len32 = u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
    let n = der_length_octets(len) - 1;
    if n == 0 {
        out.put_u8(len32 as u8);
    } else {
        out.put_u8(0x80 | n as u8);
        out.put_slice(&len32.to_be_bytes()[4 - n..]);
    }
    Ok(())
}

/// Parse a DER definite length. Returns `(length, octets consumed)`.
fn read_der_length(data: &[u8]) -> Option<(usize, usize)> {
    let first = *data.first()?;
    if first & 0x80 == 0 {
        return Some((first as usize, 1));
    }
    let n = (first & 0x7f) as usize;
    if n == 0 || n > 4 || data.len() < 1 + n {
        return None;
    }
    let len = data[1..=n]
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    Some((len, 1 + n))
}

/// Frame a GSSUP InitialContextToken for the client authentication field.
pub fn encode_initial_context_token<C: Codec + ?Sized>(
    token: &InitialContextToken,
    codec: &C,
) -> Result<Vec<u8>, CodecError> {
    let inner = codec.encode_value(token)?;
    let body_len = gss::GSSUP_MECH_OID.len() + inner.len();

    let mut out = BytesMut::with_capacity(1 + der_length_octets(body_len) + body_len);
    out.put_u8(gss::INITIAL_CONTEXT_TOKEN_TAG);
    put_der_length(&mut out, body_len)?;
    out.put_slice(gss::GSSUP_MECH_OID);
    out.put_slice(&inner);
    Ok(out.to_vec())
}

/// Convenience wrapper building the token from its parts.
pub fn encode_username_password_token<C: Codec + ?Sized>(
    username: &[u8],
    password: &[u8],
    target_name: &[u8],
    codec: &C,
) -> Result<Vec<u8>, CodecError> {
    let token = InitialContextToken {
        username: username.to_vec(),
        password: password.to_vec(),
        target_name: target_name.to_vec(),
    };
    encode_initial_context_token(&token, codec)
}

/// Reverse of [`encode_initial_context_token`].
///
/// Rejects a leading byte other than `0x60`, a length field that overruns the
/// buffer and a mechanism other than GSSUP.
pub fn decode_initial_context_token<C: Codec + ?Sized>(
    data: &[u8],
    codec: &C,
) -> Option<InitialContextToken> {
    let rest = match data.split_first() {
        Some((&gss::INITIAL_CONTEXT_TOKEN_TAG, rest)) => rest,
        _ => {
            debug!("InitialContextToken does not start with 0x60");
            return None;
        }
    };

    let (body_len, consumed) = read_der_length(rest)?;
    let rest = &rest[consumed..];
    if body_len > rest.len() {
        debug!(
            "InitialContextToken length {} overruns {} available bytes",
            body_len,
            rest.len()
        );
        return None;
    }

    let inner = rest[..body_len].strip_prefix(gss::GSSUP_MECH_OID)?;
    match codec.decode_value::<InitialContextToken>(inner) {
        Ok(token) => Some(token),
        Err(e) => {
            debug!("Inner InitialContextToken did not decode: {}", e);
            None
        }
    }
}

/// Convenience wrapper returning `(username, password, target_name)`.
pub fn decode_username_password_token<C: Codec + ?Sized>(
    data: &[u8],
    codec: &C,
) -> Option<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    decode_initial_context_token(data, codec).map(|t| (t.username, t.password, t.target_name))
}
