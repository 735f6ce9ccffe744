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

//! Domain models for CSIv2 context establishment.
//!
//! This module contains the value types published in IORs (tagged components,
//! compound security mechanisms) and exchanged in the SAS service context.
//! Everything here is plain data with structural equality; opaque payloads
//! that are shared across requests are held in immutable `Bytes`.

use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, BitXor, Not};

use crate::engine_core::constants::{association, identity_token_type, major_status, tags};

/// CSIIOP::AssociationOptions bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct AssociationOptions(u16);

impl AssociationOptions {
    pub const NONE: Self = Self(0);
    pub const INTEGRITY: Self = Self(association::INTEGRITY);
    pub const CONFIDENTIALITY: Self = Self(association::CONFIDENTIALITY);
    pub const DETECT_REPLAY: Self = Self(association::DETECT_REPLAY);
    pub const DETECT_MISORDERING: Self = Self(association::DETECT_MISORDERING);
    pub const ESTABLISH_TRUST_IN_TARGET: Self = Self(association::ESTABLISH_TRUST_IN_TARGET);
    pub const ESTABLISH_TRUST_IN_CLIENT: Self = Self(association::ESTABLISH_TRUST_IN_CLIENT);
    pub const IDENTITY_ASSERTION: Self = Self(association::IDENTITY_ASSERTION);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AssociationOptions {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AssociationOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AssociationOptions {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitXor for AssociationOptions {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Not for AssociationOptions {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for AssociationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// IOP::TaggedComponent: one opaque block inside an IOR profile.
///
/// The payload is immutable; cloning never lets one holder alter another's copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaggedComponent {
    pub tag: u32,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub data: Bytes,
}

impl TaggedComponent {
    pub fn new(tag: u32, data: impl Into<Bytes>) -> Self {
        Self {
            tag,
            data: data.into(),
        }
    }

    /// The explicit "no transport security" marker.
    pub fn null() -> Self {
        Self::new(tags::TAG_NULL_TAG, Bytes::new())
    }

    pub fn is_null(&self) -> bool {
        self.tag == tags::TAG_NULL_TAG
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportAddress {
    pub host_name: String,
    pub port: u16,
}

/// CSIIOP::TLS_SEC_TRANS
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsSecTrans {
    pub target_supports: AssociationOptions,
    pub target_requires: AssociationOptions,
    pub addresses: Vec<TransportAddress>,
}

/// SSLIOP::SSL, the pre-CSIv2 transport component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SslComponent {
    pub target_supports: AssociationOptions,
    pub target_requires: AssociationOptions,
    pub port: u16,
}

/// CSIIOP::AS_ContextSec: client authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AsContextSec {
    pub target_supports: AssociationOptions,
    pub target_requires: AssociationOptions,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub client_authentication_mech: Vec<u8>,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub target_name: Vec<u8>,
}

/// CSIIOP::ServiceConfiguration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceConfiguration {
    pub syntax: u32,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub name: Vec<u8>,
}

/// CSIIOP::SAS_ContextSec: identity assertion layer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SasContextSec {
    pub target_supports: AssociationOptions,
    pub target_requires: AssociationOptions,
    pub privilege_authorities: Vec<ServiceConfiguration>,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize_seq")]
    pub supported_naming_mechanisms: Vec<Vec<u8>>,
    /// Bitmask of `identity_token_type` values
    pub supported_identity_types: u32,
}

impl SasContextSec {
    pub fn supports_identity_type(&self, token_type: u32) -> bool {
        self.supported_identity_types & token_type != 0
    }
}

/// CSIIOP::CompoundSecMech, the unit negotiated per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundSecMech {
    pub target_requires: AssociationOptions,
    pub transport_mech: TaggedComponent,
    pub as_context_mech: AsContextSec,
    pub sas_context_mech: SasContextSec,
}

impl fmt::Display for CompoundSecMech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let asm = &self.as_context_mech;
        let sas = &self.sas_context_mech;
        write!(f, "CompoundSecMech[target_requires: {}", self.target_requires)?;
        write!(
            f,
            ", AS_ContextSec[client_authentication_mech: {}, target_name: {}",
            hex::encode(&asm.client_authentication_mech),
            String::from_utf8_lossy(&asm.target_name)
        )?;
        write!(
            f,
            ", target_requires: {}, target_supports: {}]",
            asm.target_requires, asm.target_supports
        )?;
        write!(
            f,
            ", SAS_ContextSec[supported_identity_types: {}",
            sas.supported_identity_types
        )?;
        write!(
            f,
            ", target_requires: {}, target_supports: {}]]",
            sas.target_requires, sas.target_supports
        )
    }
}

/// CSIIOP::CompoundSecMechList
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundSecMechList {
    pub stateful: bool,
    pub mechanism_list: Vec<CompoundSecMech>,
}

/// CSI::IdentityToken
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum IdentityToken {
    #[default]
    Absent,
    Anonymous,
    /// GSS exported name bytes
    PrincipalName(#[serde(serialize_with = "crate::utils::hex_serde::serialize")] Vec<u8>),
    CertificateChain(#[serde(serialize_with = "crate::utils::hex_serde::serialize")] Vec<u8>),
    DistinguishedName(#[serde(serialize_with = "crate::utils::hex_serde::serialize")] Vec<u8>),
    /// Token type outside the standard set
    Extension {
        token_type: u32,
        #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
        data: Vec<u8>,
    },
}

impl IdentityToken {
    pub fn token_type(&self) -> u32 {
        match self {
            IdentityToken::Absent => identity_token_type::ABSENT,
            IdentityToken::Anonymous => identity_token_type::ANONYMOUS,
            IdentityToken::PrincipalName(_) => identity_token_type::PRINCIPAL_NAME,
            IdentityToken::CertificateChain(_) => identity_token_type::X509_CERT_CHAIN,
            IdentityToken::DistinguishedName(_) => identity_token_type::DISTINGUISHED_NAME,
            IdentityToken::Extension { token_type, .. } => *token_type,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, IdentityToken::Absent)
    }
}

/// CSI::AuthorizationElement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationElement {
    pub the_type: u32,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub the_element: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstablishContext {
    pub client_context_id: u64,
    pub authorization_token: Vec<AuthorizationElement>,
    pub identity_token: IdentityToken,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub client_authentication_token: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteEstablishContext {
    pub client_context_id: u64,
    pub context_stateful: bool,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub final_context_token: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextError {
    pub client_context_id: u64,
    pub major_status: i32,
    pub minor_status: i32,
    #[serde(serialize_with = "crate::utils::hex_serde::serialize")]
    pub error_token: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageInContext {
    pub client_context_id: u64,
    pub discard_context: bool,
}

/// CSI::SASContextBody, the message carried in the SAS service context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "msg", rename_all = "snake_case")]
pub enum SasContextBody {
    EstablishContext(EstablishContext),
    CompleteEstablishContext(CompleteEstablishContext),
    ContextError(ContextError),
    MessageInContext(MessageInContext),
}

impl SasContextBody {
    /// Stateless accept reply.
    pub fn accept(client_context_id: u64) -> Self {
        SasContextBody::CompleteEstablishContext(CompleteEstablishContext {
            client_context_id,
            context_stateful: false,
            final_context_token: Vec::new(),
        })
    }

    /// Reject reply with the given major status.
    pub fn reject(client_context_id: u64, major_status: i32) -> Self {
        SasContextBody::ContextError(ContextError {
            client_context_id,
            major_status,
            minor_status: major_status::MINOR_STATUS,
            error_token: Vec::new(),
        })
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, SasContextBody::CompleteEstablishContext(_))
    }

    pub fn client_context_id(&self) -> u64 {
        match self {
            SasContextBody::EstablishContext(m) => m.client_context_id,
            SasContextBody::CompleteEstablishContext(m) => m.client_context_id,
            SasContextBody::ContextError(m) => m.client_context_id,
            SasContextBody::MessageInContext(m) => m.client_context_id,
        }
    }
}

/// GSSUP::InitialContextToken, the username/password evidence.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct InitialContextToken {
    pub username: Vec<u8>,
    pub password: Vec<u8>,
    /// GSS exported name of the target realm
    pub target_name: Vec<u8>,
}

impl fmt::Debug for InitialContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitialContextToken")
            .field("username", &String::from_utf8_lossy(&self.username))
            .field("password", &"<redacted>")
            .field("target_name", &hex::encode(&self.target_name))
            .finish()
    }
}

/// IOP::ServiceContext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContext {
    pub context_id: u32,
    pub context_data: Bytes,
}

/// Per-message service context side-channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceContextList(Vec<ServiceContext>);

impl ServiceContextList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, context_id: u32) -> Option<&ServiceContext> {
        self.0.iter().find(|ctx| ctx.context_id == context_id)
    }

    /// Insert `ctx`, replacing any entry with the same id.
    pub fn replace(&mut self, ctx: ServiceContext) {
        self.0.retain(|existing| existing.context_id != ctx.context_id);
        self.0.push(ctx);
    }

    pub fn remove(&mut self, context_id: u32) -> Option<ServiceContext> {
        let idx = self.0.iter().position(|ctx| ctx.context_id == context_id)?;
        Some(self.0.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}
