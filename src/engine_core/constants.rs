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

//! CSIv2 Constants - Single source of truth for all wire values.
//!
//! Tags, bit positions and status codes here must match the OMG CSIv2 / IOP
//! definitions exactly, otherwise peers will not interoperate.

/// IOP tagged component identifiers published in an IOR profile
pub mod tags {
    /// Legacy SSLIOP::SSL component
    pub const TAG_SSL_SEC_TRANS: u32 = 20;
    /// CSIIOP::CompoundSecMechList component
    pub const TAG_CSI_SEC_MECH_LIST: u32 = 33;
    /// Explicit "no transport security" marker
    pub const TAG_NULL_TAG: u32 = 34;
    /// CSIIOP::TLS_SEC_TRANS transport mechanism
    pub const TAG_TLS_SEC_TRANS: u32 = 36;
}

/// IOP service context identifiers
pub mod service_context {
    /// Service context carrying a CSI::SASContextBody
    pub const SECURITY_ATTRIBUTE_SERVICE: u32 = 15;
}

/// CSIIOP::AssociationOptions bits
pub mod association {
    pub const INTEGRITY: u16 = 2;
    pub const CONFIDENTIALITY: u16 = 4;
    pub const DETECT_REPLAY: u16 = 8;
    pub const DETECT_MISORDERING: u16 = 16;
    pub const ESTABLISH_TRUST_IN_TARGET: u16 = 32;
    pub const ESTABLISH_TRUST_IN_CLIENT: u16 = 64;
    pub const IDENTITY_ASSERTION: u16 = 1024;
}

/// CSI::IdentityTokenType values (also used as a bitmask of supported types)
pub mod identity_token_type {
    pub const ABSENT: u32 = 0;
    pub const ANONYMOUS: u32 = 1;
    pub const PRINCIPAL_NAME: u32 = 2;
    pub const X509_CERT_CHAIN: u32 = 4;
    pub const DISTINGUISHED_NAME: u32 = 8;
}

/// CSI::MsgType discriminators of the SASContextBody union
pub mod msg_type {
    pub const ESTABLISH_CONTEXT: i16 = 0;
    pub const COMPLETE_ESTABLISH_CONTEXT: i16 = 1;
    pub const CONTEXT_ERROR: i16 = 4;
    pub const MESSAGE_IN_CONTEXT: i16 = 5;
}

/// ContextError status codes
pub mod major_status {
    pub const INVALID_EVIDENCE: i32 = 1;
    pub const INVALID_MECHANISM: i32 = 2;
    pub const NO_CONTEXT: i32 = 4;
    /// Every ContextError we emit carries this minor status
    pub const MINOR_STATUS: i32 = 1;
}

/// GSS token framing
pub mod gss {
    /// DER encoding of the GSSUP mechanism OID 2.23.130.1.1.1
    pub const GSSUP_MECH_OID: &[u8] = &[0x06, 0x06, 0x67, 0x81, 0x02, 0x01, 0x01, 0x01];
    /// TOK_ID of an RFC 2743 exported name object
    pub const EXPORTED_NAME_TOK_ID: [u8; 2] = [0x04, 0x01];
    /// ASN.1 [APPLICATION 0] tag of an InitialContextToken
    pub const INITIAL_CONTEXT_TOKEN_TAG: u8 = 0x60;
    /// Realm appended to asserted principals that carry none
    pub const DEFAULT_REALM_SUFFIX: &str = "@default";
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_LOG_LEVEL: &str = "CSIV2_SAS_LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "CSIV2_SAS_LOG_FORMAT";
    pub const ENV_HOST: &str = "CSIV2_SAS_HOST";
    pub const ENV_SSL_PORT: &str = "CSIV2_SAS_SSL_PORT";
    pub const ENV_USERNAME: &str = "CSIV2_SAS_USERNAME";
    pub const ENV_PASSWORD: &str = "CSIV2_SAS_PASSWORD";
}

/// Codec Limits (DoS Protection)
pub mod limits {
    /// Upper bound on any single decoded sequence, independent of buffer size
    pub const MAX_SEQUENCE_LEN: usize = 16 * 1024 * 1024;
}
