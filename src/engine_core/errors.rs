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

// Domain error types for SAS context establishment

use crate::engine_core::constants::major_status;
use thiserror::Error;

/// Main error type for the SAS interceptors
#[derive(Error, Debug)]
pub enum SasError {
    /// Local encode/decode failure of a value we own (fatal to the call)
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// The SAS service context itself could not be decoded
    #[error("Malformed SAS context body: {0}")]
    MalformedContextBody(CodecError),

    /// The GSSUP client authentication token could not be decoded
    #[error("Error decoding GSSUP InitialContextToken")]
    InvalidAuthenticationToken,

    /// The target name inside the authentication token is not a GSSUP exported name
    #[error("Error decoding target name in InitialContextToken")]
    InvalidTargetName,

    /// The asserted principal name is not a GSSUP exported name
    #[error("Error decoding asserted principal name")]
    InvalidPrincipalName,

    /// Stateful context continuation received; this target never issues stateful contexts
    #[error("MessageInContext for client context {context_id}: stateful contexts unsupported")]
    UnexpectedContextMessage { context_id: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// I/O Error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML configuration parse error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),
}

/// CDR encoding/decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer ended before the value was complete
    #[error("Truncated data: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Encapsulation did not start with 0 or 1
    #[error("Invalid byte order flag: {0:#04x}")]
    InvalidByteOrder(u8),

    /// Boolean octet other than 0 or 1
    #[error("Invalid boolean octet: {0:#04x}")]
    InvalidBoolean(u8),

    /// Union discriminator not defined for the type
    #[error("Unknown {type_name} discriminator: {value}")]
    UnknownDiscriminator { type_name: &'static str, value: i64 },

    /// Extension variant carrying a discriminator that has its own variant
    #[error("{type_name} discriminator {value} is reserved for a standard variant")]
    ReservedDiscriminator { type_name: &'static str, value: i64 },

    /// Declared sequence length exceeds what the buffer can hold
    #[error("Sequence length {len} exceeds remaining {remaining} bytes")]
    SequenceTooLong { len: usize, remaining: usize },

    /// String is not NUL terminated, contains NUL or is not UTF-8
    #[error("Invalid string: {0}")]
    InvalidString(String),

    /// Length does not fit in a CDR ulong
    #[error("Length {0} does not fit in a CDR ulong")]
    LengthOverflow(usize),
}

impl SasError {
    /// Status of the ContextError reply this error is answered with, if any.
    pub fn major_status(&self) -> Option<i32> {
        match self {
            SasError::MalformedContextBody(_)
            | SasError::InvalidAuthenticationToken
            | SasError::InvalidTargetName
            | SasError::InvalidPrincipalName => Some(major_status::INVALID_MECHANISM),
            SasError::UnexpectedContextMessage { .. } => Some(major_status::NO_CONTEXT),
            _ => None,
        }
    }

    /// Fatal errors abort the call; everything else is answered on the wire.
    pub fn is_fatal(&self) -> bool {
        self.major_status().is_none()
    }
}
