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

// CDR shapes of the CSIIOP, CSI and GSSUP IDL types.

use super::{CdrReader, CdrValue, CdrWriter};
use crate::engine_core::constants::{identity_token_type, msg_type};
use crate::engine_core::errors::CodecError;
use crate::engine_core::models::{
    AsContextSec, AssociationOptions, AuthorizationElement, CompleteEstablishContext,
    CompoundSecMech, CompoundSecMechList, ContextError, EstablishContext, IdentityToken,
    InitialContextToken, MessageInContext, SasContextBody, SasContextSec, ServiceConfiguration,
    SslComponent, TaggedComponent, TlsSecTrans, TransportAddress,
};

fn write_seq<T: CdrValue>(w: &mut CdrWriter, items: &[T]) -> Result<(), CodecError> {
    w.write_len(items.len())?;
    items.iter().try_for_each(|item| item.write_cdr(w))
}

fn read_seq<T: CdrValue>(r: &mut CdrReader<'_>) -> Result<Vec<T>, CodecError> {
    let len = r.read_len()?;
    (0..len).map(|_| T::read_cdr(r)).collect()
}

fn read_options(r: &mut CdrReader<'_>) -> Result<AssociationOptions, CodecError> {
    r.read_u16().map(AssociationOptions::from_bits)
}

fn is_standard_identity_type(token_type: u32) -> bool {
    matches!(
        token_type,
        identity_token_type::ABSENT
            | identity_token_type::ANONYMOUS
            | identity_token_type::PRINCIPAL_NAME
            | identity_token_type::X509_CERT_CHAIN
            | identity_token_type::DISTINGUISHED_NAME
    )
}

impl CdrValue for TaggedComponent {
    const TYPE_NAME: &'static str = "IOP::TaggedComponent";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u32(self.tag);
        w.write_octets(&self.data)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        let tag = r.read_u32()?;
        let data = r.read_octets()?;
        Ok(TaggedComponent::new(tag, data))
    }
}

impl CdrValue for TransportAddress {
    const TYPE_NAME: &'static str = "CSIIOP::TransportAddress";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_string(&self.host_name)?;
        w.write_u16(self.port);
        Ok(())
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(TransportAddress {
            host_name: r.read_string()?,
            port: r.read_u16()?,
        })
    }
}

impl CdrValue for TlsSecTrans {
    const TYPE_NAME: &'static str = "CSIIOP::TLS_SEC_TRANS";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u16(self.target_supports.bits());
        w.write_u16(self.target_requires.bits());
        write_seq(w, &self.addresses)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(TlsSecTrans {
            target_supports: read_options(r)?,
            target_requires: read_options(r)?,
            addresses: read_seq(r)?,
        })
    }
}

impl CdrValue for SslComponent {
    const TYPE_NAME: &'static str = "SSLIOP::SSL";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u16(self.target_supports.bits());
        w.write_u16(self.target_requires.bits());
        w.write_u16(self.port);
        Ok(())
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(SslComponent {
            target_supports: read_options(r)?,
            target_requires: read_options(r)?,
            port: r.read_u16()?,
        })
    }
}

impl CdrValue for AsContextSec {
    const TYPE_NAME: &'static str = "CSIIOP::AS_ContextSec";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u16(self.target_supports.bits());
        w.write_u16(self.target_requires.bits());
        w.write_octets(&self.client_authentication_mech)?;
        w.write_octets(&self.target_name)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(AsContextSec {
            target_supports: read_options(r)?,
            target_requires: read_options(r)?,
            client_authentication_mech: r.read_octets()?,
            target_name: r.read_octets()?,
        })
    }
}

impl CdrValue for ServiceConfiguration {
    const TYPE_NAME: &'static str = "CSIIOP::ServiceConfiguration";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u32(self.syntax);
        w.write_octets(&self.name)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(ServiceConfiguration {
            syntax: r.read_u32()?,
            name: r.read_octets()?,
        })
    }
}

impl CdrValue for SasContextSec {
    const TYPE_NAME: &'static str = "CSIIOP::SAS_ContextSec";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u16(self.target_supports.bits());
        w.write_u16(self.target_requires.bits());
        write_seq(w, &self.privilege_authorities)?;
        w.write_len(self.supported_naming_mechanisms.len())?;
        for oid in &self.supported_naming_mechanisms {
            w.write_octets(oid)?;
        }
        w.write_u32(self.supported_identity_types);
        Ok(())
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        let target_supports = read_options(r)?;
        let target_requires = read_options(r)?;
        let privilege_authorities = read_seq(r)?;
        let count = r.read_len()?;
        let supported_naming_mechanisms = (0..count)
            .map(|_| r.read_octets())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SasContextSec {
            target_supports,
            target_requires,
            privilege_authorities,
            supported_naming_mechanisms,
            supported_identity_types: r.read_u32()?,
        })
    }
}

impl CdrValue for CompoundSecMech {
    const TYPE_NAME: &'static str = "CSIIOP::CompoundSecMech";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u16(self.target_requires.bits());
        self.transport_mech.write_cdr(w)?;
        self.as_context_mech.write_cdr(w)?;
        self.sas_context_mech.write_cdr(w)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(CompoundSecMech {
            target_requires: read_options(r)?,
            transport_mech: TaggedComponent::read_cdr(r)?,
            as_context_mech: AsContextSec::read_cdr(r)?,
            sas_context_mech: SasContextSec::read_cdr(r)?,
        })
    }
}

impl CdrValue for CompoundSecMechList {
    const TYPE_NAME: &'static str = "CSIIOP::CompoundSecMechList";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_bool(self.stateful);
        write_seq(w, &self.mechanism_list)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(CompoundSecMechList {
            stateful: r.read_bool()?,
            mechanism_list: read_seq(r)?,
        })
    }
}

impl CdrValue for IdentityToken {
    const TYPE_NAME: &'static str = "CSI::IdentityToken";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        if let IdentityToken::Extension { token_type, .. } = self {
            if is_standard_identity_type(*token_type) {
                return Err(CodecError::ReservedDiscriminator {
                    type_name: Self::TYPE_NAME,
                    value: i64::from(*token_type),
                });
            }
        }
        w.write_u32(self.token_type());
        match self {
            IdentityToken::Absent | IdentityToken::Anonymous => {
                w.write_bool(true);
                Ok(())
            }
            IdentityToken::PrincipalName(data)
            | IdentityToken::CertificateChain(data)
            | IdentityToken::DistinguishedName(data)
            | IdentityToken::Extension { data, .. } => w.write_octets(data),
        }
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        let token_type = r.read_u32()?;
        Ok(match token_type {
            identity_token_type::ABSENT => {
                r.read_bool()?;
                IdentityToken::Absent
            }
            identity_token_type::ANONYMOUS => {
                r.read_bool()?;
                IdentityToken::Anonymous
            }
            identity_token_type::PRINCIPAL_NAME => IdentityToken::PrincipalName(r.read_octets()?),
            identity_token_type::X509_CERT_CHAIN => {
                IdentityToken::CertificateChain(r.read_octets()?)
            }
            identity_token_type::DISTINGUISHED_NAME => {
                IdentityToken::DistinguishedName(r.read_octets()?)
            }
            token_type => IdentityToken::Extension {
                token_type,
                data: r.read_octets()?,
            },
        })
    }
}

impl CdrValue for AuthorizationElement {
    const TYPE_NAME: &'static str = "CSI::AuthorizationElement";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_u32(self.the_type);
        w.write_octets(&self.the_element)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(AuthorizationElement {
            the_type: r.read_u32()?,
            the_element: r.read_octets()?,
        })
    }
}

impl CdrValue for SasContextBody {
    const TYPE_NAME: &'static str = "CSI::SASContextBody";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        match self {
            SasContextBody::EstablishContext(m) => {
                w.write_i16(msg_type::ESTABLISH_CONTEXT);
                w.write_u64(m.client_context_id);
                write_seq(w, &m.authorization_token)?;
                m.identity_token.write_cdr(w)?;
                w.write_octets(&m.client_authentication_token)
            }
            SasContextBody::CompleteEstablishContext(m) => {
                w.write_i16(msg_type::COMPLETE_ESTABLISH_CONTEXT);
                w.write_u64(m.client_context_id);
                w.write_bool(m.context_stateful);
                w.write_octets(&m.final_context_token)
            }
            SasContextBody::ContextError(m) => {
                w.write_i16(msg_type::CONTEXT_ERROR);
                w.write_u64(m.client_context_id);
                w.write_i32(m.major_status);
                w.write_i32(m.minor_status);
                w.write_octets(&m.error_token)
            }
            SasContextBody::MessageInContext(m) => {
                w.write_i16(msg_type::MESSAGE_IN_CONTEXT);
                w.write_u64(m.client_context_id);
                w.write_bool(m.discard_context);
                Ok(())
            }
        }
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        let discriminator = r.read_i16()?;
        match discriminator {
            msg_type::ESTABLISH_CONTEXT => Ok(SasContextBody::EstablishContext(EstablishContext {
                client_context_id: r.read_u64()?,
                authorization_token: read_seq(r)?,
                identity_token: IdentityToken::read_cdr(r)?,
                client_authentication_token: r.read_octets()?,
            })),
            msg_type::COMPLETE_ESTABLISH_CONTEXT => Ok(SasContextBody::CompleteEstablishContext(
                CompleteEstablishContext {
                    client_context_id: r.read_u64()?,
                    context_stateful: r.read_bool()?,
                    final_context_token: r.read_octets()?,
                },
            )),
            msg_type::CONTEXT_ERROR => Ok(SasContextBody::ContextError(ContextError {
                client_context_id: r.read_u64()?,
                major_status: r.read_i32()?,
                minor_status: r.read_i32()?,
                error_token: r.read_octets()?,
            })),
            msg_type::MESSAGE_IN_CONTEXT => Ok(SasContextBody::MessageInContext(MessageInContext {
                client_context_id: r.read_u64()?,
                discard_context: r.read_bool()?,
            })),
            value => Err(CodecError::UnknownDiscriminator {
                type_name: Self::TYPE_NAME,
                value: i64::from(value),
            }),
        }
    }
}

impl CdrValue for InitialContextToken {
    const TYPE_NAME: &'static str = "GSSUP::InitialContextToken";

    fn write_cdr(&self, w: &mut CdrWriter) -> Result<(), CodecError> {
        w.write_octets(&self.username)?;
        w.write_octets(&self.password)?;
        w.write_octets(&self.target_name)
    }

    fn read_cdr(r: &mut CdrReader<'_>) -> Result<Self, CodecError> {
        Ok(InitialContextToken {
            username: r.read_octets()?,
            password: r.read_octets()?,
            target_name: r.read_octets()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CdrEncapsCodec, Codec};
    use crate::engine_core::constants::{major_status, tags};

    #[test]
    fn test_context_error_wire_layout() {
        let codec = CdrEncapsCodec::new();
        let bytes = codec
            .encode_value(&SasContextBody::reject(0, major_status::NO_CONTEXT))
            .unwrap();
        let expected: Vec<u8> = vec![
            0, 0, // flag, pad
            0, 4, // discriminator ContextError
            0, 0, 0, 0, // pad to 8
            0, 0, 0, 0, 0, 0, 0, 0, // client_context_id
            0, 0, 0, 4, // major
            0, 0, 0, 1, // minor
            0, 0, 0, 0, // empty error token
        ];
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_establish_context_decodes_what_it_encodes() {
        let codec = CdrEncapsCodec::new();
        let msg = SasContextBody::EstablishContext(EstablishContext {
            client_context_id: 0,
            authorization_token: vec![],
            identity_token: IdentityToken::PrincipalName(vec![4, 1, 0, 0]),
            client_authentication_token: vec![0x60, 0x01, 0x00],
        });
        let bytes = codec.encode_value(&msg).unwrap();
        let decoded: SasContextBody = codec.decode_value(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_unknown_msg_type_rejected() {
        let codec = CdrEncapsCodec::new();
        let data = [0u8, 0, 0, 3];
        let err = codec.decode_value::<SasContextBody>(&data).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnknownDiscriminator { value: 3, .. }
        ));
    }

    #[test]
    fn test_identity_extension_preserved() {
        let codec = CdrEncapsCodec::new();
        let token = IdentityToken::Extension {
            token_type: 0x100,
            data: vec![9, 9],
        };
        let bytes = codec.encode_value(&token).unwrap();
        assert_eq!(codec.decode_value::<IdentityToken>(&bytes).unwrap(), token);
    }

    #[test]
    fn test_extension_with_standard_type_rejected_on_encode() {
        let codec = CdrEncapsCodec::new();
        for token_type in [0u32, 1, 2, 4, 8] {
            let token = IdentityToken::Extension {
                token_type,
                data: vec![1],
            };
            let err = codec.encode_value(&token).unwrap_err();
            assert_eq!(
                err,
                CodecError::ReservedDiscriminator {
                    type_name: IdentityToken::TYPE_NAME,
                    value: i64::from(token_type),
                }
            );
        }
        // non-standard values below 8 are still extensions
        let token = IdentityToken::Extension {
            token_type: 3,
            data: vec![1],
        };
        let bytes = codec.encode_value(&token).unwrap();
        assert_eq!(codec.decode_value::<IdentityToken>(&bytes).unwrap(), token);
    }

    #[test]
    fn test_mech_list_with_null_transport() {
        let codec = CdrEncapsCodec::new();
        let list = CompoundSecMechList {
            stateful: false,
            mechanism_list: vec![CompoundSecMech {
                target_requires: AssociationOptions::NONE,
                transport_mech: TaggedComponent::null(),
                as_context_mech: AsContextSec::default(),
                sas_context_mech: SasContextSec::default(),
            }],
        };
        let bytes = codec.encode_value(&list).unwrap();
        let decoded: CompoundSecMechList = codec.decode_value(&bytes).unwrap();
        assert_eq!(decoded.mechanism_list[0].transport_mech.tag, tags::TAG_NULL_TAG);
        assert_eq!(decoded, list);
    }
}
