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

//! Client Request Interceptor.
//!
//! Before each outgoing call: negotiate a mechanism against the target's
//! published list, then attach an `EstablishContext` carrying the asserted
//! identity and/or a GSSUP username/password token. A target we cannot match
//! is called without a SAS context; that is the compatible behaviour, not an
//! error.

use crate::codec::Codec;
use crate::config::ClientConfig;
use crate::engine_core::constants::{gss, identity_token_type, service_context};
use crate::engine_core::errors::SasError;
use crate::engine_core::models::{
    AssociationOptions, CompoundSecMech, ContextError, EstablishContext, IdentityToken,
    SasContextBody, ServiceContext, ServiceContextList, TaggedComponent,
};
use crate::engine_core::traits::IdentitySource;
use crate::engine_core::types::RequestId;
use crate::protocol::negotiation::{self, CALLER_REQUIRES};
use crate::protocol::token;
use tracing::{debug, info, warn};

/// One outgoing call as seen by the interceptor.
#[derive(Debug, Clone)]
pub struct ClientRequest {
    pub id: RequestId,
    pub operation: String,
    /// Tagged components of the target's IOR profile
    pub target_components: Vec<TaggedComponent>,
    /// Service contexts sent with the request
    pub request_contexts: ServiceContextList,
}

impl ClientRequest {
    pub fn new(operation: impl Into<String>, target_components: Vec<TaggedComponent>) -> Self {
        Self {
            id: RequestId::generate(),
            operation: operation.into(),
            target_components,
            request_contexts: ServiceContextList::new(),
        }
    }

    /// Raw SAS service context attached to the request, if any.
    pub fn sas_context(&self) -> Option<&ServiceContext> {
        self.request_contexts
            .get(service_context::SECURITY_ATTRIBUTE_SERVICE)
    }
}

/// What the target answered in its SAS reply context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SasReply {
    /// No SAS context on the reply
    None,
    Accepted { client_context_id: u64 },
    Rejected(ContextError),
    /// A body that has no business in a reply
    Unexpected(SasContextBody),
}

pub struct SasClientInterceptor<C: Codec, I: IdentitySource> {
    codec: C,
    identity: I,
    config: ClientConfig,
    supports: AssociationOptions,
}

impl<C: Codec, I: IdentitySource> SasClientInterceptor<C, I> {
    pub fn new(codec: C, identity: I, config: ClientConfig) -> Self {
        let supports = negotiation::caller_supports(config.identity_assertion);
        Self {
            codec,
            identity,
            config,
            supports,
        }
    }

    pub fn caller_supports(&self) -> AssociationOptions {
        self.supports
    }

    /// Attach an `EstablishContext` to `request` when the target calls for one.
    ///
    /// Only local encode failures are returned; they abort the call.
    pub fn send_request(&self, request: &mut ClientRequest) -> Result<(), SasError> {
        let mechs = negotiation::published_mechanisms(&request.target_components, &self.codec)?;
        let Some(mech) = negotiation::find_matching_mech(&mechs, self.supports, CALLER_REQUIRES)
        else {
            debug!(
                "[{}] {}: no SAS context sent (no matching mechanism)",
                request.id, request.operation
            );
            return Ok(());
        };

        let identity_token = self.identity_token(mech)?;
        let auth_token = self.authentication_token(mech)?;

        if identity_token.is_absent() && auth_token.is_empty() {
            debug!(
                "[{}] {}: nothing to assert or authenticate",
                request.id, request.operation
            );
            return Ok(());
        }

        let body = SasContextBody::EstablishContext(EstablishContext {
            client_context_id: 0,
            authorization_token: Vec::new(),
            identity_token,
            client_authentication_token: auth_token,
        });
        let data = self.codec.encode_value(&body)?;
        request.request_contexts.replace(ServiceContext {
            context_id: service_context::SECURITY_ATTRIBUTE_SERVICE,
            context_data: data,
        });
        debug!(
            "[{}] {}: attached EstablishContext",
            request.id, request.operation
        );
        Ok(())
    }

    fn identity_token(&self, mech: &CompoundSecMech) -> Result<IdentityToken, SasError> {
        let sas = &mech.sas_context_mech;
        if !self.config.identity_assertion
            || !sas
                .target_supports
                .contains(AssociationOptions::IDENTITY_ASSERTION)
        {
            return Ok(IdentityToken::Absent);
        }

        let caller = self
            .identity
            .current_run_as()
            .or_else(|| self.identity.current_principal());
        if let Some(principal) = caller {
            let scoped = principal.scoped_name();
            let name = token::encode_gss_name(gss::GSSUP_MECH_OID, scoped.as_bytes())?;
            return Ok(IdentityToken::PrincipalName(name));
        }
        if sas.supports_identity_type(identity_token_type::ANONYMOUS) {
            return Ok(IdentityToken::Anonymous);
        }
        Ok(IdentityToken::Absent)
    }

    fn authentication_token(&self, mech: &CompoundSecMech) -> Result<Vec<u8>, SasError> {
        let asm = &mech.as_context_mech;
        if !asm
            .target_requires
            .contains(AssociationOptions::ESTABLISH_TRUST_IN_CLIENT)
        {
            return Ok(Vec::new());
        }
        let Some(credential) = self
            .identity
            .current_credential()
            .or_else(|| self.config.credential())
        else {
            warn!("Target requires client authentication but no credential is available");
            return Ok(Vec::new());
        };
        Ok(token::encode_username_password_token(
            credential.username().as_bytes(),
            credential.password().as_bytes(),
            &asm.target_name,
            &self.codec,
        )?)
    }

    /// Inspect the SAS context of a normal reply.
    pub fn receive_reply(&self, reply_contexts: &ServiceContextList) -> Result<SasReply, SasError> {
        self.read_reply(reply_contexts)
    }

    /// Inspect the SAS context of an exception reply.
    pub fn receive_exception(
        &self,
        reply_contexts: &ServiceContextList,
    ) -> Result<SasReply, SasError> {
        self.read_reply(reply_contexts)
    }

    fn read_reply(&self, reply_contexts: &ServiceContextList) -> Result<SasReply, SasError> {
        let Some(ctx) = reply_contexts.get(service_context::SECURITY_ATTRIBUTE_SERVICE) else {
            return Ok(SasReply::None);
        };
        let body: SasContextBody = self
            .codec
            .decode_value(&ctx.context_data)
            .map_err(SasError::MalformedContextBody)?;
        Ok(match body {
            SasContextBody::CompleteEstablishContext(done) => {
                info!("Target accepted SAS context {}", done.client_context_id);
                SasReply::Accepted {
                    client_context_id: done.client_context_id,
                }
            }
            SasContextBody::ContextError(err) => {
                warn!(
                    "Target rejected SAS context {} (major={}, minor={})",
                    err.client_context_id, err.major_status, err.minor_status
                );
                SasReply::Rejected(err)
            }
            other => {
                warn!("Unexpected SAS message in reply: {:?}", other);
                SasReply::Unexpected(other)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CdrEncapsCodec;
    use crate::config::{
        AuthenticationProfile, CallerPropagation, IdentityProfile, IorSecurityConfig,
    };
    use crate::engine_core::traits::StaticIdentity;
    use crate::engine_core::types::{Credential, Principal};
    use crate::protocol::components::{Endpoint, TargetComponents};

    fn target(required_auth: bool, propagation: CallerPropagation) -> Vec<TaggedComponent> {
        let config = IorSecurityConfig {
            transport: None,
            authentication: Some(AuthenticationProfile {
                required: required_auth,
                ..Default::default()
            }),
            identity: Some(IdentityProfile {
                caller_propagation: propagation,
            }),
        };
        TargetComponents::build(&config, &Endpoint::new("h", 0), &CdrEncapsCodec::new())
            .unwrap()
            .to_components()
    }

    fn sent_body(request: &ClientRequest) -> EstablishContext {
        let ctx = request.sas_context().expect("SAS context attached");
        match CdrEncapsCodec::new().decode_value(&ctx.context_data).unwrap() {
            SasContextBody::EstablishContext(msg) => msg,
            other => panic!("Expected EstablishContext, got {:?}", other),
        }
    }

    #[test]
    fn test_no_published_mechanism_sends_nothing() {
        let client = SasClientInterceptor::new(
            CdrEncapsCodec::new(),
            StaticIdentity::anonymous(),
            ClientConfig::default(),
        );
        let mut request = ClientRequest::new("ping", Vec::new());
        client.send_request(&mut request).unwrap();
        assert!(request.request_contexts.is_empty());
    }

    #[test]
    fn test_nothing_to_send_when_target_asks_for_nothing() {
        let client = SasClientInterceptor::new(
            CdrEncapsCodec::new(),
            StaticIdentity::anonymous().with_principal(Principal::new("alice")),
            ClientConfig::default(),
        );
        let mut request = ClientRequest::new("ping", target(false, CallerPropagation::None));
        client.send_request(&mut request).unwrap();
        assert!(request.sas_context().is_none());
    }

    #[test]
    fn test_run_as_preferred_over_principal() {
        let client = SasClientInterceptor::new(
            CdrEncapsCodec::new(),
            StaticIdentity::anonymous()
                .with_principal(Principal::new("alice"))
                .with_run_as(Principal::new("batch@ops")),
            ClientConfig::default(),
        );
        let mut request = ClientRequest::new("ping", target(false, CallerPropagation::Supported));
        client.send_request(&mut request).unwrap();
        let msg = sent_body(&request);
        let expected = token::encode_gssup_name("batch@ops").unwrap();
        assert_eq!(msg.identity_token, IdentityToken::PrincipalName(expected));
        assert!(msg.client_authentication_token.is_empty());
    }

    #[test]
    fn test_anonymous_when_no_caller() {
        let client = SasClientInterceptor::new(
            CdrEncapsCodec::new(),
            StaticIdentity::anonymous(),
            ClientConfig::default(),
        );
        let mut request = ClientRequest::new("ping", target(false, CallerPropagation::Supported));
        client.send_request(&mut request).unwrap();
        assert_eq!(sent_body(&request).identity_token, IdentityToken::Anonymous);
    }

    #[test]
    fn test_configured_credential_is_fallback() {
        let config = ClientConfig {
            username: Some("svc".to_string()),
            password: Some("pw".to_string()),
            ..Default::default()
        };
        let client = SasClientInterceptor::new(
            CdrEncapsCodec::new(),
            StaticIdentity::anonymous(),
            config,
        );
        let mut request = ClientRequest::new("ping", target(true, CallerPropagation::None));
        client.send_request(&mut request).unwrap();
        let msg = sent_body(&request);
        assert!(msg.identity_token.is_absent());
        let (user, pass, _) = token::decode_username_password_token(
            &msg.client_authentication_token,
            &CdrEncapsCodec::new(),
        )
        .unwrap();
        assert_eq!(user, b"svc");
        assert_eq!(pass, b"pw");
    }

    #[test]
    fn test_identity_credential_wins_over_config() {
        let config = ClientConfig {
            username: Some("svc".to_string()),
            ..Default::default()
        };
        let client = SasClientInterceptor::new(
            CdrEncapsCodec::new(),
            StaticIdentity::anonymous().with_credential(Credential::new("alice", "secret")),
            config,
        );
        let mut request = ClientRequest::new("ping", target(true, CallerPropagation::None));
        client.send_request(&mut request).unwrap();
        let msg = sent_body(&request);
        let (user, _, _) = token::decode_username_password_token(
            &msg.client_authentication_token,
            &CdrEncapsCodec::new(),
        )
        .unwrap();
        assert_eq!(user, b"alice");
    }

    #[test]
    fn test_receive_reply_surfaces_rejection() {
        let client = SasClientInterceptor::new(
            CdrEncapsCodec::new(),
            StaticIdentity::anonymous(),
            ClientConfig::default(),
        );
        let mut contexts = ServiceContextList::new();
        assert_eq!(client.receive_reply(&contexts).unwrap(), SasReply::None);

        let reply = SasContextBody::reject(0, 1);
        contexts.replace(ServiceContext {
            context_id: service_context::SECURITY_ATTRIBUTE_SERVICE,
            context_data: CdrEncapsCodec::new().encode_value(&reply).unwrap(),
        });
        match client.receive_exception(&contexts).unwrap() {
            SasReply::Rejected(err) => assert_eq!(err.major_status, 1),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }
}
