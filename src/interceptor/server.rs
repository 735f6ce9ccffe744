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

//! Server Request Interceptor.
//!
//! State machine per request: `Idle -> ContextDecoded -> RepliedAccept | RepliedReject`.
//!
//! `receive_request` decodes the incoming SAS message into the request's own
//! [`SasRequestState`] and plans a reply. Malformed data and protocol
//! violations still plan a `ContextError` and are additionally returned as a
//! `SasError` for the host to log; the call itself carries on. Exactly one of
//! `send_reply`, `send_exception` or `send_other` then finishes the request.

use crate::codec::Codec;
pub use crate::config::ServerOptions;
use crate::engine_core::audit::{AuditEntry, AuditLogger};
use crate::engine_core::constants::{major_status, service_context};
use crate::engine_core::errors::SasError;
use crate::engine_core::models::{
    EstablishContext, IdentityToken, SasContextBody, ServiceContext, ServiceContextList,
};
use crate::engine_core::request_state::SasRequestState;
use crate::engine_core::types::RequestId;
use crate::protocol::token;
use tracing::{debug, warn};

/// `(username, password, target realm)` and the asserted principal name.
type DecodedEvidence = (Option<(Vec<u8>, Vec<u8>, Vec<u8>)>, Vec<u8>);

/// One incoming call, carrying its own SAS state.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    pub id: RequestId,
    pub operation: String,
    pub request_contexts: ServiceContextList,
    pub reply_contexts: ServiceContextList,
    sas: SasRequestState,
}

impl ServerRequest {
    pub fn new(operation: impl Into<String>, request_contexts: ServiceContextList) -> Self {
        Self {
            id: RequestId::generate(),
            operation: operation.into(),
            request_contexts,
            reply_contexts: ServiceContextList::new(),
            sas: SasRequestState::new(),
        }
    }

    /// Decoded results for the authorization layer.
    pub fn sas(&self) -> &SasRequestState {
        &self.sas
    }

    /// Reject a received context after the fact (e.g. bad password).
    pub fn reject(&mut self) {
        self.sas.reject();
    }

    /// Raw SAS service context attached to the reply, if any.
    pub fn sas_reply_context(&self) -> Option<&ServiceContext> {
        self.reply_contexts
            .get(service_context::SECURITY_ATTRIBUTE_SERVICE)
    }
}

pub struct SasServerInterceptor<C: Codec> {
    codec: C,
    options: ServerOptions,
    audit: AuditLogger,
}

impl<C: Codec> SasServerInterceptor<C> {
    pub fn new(codec: C, options: ServerOptions) -> Self {
        Self {
            codec,
            options,
            audit: AuditLogger::new(),
        }
    }

    pub fn receive_request(&self, request: &mut ServerRequest) -> Result<(), SasError> {
        request.sas.reset();

        let Some(ctx) = request
            .request_contexts
            .get(service_context::SECURITY_ATTRIBUTE_SERVICE)
        else {
            return Ok(());
        };

        let body = match self.codec.decode_value::<SasContextBody>(&ctx.context_data) {
            Ok(body) => body,
            Err(e) => {
                warn!("[{}] Malformed SAS context: {}", request.id, e);
                request
                    .sas
                    .plan_reply(SasContextBody::reject(0, major_status::INVALID_MECHANISM));
                return Err(SasError::MalformedContextBody(e));
            }
        };

        match body {
            SasContextBody::EstablishContext(msg) => {
                let result = Self::establish(&mut request.sas, msg, &self.codec);
                if let Err(e) = &result {
                    warn!("[{}] {}", request.id, e);
                }
                result
            }
            SasContextBody::MessageInContext(msg) => {
                let err = SasError::UnexpectedContextMessage {
                    context_id: msg.client_context_id,
                };
                warn!("[{}] {}", request.id, err);
                request.sas.plan_reply(SasContextBody::reject(
                    msg.client_context_id,
                    major_status::NO_CONTEXT,
                ));
                Err(err)
            }
            other => {
                debug!(
                    "[{}] Ignoring reply-only SAS message in request (context {})",
                    request.id,
                    other.client_context_id()
                );
                Ok(())
            }
        }
    }

    fn establish(
        state: &mut SasRequestState,
        msg: EstablishContext,
        codec: &C,
    ) -> Result<(), SasError> {
        let id = msg.client_context_id;
        state.begin_context(id);

        let (authentication, principal_name) = match Self::decode_evidence(&msg, codec) {
            Ok(evidence) => evidence,
            Err(e) => {
                state.plan_reply(SasContextBody::reject(id, major_status::INVALID_MECHANISM));
                return Err(e);
            }
        };

        // Nothing is recorded unless every token decoded.
        if let Some((username, password, target_name)) = authentication {
            state.record_authentication(username, password, target_name);
        }
        if !msg.identity_token.is_absent() {
            state.record_identity(msg.identity_token, principal_name);
        }

        state.accept();
        Ok(())
    }

    /// Decode the authentication token and asserted principal name, if present.
    fn decode_evidence(msg: &EstablishContext, codec: &C) -> Result<DecodedEvidence, SasError> {
        let authentication = if msg.client_authentication_token.is_empty() {
            None
        } else {
            let initial =
                token::decode_initial_context_token(&msg.client_authentication_token, codec)
                    .ok_or(SasError::InvalidAuthenticationToken)?;
            let target_name = token::decode_gssup_name(&initial.target_name)
                .ok_or(SasError::InvalidTargetName)?;
            Some((initial.username, initial.password, target_name))
        };

        let principal_name = match &msg.identity_token {
            IdentityToken::PrincipalName(encoded) => {
                token::decode_gssup_name(encoded).ok_or(SasError::InvalidPrincipalName)?
            }
            _ => Vec::new(),
        };
        Ok((authentication, principal_name))
    }

    /// Attach the planned reply, if any, to a normal reply.
    pub fn send_reply(&self, request: &mut ServerRequest) -> Result<(), SasError> {
        self.attach_reply(request)
    }

    /// Attach the planned reply, if any, to an exception reply.
    ///
    /// With `suppress_accept_with_exception` an accept is dropped instead.
    pub fn send_exception(&self, request: &mut ServerRequest) -> Result<(), SasError> {
        let accept_planned = request
            .sas
            .planned_reply()
            .is_some_and(SasContextBody::is_accept);
        if self.options.suppress_accept_with_exception && accept_planned {
            debug!(
                "[{}] Not sending CompleteEstablishContext with exception",
                request.id
            );
            request.sas.discard_reply();
            return Ok(());
        }
        self.attach_reply(request)
    }

    /// Location-forward and similar replies never carry a SAS message.
    pub fn send_other(&self, request: &mut ServerRequest) -> Result<(), SasError> {
        if request.sas.discard_reply().is_some() {
            debug!("[{}] Dropping planned SAS reply on forward", request.id);
        }
        Ok(())
    }

    fn attach_reply(&self, request: &mut ServerRequest) -> Result<(), SasError> {
        let Some(reply) = request.sas.take_reply() else {
            return Ok(());
        };
        let data = self.codec.encode_value(&reply)?;
        request.reply_contexts.replace(ServiceContext {
            context_id: service_context::SECURITY_ATTRIBUTE_SERVICE,
            context_data: data,
        });
        self.audit.log(&AuditEntry::for_reply(
            &request.id,
            &request.operation,
            &reply,
            request.sas.incoming_principal_name(),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CdrEncapsCodec;
    use crate::engine_core::request_state::ContextPhase;
    use bytes::Bytes;

    fn request_with(body: &SasContextBody) -> ServerRequest {
        let mut contexts = ServiceContextList::new();
        contexts.replace(ServiceContext {
            context_id: service_context::SECURITY_ATTRIBUTE_SERVICE,
            context_data: CdrEncapsCodec::new().encode_value(body).unwrap(),
        });
        ServerRequest::new("ping", contexts)
    }

    #[test]
    fn test_identity_only_context_accepted() {
        let server = SasServerInterceptor::new(CdrEncapsCodec::new(), ServerOptions::default());
        let mut request = request_with(&SasContextBody::EstablishContext(EstablishContext {
            client_context_id: 0,
            authorization_token: Vec::new(),
            identity_token: IdentityToken::Anonymous,
            client_authentication_token: Vec::new(),
        }));
        server.receive_request(&mut request).unwrap();
        assert!(request.sas().context_received());
        assert!(!request.sas().authentication_received());
        assert_eq!(request.sas().incoming_identity(), &IdentityToken::Anonymous);
        assert_eq!(request.sas().phase(), ContextPhase::ContextDecoded);

        server.send_reply(&mut request).unwrap();
        assert_eq!(request.sas().phase(), ContextPhase::RepliedAccept);
        assert!(request.sas_reply_context().is_some());
    }

    #[test]
    fn test_garbage_context_planned_as_invalid_mechanism() {
        let server = SasServerInterceptor::new(CdrEncapsCodec::new(), ServerOptions::default());
        let mut contexts = ServiceContextList::new();
        contexts.replace(ServiceContext {
            context_id: service_context::SECURITY_ATTRIBUTE_SERVICE,
            context_data: Bytes::from_static(&[7, 7, 7]),
        });
        let mut request = ServerRequest::new("ping", contexts);
        let err = server.receive_request(&mut request).unwrap_err();
        assert!(matches!(err, SasError::MalformedContextBody(_)));
        assert_eq!(err.major_status(), Some(major_status::INVALID_MECHANISM));
        assert!(!request.sas().context_received());
        assert!(!request.sas().planned_reply().unwrap().is_accept());
    }

    #[test]
    fn test_reply_body_in_request_is_ignored() {
        let server = SasServerInterceptor::new(CdrEncapsCodec::new(), ServerOptions::default());
        let mut request = request_with(&SasContextBody::accept(0));
        server.receive_request(&mut request).unwrap();
        assert!(request.sas().planned_reply().is_none());
        server.send_reply(&mut request).unwrap();
        assert!(request.reply_contexts.is_empty());
    }
}
