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

//! Per-Request SAS State.
//!
//! Owned by exactly one in-flight server request. Created `Idle` when the
//! request arrives, consumed when the reply goes out. Nothing here is shared
//! between requests, so no locking is involved.

use crate::engine_core::constants::major_status;
use crate::engine_core::models::{IdentityToken, SasContextBody};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPhase {
    /// No SAS message seen (or not yet processed)
    #[default]
    Idle,
    /// A SAS message was processed and a reply is planned
    ContextDecoded,
    RepliedAccept,
    RepliedReject,
}

#[derive(Debug, Clone, Default)]
pub struct SasRequestState {
    phase: ContextPhase,
    context_received: bool,
    authentication_received: bool,
    client_context_id: u64,
    incoming_username: Vec<u8>,
    incoming_password: Vec<u8>,
    incoming_target_name: Vec<u8>,
    incoming_identity: IdentityToken,
    incoming_principal_name: Vec<u8>,
    reply: Option<SasContextBody>,
}

impl SasRequestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to `Idle`, dropping anything decoded earlier.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> ContextPhase {
        self.phase
    }

    pub fn context_received(&self) -> bool {
        self.context_received
    }

    pub fn authentication_received(&self) -> bool {
        self.authentication_received
    }

    pub fn client_context_id(&self) -> u64 {
        self.client_context_id
    }

    pub fn incoming_username(&self) -> &[u8] {
        &self.incoming_username
    }

    pub fn incoming_password(&self) -> &[u8] {
        &self.incoming_password
    }

    /// Realm name decoded from the token's exported target name.
    pub fn incoming_target_name(&self) -> &[u8] {
        &self.incoming_target_name
    }

    pub fn incoming_identity(&self) -> &IdentityToken {
        &self.incoming_identity
    }

    /// Asserted principal, decoded from a `PrincipalName` identity token.
    pub fn incoming_principal_name(&self) -> &[u8] {
        &self.incoming_principal_name
    }

    pub fn planned_reply(&self) -> Option<&SasContextBody> {
        self.reply.as_ref()
    }

    /// Flip the planned reply to `ContextError{invalid_evidence}`.
    ///
    /// Only meaningful once a context was received; otherwise a no-op.
    pub fn reject(&mut self) {
        if self.context_received {
            self.reply = Some(SasContextBody::reject(
                self.client_context_id,
                major_status::INVALID_EVIDENCE,
            ));
        }
    }

    pub(crate) fn begin_context(&mut self, client_context_id: u64) {
        self.client_context_id = client_context_id;
    }

    pub(crate) fn record_authentication(
        &mut self,
        username: Vec<u8>,
        password: Vec<u8>,
        target_name: Vec<u8>,
    ) {
        self.incoming_username = username;
        self.incoming_password = password;
        self.incoming_target_name = target_name;
        self.authentication_received = true;
    }

    pub(crate) fn record_identity(&mut self, token: IdentityToken, principal_name: Vec<u8>) {
        self.incoming_identity = token;
        self.incoming_principal_name = principal_name;
    }

    pub(crate) fn accept(&mut self) {
        self.context_received = true;
        self.plan_reply(SasContextBody::accept(self.client_context_id));
    }

    pub(crate) fn plan_reply(&mut self, reply: SasContextBody) {
        self.reply = Some(reply);
        self.phase = ContextPhase::ContextDecoded;
    }

    /// Take the planned reply for sending, moving to the matching replied phase.
    pub(crate) fn take_reply(&mut self) -> Option<SasContextBody> {
        let reply = self.reply.take()?;
        self.phase = if reply.is_accept() {
            ContextPhase::RepliedAccept
        } else {
            ContextPhase::RepliedReject
        };
        Some(reply)
    }

    /// Drop the planned reply without sending it.
    pub(crate) fn discard_reply(&mut self) -> Option<SasContextBody> {
        self.reply.take()
    }
}
