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

//! Identity Boundary.
//!
//! The security context of the calling thread is owned by the host; the client
//! interceptor only asks it who is calling and with which credentials.

use crate::engine_core::types::{Credential, Principal};
use std::sync::Arc;

/// Source of the caller's identity for an outgoing request.
pub trait IdentitySource: Send + Sync {
    /// The authenticated caller, if any.
    fn current_principal(&self) -> Option<Principal>;

    /// A run-as identity in effect; asserted in preference to the caller.
    fn current_run_as(&self) -> Option<Principal> {
        None
    }

    /// Username/password for the GSSUP token.
    fn current_credential(&self) -> Option<Credential> {
        None
    }
}

impl<T: IdentitySource + ?Sized> IdentitySource for Arc<T> {
    fn current_principal(&self) -> Option<Principal> {
        (**self).current_principal()
    }

    fn current_run_as(&self) -> Option<Principal> {
        (**self).current_run_as()
    }

    fn current_credential(&self) -> Option<Credential> {
        (**self).current_credential()
    }
}

/// Fixed identity, for tools, tests and single-identity clients.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    principal: Option<Principal>,
    run_as: Option<Principal>,
    credential: Option<Credential>,
}

impl StaticIdentity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_run_as(mut self, run_as: Principal) -> Self {
        self.run_as = Some(run_as);
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

impl IdentitySource for StaticIdentity {
    fn current_principal(&self) -> Option<Principal> {
        self.principal.clone()
    }

    fn current_run_as(&self) -> Option<Principal> {
        self.run_as.clone()
    }

    fn current_credential(&self) -> Option<Credential> {
        self.credential.clone()
    }
}
