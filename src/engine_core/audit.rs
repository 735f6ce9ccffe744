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

use crate::engine_core::models::SasContextBody;
use crate::engine_core::types::RequestId;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct AuditEntry<'a> {
    pub request_id: String,
    pub timestamp_ms: u64,
    pub operation: &'a str,
    pub outcome: &'static str,
    pub major_status: Option<i32>,
    pub principal: Option<String>,
}

impl<'a> AuditEntry<'a> {
    pub fn for_reply(
        request_id: &RequestId,
        operation: &'a str,
        reply: &SasContextBody,
        principal: &[u8],
    ) -> Self {
        let (outcome, major_status) = match reply {
            SasContextBody::CompleteEstablishContext(_) => ("accepted", None),
            SasContextBody::ContextError(err) => ("rejected", Some(err.major_status)),
            _ => ("other", None),
        };
        Self {
            request_id: request_id.to_string(),
            timestamp_ms: crate::utils::time::now_millis(),
            operation,
            outcome,
            major_status,
            principal: (!principal.is_empty())
                .then(|| String::from_utf8_lossy(principal).into_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn log(&self, entry: &AuditEntry<'_>) {
        let payload_str = serde_json::to_string(entry).unwrap_or_default();
        info!(
            target: "audit",
            payload = %payload_str,
            "SAS_AUDIT_LOG"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_core::constants::major_status;

    #[test]
    fn test_entry_for_reject() {
        let id = RequestId::generate();
        let reply = SasContextBody::reject(0, major_status::INVALID_MECHANISM);
        let entry = AuditEntry::for_reply(&id, "ping", &reply, b"");
        assert_eq!(entry.outcome, "rejected");
        assert_eq!(entry.major_status, Some(2));
        assert!(entry.principal.is_none());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["operation"], "ping");
    }

    #[test]
    fn test_entry_for_accept_names_principal() {
        let id = RequestId::generate();
        let reply = SasContextBody::accept(0);
        let entry = AuditEntry::for_reply(&id, "ping", &reply, b"alice@default");
        assert_eq!(entry.outcome, "accepted");
        assert_eq!(entry.principal.as_deref(), Some("alice@default"));
        AuditLogger::new().log(&entry);
    }
}
