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

//! Mechanism Negotiation.
//!
//! Client-side selection of a `CompoundSecMech` from the list a target
//! publishes in its IOR. Every requirement of one side must be satisfiable by
//! a capability of the other side; the first candidate that passes wins.

use crate::codec::Codec;
use crate::engine_core::constants::tags;
use crate::engine_core::errors::CodecError;
use crate::engine_core::models::{
    AssociationOptions, CompoundSecMech, CompoundSecMechList, TaggedComponent,
};
use tracing::{debug, trace};

/// Caller requirements are always empty: the client never insists on anything.
pub const CALLER_REQUIRES: AssociationOptions = AssociationOptions::NONE;

/// Capabilities the client advertises during matching.
pub fn caller_supports(identity_assertion: bool) -> AssociationOptions {
    if identity_assertion {
        AssociationOptions::ESTABLISH_TRUST_IN_CLIENT | AssociationOptions::IDENTITY_ASSERTION
    } else {
        AssociationOptions::ESTABLISH_TRUST_IN_CLIENT
    }
}

/// Whether `mech` is acceptable to a caller with the given capabilities.
pub fn is_compatible(
    mech: &CompoundSecMech,
    caller_supports: AssociationOptions,
    caller_requires: AssociationOptions,
) -> bool {
    let asm = &mech.as_context_mech;
    let sas = &mech.sas_context_mech;

    let trust_in_target = AssociationOptions::ESTABLISH_TRUST_IN_TARGET
        & (caller_requires ^ asm.target_supports)
        & !asm.target_supports;
    if !trust_in_target.is_empty() {
        trace!("Rejecting mechanism: target cannot establish trust in target");
        return false;
    }

    let trust_in_client = AssociationOptions::ESTABLISH_TRUST_IN_CLIENT
        & (asm.target_requires ^ caller_supports)
        & !caller_supports;
    if !trust_in_client.is_empty() {
        trace!("Rejecting mechanism: caller cannot establish trust in client");
        return false;
    }

    let identity = AssociationOptions::IDENTITY_ASSERTION
        & (sas.target_requires ^ caller_supports)
        & !caller_supports;
    if !identity.is_empty() {
        trace!("Rejecting mechanism: caller cannot assert identity");
        return false;
    }

    true
}

/// First mechanism in `mechs` acceptable to the caller, in published order.
pub fn find_matching_mech(
    mechs: &[CompoundSecMech],
    caller_supports: AssociationOptions,
    caller_requires: AssociationOptions,
) -> Option<&CompoundSecMech> {
    let found = mechs
        .iter()
        .find(|mech| is_compatible(mech, caller_supports, caller_requires));
    if found.is_none() {
        debug!(
            "No compatible mechanism among {} published (supports={}, requires={})",
            mechs.len(),
            caller_supports,
            caller_requires
        );
    }
    found
}

/// Mechanisms a target publishes in its `TAG_CSI_SEC_MECH_LIST` component.
///
/// A target without the component publishes nothing; that is not an error.
pub fn published_mechanisms<C: Codec + ?Sized>(
    components: &[TaggedComponent],
    codec: &C,
) -> Result<Vec<CompoundSecMech>, CodecError> {
    let Some(component) = components
        .iter()
        .find(|c| c.tag == tags::TAG_CSI_SEC_MECH_LIST)
    else {
        return Ok(Vec::new());
    };
    let list: CompoundSecMechList = codec.decode_value(&component.data)?;
    Ok(list.mechanism_list)
}
