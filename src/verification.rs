// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

//! Formal Verification Module (Kani Proofs)
//!
//! Proofs run the real matching predicate over symbolic association bitmasks.
//! Mechanisms are built with empty sequences only, which never allocate.

#[cfg(kani)]
mod verification {
    use crate::engine_core::models::{
        AsContextSec, AssociationOptions, CompoundSecMech, SasContextSec, TaggedComponent,
    };
    use crate::protocol::negotiation::is_compatible;

    fn symbolic_mech() -> CompoundSecMech {
        CompoundSecMech {
            target_requires: AssociationOptions::from_bits(kani::any()),
            transport_mech: TaggedComponent::null(),
            as_context_mech: AsContextSec {
                target_supports: AssociationOptions::from_bits(kani::any()),
                target_requires: AssociationOptions::from_bits(kani::any()),
                client_authentication_mech: Vec::new(),
                target_name: Vec::new(),
            },
            sas_context_mech: SasContextSec {
                target_supports: AssociationOptions::from_bits(kani::any()),
                target_requires: AssociationOptions::from_bits(kani::any()),
                privilege_authorities: Vec::new(),
                supported_naming_mechanisms: Vec::new(),
                supported_identity_types: kani::any(),
            },
        }
    }

    // =========================================================================
    // PROOF 1: CLIENT AUTH REQUIREMENT IS NEVER IGNORED
    // =========================================================================
    #[kani::proof]
    fn prove_client_auth_requirement_honoured() {
        let mech = symbolic_mech();
        let supports = AssociationOptions::from_bits(kani::any());
        let requires = AssociationOptions::from_bits(kani::any());
        kani::assume(
            mech.as_context_mech
                .target_requires
                .contains(AssociationOptions::ESTABLISH_TRUST_IN_CLIENT),
        );
        if is_compatible(&mech, supports, requires) {
            kani::assert(
                supports.contains(AssociationOptions::ESTABLISH_TRUST_IN_CLIENT),
                "CRITICAL: match despite unsatisfiable client auth requirement",
            );
        }
    }

    // =========================================================================
    // PROOF 2: IDENTITY ASSERTION REQUIREMENT IS NEVER IGNORED
    // =========================================================================
    #[kani::proof]
    fn prove_identity_requirement_honoured() {
        let mech = symbolic_mech();
        let supports = AssociationOptions::from_bits(kani::any());
        let requires = AssociationOptions::from_bits(kani::any());
        kani::assume(
            mech.sas_context_mech
                .target_requires
                .contains(AssociationOptions::IDENTITY_ASSERTION),
        );
        if is_compatible(&mech, supports, requires) {
            kani::assert(
                supports.contains(AssociationOptions::IDENTITY_ASSERTION),
                "CRITICAL: match despite unsatisfiable identity requirement",
            );
        }
    }

    // =========================================================================
    // PROOF 3: TRUST IN TARGET REQUIRED BY CALLER NEEDS TARGET SUPPORT
    // =========================================================================
    #[kani::proof]
    fn prove_trust_in_target_honoured() {
        let mech = symbolic_mech();
        let supports = AssociationOptions::from_bits(kani::any());
        let requires = AssociationOptions::from_bits(kani::any());
        kani::assume(requires.contains(AssociationOptions::ESTABLISH_TRUST_IN_TARGET));
        if is_compatible(&mech, supports, requires) {
            kani::assert(
                mech.as_context_mech
                    .target_supports
                    .contains(AssociationOptions::ESTABLISH_TRUST_IN_TARGET),
                "CRITICAL: caller requirement matched without target support",
            );
        }
    }

    // =========================================================================
    // PROOF 4: A FULLY CAPABLE CALLER WITH NO REQUIREMENTS ALWAYS MATCHES
    // =========================================================================
    #[kani::proof]
    fn prove_capable_caller_matches() {
        let mech = symbolic_mech();
        let supports = AssociationOptions::ESTABLISH_TRUST_IN_CLIENT
            | AssociationOptions::IDENTITY_ASSERTION;
        kani::assert(
            is_compatible(&mech, supports, AssociationOptions::NONE),
            "Capable caller must match any mechanism",
        );
    }
}
