use csiv2_sas::codec::CdrEncapsCodec;
use csiv2_sas::engine_core::constants::gss;
use csiv2_sas::engine_core::models::{
    AsContextSec, AssociationOptions, CompoundSecMech, SasContextSec, TaggedComponent,
};
use csiv2_sas::protocol::negotiation::{caller_supports, find_matching_mech, CALLER_REQUIRES};
use csiv2_sas::protocol::token::{
    decode_gss_name, decode_username_password_token, der_length_octets, encode_gss_name,
    encode_username_password_token,
};
use proptest::prelude::*;

// --- Helpers ---

fn name_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(0usize),
        Just(1usize),
        Just(127usize),
        Just(128usize),
        Just(255usize),
        0usize..512,
    ]
    .prop_flat_map(|len| prop::collection::vec(any::<u8>(), len))
}

fn oid_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(gss::GSSUP_MECH_OID.to_vec()),
        prop::collection::vec(any::<u8>(), 0..32),
    ]
}

/// Username lengths that push the framed body across 127/128, 255/256 and 65535/65536.
fn boundary_len() -> impl Strategy<Value = usize> {
    prop_oneof![90usize..120, 220usize..250, 65_490usize..65_530]
}

fn mech_strategy() -> impl Strategy<Value = CompoundSecMech> {
    (any::<u16>(), any::<u16>(), any::<u16>(), any::<u16>()).prop_map(
        |(as_supports, as_requires, sas_supports, sas_requires)| CompoundSecMech {
            target_requires: AssociationOptions::from_bits(as_requires | sas_requires),
            transport_mech: TaggedComponent::null(),
            as_context_mech: AsContextSec {
                target_supports: AssociationOptions::from_bits(as_supports),
                target_requires: AssociationOptions::from_bits(as_requires),
                ..Default::default()
            },
            sas_context_mech: SasContextSec {
                target_supports: AssociationOptions::from_bits(sas_supports),
                target_requires: AssociationOptions::from_bits(sas_requires),
                ..Default::default()
            },
        },
    )
}

/// A mechanism no caller without IdentityAssertion can match.
fn unmatchable_mech() -> CompoundSecMech {
    CompoundSecMech {
        target_requires: AssociationOptions::IDENTITY_ASSERTION,
        transport_mech: TaggedComponent::null(),
        as_context_mech: AsContextSec::default(),
        sas_context_mech: SasContextSec {
            target_requires: AssociationOptions::IDENTITY_ASSERTION,
            ..Default::default()
        },
    }
}

/// Length-field octet count as read back from a framed token.
fn framed_length_octets(token: &[u8]) -> (usize, usize) {
    let first = token[1];
    if first < 0x80 {
        (first as usize, 1)
    } else {
        let n = (first & 0x7f) as usize;
        let len = token[2..2 + n]
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize);
        (len, 1 + n)
    }
}

proptest! {
    #[test]
    fn test_gss_name_roundtrip(oid in oid_strategy(), name in name_strategy()) {
        let encoded = encode_gss_name(&oid, &name).unwrap();
        prop_assert_eq!(encoded.len(), 2 + 2 + oid.len() + 4 + name.len());
        prop_assert_eq!(decode_gss_name(&encoded, &oid), Some((oid, name)));
    }

    #[test]
    fn test_gss_name_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = decode_gss_name(&data, gss::GSSUP_MECH_OID);
    }

    #[test]
    fn test_initial_context_token_roundtrip_across_length_forms(
        user_len in boundary_len(),
        password in prop::collection::vec(any::<u8>(), 0..4),
        realm in "[a-z]{0,8}",
    ) {
        let codec = CdrEncapsCodec::new();
        let username = vec![b'u'; user_len];
        let target = encode_gss_name(gss::GSSUP_MECH_OID, realm.as_bytes()).unwrap();

        let token = encode_username_password_token(&username, &password, &target, &codec).unwrap();
        prop_assert_eq!(token[0], 0x60);

        let (body_len, octets) = framed_length_octets(&token);
        prop_assert_eq!(octets, der_length_octets(body_len));
        prop_assert_eq!(1 + octets + body_len, token.len());
        let oid_start = 1 + octets;
        prop_assert_eq!(
            &token[oid_start..oid_start + gss::GSSUP_MECH_OID.len()],
            gss::GSSUP_MECH_OID
        );

        let decoded = decode_username_password_token(&token, &codec);
        prop_assert_eq!(decoded, Some((username, password, target)));
    }

    #[test]
    fn test_negotiation_is_deterministic(
        mechs in prop::collection::vec(mech_strategy(), 0..6),
        identity_assertion in any::<bool>(),
    ) {
        let supports = caller_supports(identity_assertion);
        let first = find_matching_mech(&mechs, supports, CALLER_REQUIRES).cloned();
        let second = find_matching_mech(&mechs, supports, CALLER_REQUIRES).cloned();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_unmatchable_mech_position_is_irrelevant(
        mechs in prop::collection::vec(mech_strategy(), 0..6),
        position in any::<prop::sample::Index>(),
    ) {
        let supports = caller_supports(false);
        let baseline = find_matching_mech(&mechs, supports, CALLER_REQUIRES).cloned();

        let mut shuffled = mechs.clone();
        let at = position.index(shuffled.len() + 1);
        shuffled.insert(at, unmatchable_mech());
        let result = find_matching_mech(&shuffled, supports, CALLER_REQUIRES).cloned();
        prop_assert_eq!(baseline, result);
    }
}

#[test]
fn test_boundaries_exercise_every_length_form() {
    let codec = CdrEncapsCodec::new();
    let mut seen = std::collections::BTreeSet::new();
    for user_len in (90..120).chain(220..250).chain(65_490..65_530) {
        let username = vec![b'u'; user_len];
        let token = encode_username_password_token(&username, b"", b"", &codec).unwrap();
        let (body_len, octets) = framed_length_octets(&token);
        assert_eq!(octets, der_length_octets(body_len));
        seen.insert(octets);
    }
    assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}
