use criterion::{black_box, criterion_group, criterion_main, Criterion};
use csiv2_sas::codec::{CdrEncapsCodec, Codec};
use csiv2_sas::config::{
    AuthenticationProfile, CallerPropagation, IdentityProfile, IorSecurityConfig,
    RequirementLevel, TransportSecurityProfile,
};
use csiv2_sas::engine_core::constants::gss;
use csiv2_sas::engine_core::models::{
    AssociationOptions, CompoundSecMechList, EstablishContext, IdentityToken, SasContextBody,
};
use csiv2_sas::protocol::components::{create_compound_sec_mechanisms, Endpoint};
use csiv2_sas::protocol::negotiation::{caller_supports, find_matching_mech, CALLER_REQUIRES};
use csiv2_sas::protocol::token::{
    decode_gss_name, decode_username_password_token, encode_gss_name,
    encode_username_password_token,
};

fn bench_gss_name(c: &mut Criterion) {
    let name = b"alice@default";
    let encoded = encode_gss_name(gss::GSSUP_MECH_OID, name).unwrap();

    c.bench_function("gss_name_encode", |b| {
        b.iter(|| encode_gss_name(black_box(gss::GSSUP_MECH_OID), black_box(name)))
    });
    c.bench_function("gss_name_decode", |b| {
        b.iter(|| decode_gss_name(black_box(&encoded), gss::GSSUP_MECH_OID))
    });
}

fn bench_initial_context_token(c: &mut Criterion) {
    let codec = CdrEncapsCodec::new();
    let target = encode_gss_name(gss::GSSUP_MECH_OID, b"default").unwrap();
    let token = encode_username_password_token(b"alice", b"wonderland", &target, &codec).unwrap();

    c.bench_function("ict_encode", |b| {
        b.iter(|| {
            encode_username_password_token(
                black_box(b"alice"),
                black_box(b"wonderland"),
                &target,
                &codec,
            )
        })
    });
    c.bench_function("ict_decode", |b| {
        b.iter(|| decode_username_password_token(black_box(&token), &codec))
    });
}

fn bench_sas_context_body(c: &mut Criterion) {
    let codec = CdrEncapsCodec::new();
    let body = SasContextBody::EstablishContext(EstablishContext {
        client_context_id: 0,
        authorization_token: Vec::new(),
        identity_token: IdentityToken::PrincipalName(
            encode_gss_name(gss::GSSUP_MECH_OID, b"alice@default").unwrap(),
        ),
        client_authentication_token: vec![0x60; 64],
    });
    let data = codec.encode_value(&body).unwrap();

    c.bench_function("sas_body_decode", |b| {
        b.iter(|| codec.decode_value::<SasContextBody>(black_box(&data)))
    });
}

fn bench_negotiation(c: &mut Criterion) {
    let codec = CdrEncapsCodec::new();
    let config = IorSecurityConfig {
        transport: Some(TransportSecurityProfile {
            integrity: RequirementLevel::Required,
            confidentiality: RequirementLevel::Required,
            ..Default::default()
        }),
        authentication: Some(AuthenticationProfile {
            required: true,
            ..Default::default()
        }),
        identity: Some(IdentityProfile {
            caller_propagation: CallerPropagation::Supported,
        }),
    };
    let mechs = create_compound_sec_mechanisms(&config, &Endpoint::new("h", 3529), &codec).unwrap();
    let list = CompoundSecMechList {
        stateful: false,
        mechanism_list: mechs.clone(),
    };
    let encoded = codec.encode_value(&list).unwrap();
    let supports = caller_supports(true);

    c.bench_function("find_matching_mech", |b| {
        b.iter(|| find_matching_mech(black_box(&mechs), supports, CALLER_REQUIRES))
    });
    c.bench_function("mech_list_decode_and_match", |b| {
        b.iter(|| {
            let list: CompoundSecMechList = codec.decode_value(black_box(&encoded)).unwrap();
            find_matching_mech(&list.mechanism_list, supports, AssociationOptions::NONE).is_some()
        })
    });
}

criterion_group!(
    benches,
    bench_gss_name,
    bench_initial_context_token,
    bench_sas_context_body,
    bench_negotiation
);
criterion_main!(benches);
