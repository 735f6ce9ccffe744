// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use csiv2_sas::codec::CdrEncapsCodec;
use csiv2_sas::protocol::token::{
    decode_initial_context_token, decode_username_password_token, encode_username_password_token,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzCredentials {
    username: Vec<u8>,
    password: Vec<u8>,
    target_name: Vec<u8>,
}

fuzz_target!(|data: &[u8]| {
    let codec = CdrEncapsCodec::new();

    // Raw bytes: decode must fail cleanly, never panic.
    let _ = decode_initial_context_token(data, &codec);

    // Structured: whatever we frame must come back unchanged.
    let mut unstructured = Unstructured::new(data);
    if let Ok(input) = FuzzCredentials::arbitrary(&mut unstructured) {
        let token = encode_username_password_token(
            &input.username,
            &input.password,
            &input.target_name,
            &codec,
        )
        .unwrap();
        let decoded = decode_username_password_token(&token, &codec);
        assert_eq!(
            decoded,
            Some((input.username, input.password, input.target_name))
        );
    }
});
