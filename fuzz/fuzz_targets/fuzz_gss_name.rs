// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use csiv2_sas::engine_core::constants::gss;
use csiv2_sas::protocol::token::{decode_gss_name, encode_gss_name};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the decoder.
    if let Some((oid, name)) = decode_gss_name(data, gss::GSSUP_MECH_OID) {
        // Anything accepted re-encodes to the exact input.
        let encoded = encode_gss_name(&oid, &name).unwrap();
        assert_eq!(encoded, data);
    }
});
