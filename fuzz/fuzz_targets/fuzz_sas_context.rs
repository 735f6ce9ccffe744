// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use bytes::Bytes;
use csiv2_sas::codec::CdrEncapsCodec;
use csiv2_sas::engine_core::constants::service_context;
use csiv2_sas::engine_core::models::{ServiceContext, ServiceContextList};
use csiv2_sas::interceptor::{SasServerInterceptor, ServerOptions, ServerRequest};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Drive the server state machine with an arbitrary SAS context body.
    let server = SasServerInterceptor::new(CdrEncapsCodec::new(), ServerOptions::default());
    let mut contexts = ServiceContextList::new();
    contexts.replace(ServiceContext {
        context_id: service_context::SECURITY_ATTRIBUTE_SERVICE,
        context_data: Bytes::copy_from_slice(data),
    });
    let mut request = ServerRequest::new("fuzz", contexts);

    let _ = server.receive_request(&mut request);
    // Encoding whatever reply was planned must always succeed.
    server.send_reply(&mut request).unwrap();
});
