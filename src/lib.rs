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

//! csiv2-sas: CSIv2 Security Attribute Service context establishment.
//!
//! This library provides the IOR security components a CORBA target publishes,
//! the client-side mechanism negotiation, GSS token framing, and the
//! per-request client and server interceptors that exchange SAS messages.

pub mod codec;
pub mod config;
pub mod engine_core;
pub mod interceptor;
pub mod protocol;
pub mod utils;
mod verification;
