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

//! Request interceptors for the SAS service context.
//!
//! Both sides are synchronous hooks invoked inside the host's request
//! lifecycle. Shared state is immutable; per-request state travels in the
//! request handle.

pub mod client;
pub mod server;

pub use client::{ClientRequest, SasClientInterceptor, SasReply};
pub use server::{SasServerInterceptor, ServerOptions, ServerRequest};
