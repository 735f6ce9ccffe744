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

//! IOR Component Builder.
//!
//! Turns the configured security profiles into the tagged components a target
//! publishes: the `CompoundSecMechList` (`TAG_CSI_SEC_MECH_LIST`) and the
//! legacy `SSLIOP::SSL` block (`TAG_SSL_SEC_TRANS`).
//!
//! Components are built once per target, or once per policy override, and
//! cached by [`ComponentFactory`]. Callers always receive clones.

use crate::codec::Codec;
use crate::config::{
    AuthMethod, AuthenticationProfile, CallerPropagation, IdentityProfile, IorSecurityConfig,
    TransportSecurityProfile,
};
use crate::engine_core::constants::{gss, identity_token_type, tags};
use crate::engine_core::errors::CodecError;
use crate::engine_core::models::{
    AsContextSec, AssociationOptions, CompoundSecMech, CompoundSecMechList, SasContextSec,
    SslComponent, TaggedComponent, TlsSecTrans, TransportAddress,
};
use crate::protocol::token::encode_gssup_name;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Where the target accepts TLS connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    /// 0 means no secure port is configured
    pub ssl_port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, ssl_port: u16) -> Self {
        Self {
            host: host.into(),
            ssl_port,
        }
    }
}

pub fn create_target_supports(profile: Option<&TransportSecurityProfile>) -> AssociationOptions {
    profile.map_or(AssociationOptions::NONE, |p| p.target_supports())
}

pub fn create_target_requires(profile: Option<&TransportSecurityProfile>) -> AssociationOptions {
    profile.map_or(AssociationOptions::NONE, |p| p.target_requires())
}

/// Transport mechanism of a `CompoundSecMech`.
///
/// Degrades to the `TAG_NULL_TAG` marker when there is no profile, the profile
/// supports nothing, or no secure port is configured.
pub fn build_transport_component<C: Codec + ?Sized>(
    profile: Option<&TransportSecurityProfile>,
    endpoint: &Endpoint,
    codec: &C,
) -> Result<TaggedComponent, CodecError> {
    let supports = create_target_supports(profile);
    if supports.is_empty() || endpoint.ssl_port == 0 {
        return Ok(TaggedComponent::null());
    }

    let tls = TlsSecTrans {
        target_supports: supports,
        target_requires: create_target_requires(profile),
        addresses: vec![TransportAddress {
            host_name: endpoint.host.clone(),
            port: endpoint.ssl_port,
        }],
    };
    Ok(TaggedComponent::new(
        tags::TAG_TLS_SEC_TRANS,
        codec.encode_value(&tls)?,
    ))
}

/// AS layer descriptor. Empty when authentication is disabled.
pub fn create_as_context(
    profile: Option<&AuthenticationProfile>,
) -> Result<AsContextSec, CodecError> {
    let Some(profile) = profile.filter(|p| p.auth_method != AuthMethod::None) else {
        return Ok(AsContextSec::default());
    };

    let requires = if profile.required {
        AssociationOptions::ESTABLISH_TRUST_IN_CLIENT
    } else {
        AssociationOptions::NONE
    };
    Ok(AsContextSec {
        target_supports: AssociationOptions::ESTABLISH_TRUST_IN_CLIENT,
        target_requires: requires,
        client_authentication_mech: gss::GSSUP_MECH_OID.to_vec(),
        target_name: encode_gssup_name(&profile.realm)?,
    })
}

/// SAS layer descriptor. Empty unless caller propagation is supported.
pub fn create_sas_context(profile: Option<&IdentityProfile>) -> SasContextSec {
    match profile {
        Some(p) if p.caller_propagation == CallerPropagation::Supported => SasContextSec {
            target_supports: AssociationOptions::IDENTITY_ASSERTION,
            target_requires: AssociationOptions::NONE,
            privilege_authorities: Vec::new(),
            supported_naming_mechanisms: vec![gss::GSSUP_MECH_OID.to_vec()],
            supported_identity_types: identity_token_type::ANONYMOUS
                | identity_token_type::PRINCIPAL_NAME
                | identity_token_type::X509_CERT_CHAIN
                | identity_token_type::DISTINGUISHED_NAME,
        },
        _ => SasContextSec::default(),
    }
}

/// The mechanisms a target publishes. Always exactly one.
pub fn create_compound_sec_mechanisms<C: Codec + ?Sized>(
    config: &IorSecurityConfig,
    endpoint: &Endpoint,
    codec: &C,
) -> Result<Vec<CompoundSecMech>, CodecError> {
    let transport = config.transport.as_ref();
    let transport_mech = build_transport_component(transport, endpoint, codec)?;
    let as_context_mech = create_as_context(config.authentication.as_ref())?;
    let sas_context_mech = create_sas_context(config.identity.as_ref());

    let target_requires = create_target_requires(transport)
        | as_context_mech.target_requires
        | sas_context_mech.target_requires;

    Ok(vec![CompoundSecMech {
        target_requires,
        transport_mech,
        as_context_mech,
        sas_context_mech,
    }])
}

/// The `TAG_CSI_SEC_MECH_LIST` component. Stateful contexts are never offered.
pub fn build_security_component<C: Codec + ?Sized>(
    config: &IorSecurityConfig,
    endpoint: &Endpoint,
    codec: &C,
) -> Result<TaggedComponent, CodecError> {
    let list = CompoundSecMechList {
        stateful: false,
        mechanism_list: create_compound_sec_mechanisms(config, endpoint, codec)?,
    };
    for mech in &list.mechanism_list {
        debug!("Publishing {}", mech);
    }
    Ok(TaggedComponent::new(
        tags::TAG_CSI_SEC_MECH_LIST,
        codec.encode_value(&list)?,
    ))
}

/// The legacy `SSLIOP::SSL` component, absent without an SSL port.
pub fn build_ssl_component<C: Codec + ?Sized>(
    config: &IorSecurityConfig,
    endpoint: &Endpoint,
    codec: &C,
) -> Result<Option<TaggedComponent>, CodecError> {
    if endpoint.ssl_port == 0 {
        return Ok(None);
    }
    let transport = config.transport.as_ref();
    let ssl = SslComponent {
        target_supports: create_target_supports(transport),
        target_requires: create_target_requires(transport),
        port: endpoint.ssl_port,
    };
    Ok(Some(TaggedComponent::new(
        tags::TAG_SSL_SEC_TRANS,
        codec.encode_value(&ssl)?,
    )))
}

/// Everything security-related a target adds to its IOR profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetComponents {
    pub security: TaggedComponent,
    pub ssl: Option<TaggedComponent>,
}

impl TargetComponents {
    pub fn build<C: Codec + ?Sized>(
        config: &IorSecurityConfig,
        endpoint: &Endpoint,
        codec: &C,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            security: build_security_component(config, endpoint, codec)?,
            ssl: build_ssl_component(config, endpoint, codec)?,
        })
    }

    /// Components in IOR order: SSL first when present.
    pub fn to_components(&self) -> Vec<TaggedComponent> {
        self.ssl
            .iter()
            .cloned()
            .chain(std::iter::once(self.security.clone()))
            .collect()
    }
}

/// Policy in force for one reference, resolved once per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectivePolicy {
    Default(TargetComponents),
    Override(TargetComponents),
}

impl EffectivePolicy {
    pub fn components(&self) -> &TargetComponents {
        match self {
            EffectivePolicy::Default(c) | EffectivePolicy::Override(c) => c,
        }
    }

    pub fn into_components(self) -> TargetComponents {
        match self {
            EffectivePolicy::Default(c) | EffectivePolicy::Override(c) => c,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, EffectivePolicy::Override(_))
    }
}

/// Builds and caches the components of one target.
///
/// Override policies are built on first use and cached by configuration.
pub struct ComponentFactory<C: Codec> {
    codec: C,
    endpoint: Endpoint,
    defaults: TargetComponents,
    overrides: RwLock<HashMap<IorSecurityConfig, TargetComponents>>,
}

impl<C: Codec> ComponentFactory<C> {
    pub fn new(
        config: &IorSecurityConfig,
        endpoint: Endpoint,
        codec: C,
    ) -> Result<Self, CodecError> {
        let defaults = TargetComponents::build(config, &endpoint, &codec)?;
        info!(
            "Built default IOR security components for {}:{} (ssl component: {})",
            endpoint.host,
            endpoint.ssl_port,
            defaults.ssl.is_some()
        );
        Ok(Self {
            codec,
            endpoint,
            defaults,
            overrides: RwLock::new(HashMap::new()),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn default_components(&self) -> TargetComponents {
        self.defaults.clone()
    }

    /// Components for a reference, honouring a per-object override policy.
    pub fn resolve(
        &self,
        override_policy: Option<&IorSecurityConfig>,
    ) -> Result<EffectivePolicy, CodecError> {
        match override_policy {
            None => Ok(EffectivePolicy::Default(self.default_components())),
            Some(config) => self.override_components(config).map(EffectivePolicy::Override),
        }
    }

    fn override_components(
        &self,
        config: &IorSecurityConfig,
    ) -> Result<TargetComponents, CodecError> {
        if let Some(cached) = self
            .overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(config)
        {
            return Ok(cached.clone());
        }

        debug!("Building IOR components for per-object security policy");
        let built = TargetComponents::build(config, &self.endpoint, &self.codec)?;
        let mut overrides = self.overrides.write().unwrap_or_else(PoisonError::into_inner);
        // A racing builder may have inserted first; keep whichever landed.
        let entry = overrides.entry(config.clone()).or_insert(built);
        Ok(entry.clone())
    }
}
