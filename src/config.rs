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

use crate::engine_core::constants::config as env_keys;
use crate::engine_core::errors::SasError;
use crate::engine_core::models::AssociationOptions;
use crate::engine_core::types::Credential;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Three-state requirement for one transport association option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementLevel {
    #[default]
    None,
    Supported,
    Required,
}

impl RequirementLevel {
    pub fn is_supported(self) -> bool {
        self != RequirementLevel::None
    }

    pub fn is_required(self) -> bool {
        self == RequirementLevel::Required
    }
}

/// Transport (TLS) options the target advertises.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSecurityProfile {
    pub integrity: RequirementLevel,
    pub confidentiality: RequirementLevel,
    pub detect_replay: RequirementLevel,
    pub detect_misordering: RequirementLevel,
    /// Only `none` or `supported`; the client decides whether it needs it.
    pub trust_in_target: RequirementLevel,
    pub trust_in_client: RequirementLevel,
}

impl TransportSecurityProfile {
    fn options(&self) -> [(RequirementLevel, AssociationOptions); 6] {
        [
            (self.integrity, AssociationOptions::INTEGRITY),
            (self.confidentiality, AssociationOptions::CONFIDENTIALITY),
            (self.detect_replay, AssociationOptions::DETECT_REPLAY),
            (self.detect_misordering, AssociationOptions::DETECT_MISORDERING),
            (self.trust_in_target, AssociationOptions::ESTABLISH_TRUST_IN_TARGET),
            (self.trust_in_client, AssociationOptions::ESTABLISH_TRUST_IN_CLIENT),
        ]
    }

    pub fn target_supports(&self) -> AssociationOptions {
        self.options()
            .into_iter()
            .filter(|(level, _)| level.is_supported())
            .fold(AssociationOptions::NONE, |acc, (_, bit)| acc | bit)
    }

    pub fn target_requires(&self) -> AssociationOptions {
        self.options()
            .into_iter()
            .filter(|(level, bit)| {
                level.is_required() && *bit != AssociationOptions::ESTABLISH_TRUST_IN_TARGET
            })
            .fold(AssociationOptions::NONE, |acc, (_, bit)| acc | bit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    #[default]
    UsernamePassword,
}

/// Client authentication (AS) layer settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationProfile {
    pub auth_method: AuthMethod,
    pub realm: String,
    pub required: bool,
}

impl Default for AuthenticationProfile {
    fn default() -> Self {
        Self {
            auth_method: AuthMethod::UsernamePassword,
            realm: "default".to_string(),
            required: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerPropagation {
    #[default]
    None,
    Supported,
}

/// Identity assertion (SAS) layer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityProfile {
    pub caller_propagation: CallerPropagation,
}

/// Security configuration published in a target's IOR.
///
/// `None` disables a layer. A section left out of YAML keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IorSecurityConfig {
    pub transport: Option<TransportSecurityProfile>,
    pub authentication: Option<AuthenticationProfile>,
    pub identity: Option<IdentityProfile>,
}

impl Default for IorSecurityConfig {
    fn default() -> Self {
        Self {
            transport: Some(TransportSecurityProfile::default()),
            authentication: Some(AuthenticationProfile::default()),
            identity: Some(IdentityProfile::default()),
        }
    }
}

impl IorSecurityConfig {
    pub fn validate(&self) -> Result<(), SasError> {
        if let Some(transport) = &self.transport {
            if transport.trust_in_target.is_required() {
                return Err(SasError::ConfigurationError(
                    "trust_in_target may only be 'none' or 'supported'".to_string(),
                ));
            }
        }
        if let Some(auth) = &self.authentication {
            if auth.auth_method == AuthMethod::UsernamePassword && auth.realm.is_empty() {
                return Err(SasError::ConfigurationError(
                    "username_password authentication needs a realm".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Outgoing-call settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Advertise IdentityAssertion during negotiation.
    pub identity_assertion: bool,
    /// Fallback credentials when the identity source has none.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            identity_assertion: true,
            username: None,
            password: None,
        }
    }
}

impl ClientConfig {
    pub fn credential(&self) -> Option<Credential> {
        self.username.as_ref().map(|username| {
            Credential::new(username.clone(), self.password.clone().unwrap_or_default())
        })
    }
}

/// Incoming-call settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    /// Do not attach an accept reply to an exception reply. Some ORBs choke on it.
    pub suppress_accept_with_exception: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub log_format: String, // "json" or "text"
    /// Host published in TLS transport addresses
    pub host: String,
    /// 0 disables transport security components
    pub ssl_port: u16,
    pub ior_security: IorSecurityConfig,
    pub client: ClientConfig,
    pub server: ServerOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            host: "localhost".to_string(),
            ssl_port: 0,
            ior_security: IorSecurityConfig::default(),
            client: ClientConfig::default(),
            server: ServerOptions::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self, SasError> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// YAML file (or defaults when `path` is `None`) overridden by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SasError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SasError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SasError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(env_keys::ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(format) = lookup(env_keys::ENV_LOG_FORMAT) {
            self.log_format = format;
        }
        if let Some(host) = lookup(env_keys::ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(env_keys::ENV_SSL_PORT) {
            self.ssl_port = port.trim().parse().map_err(|_| {
                SasError::ConfigurationError(format!(
                    "{} must be a port number, got '{}'",
                    env_keys::ENV_SSL_PORT,
                    port
                ))
            })?;
        }
        if let Some(username) = lookup(env_keys::ENV_USERNAME) {
            self.client.username = Some(username);
        }
        if let Some(password) = lookup(env_keys::ENV_PASSWORD) {
            self.client.password = Some(password);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SasError> {
        if !matches!(self.log_format.as_str(), "json" | "text") {
            return Err(SasError::ConfigurationError(format!(
                "log_format must be 'json' or 'text', got '{}'",
                self.log_format
            )));
        }
        if self.ssl_port != 0 && self.host.is_empty() {
            return Err(SasError::ConfigurationError(
                "host is required when ssl_port is set".to_string(),
            ));
        }
        self.ior_security.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ssl_port, 0);
        assert!(config.client.identity_assertion);
    }

    #[test]
    fn test_transport_bitmasks() {
        let profile = TransportSecurityProfile {
            integrity: RequirementLevel::Required,
            confidentiality: RequirementLevel::Supported,
            trust_in_target: RequirementLevel::Supported,
            trust_in_client: RequirementLevel::Required,
            ..Default::default()
        };
        assert_eq!(profile.target_supports().bits(), 2 | 4 | 32 | 64);
        assert_eq!(profile.target_requires().bits(), 2 | 64);
    }

    #[test]
    fn test_trust_in_target_never_required() {
        let profile = TransportSecurityProfile {
            trust_in_target: RequirementLevel::Required,
            ..Default::default()
        };
        assert!(profile.target_requires().is_empty());
        let config = IorSecurityConfig {
            transport: Some(profile),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SasError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
host: ejb.example.com
ssl_port: 3529
ior_security:
  transport:
    integrity: required
    confidentiality: supported
  authentication:
    realm: corp
    required: true
  identity:
    caller_propagation: supported
server:
  suppress_accept_with_exception: true
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.ssl_port, 3529);
        let auth = config.ior_security.authentication.as_ref().unwrap();
        assert_eq!(auth.auth_method, AuthMethod::UsernamePassword);
        assert!(auth.required);
        assert_eq!(
            config.ior_security.identity.as_ref().unwrap().caller_propagation,
            CallerPropagation::Supported
        );
        assert!(config.server.suppress_accept_with_exception);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (env_keys::ENV_SSL_PORT, "3529"),
            (env_keys::ENV_USERNAME, "alice"),
            (env_keys::ENV_LOG_FORMAT, "json"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.ssl_port, 3529);
        assert_eq!(config.log_format, "json");
        let cred = config.client.credential().unwrap();
        assert_eq!(cred.username(), "alice");
        assert_eq!(cred.password(), "");
    }

    #[test]
    fn test_bad_port_override_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| {
            (k == env_keys::ENV_SSL_PORT).then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(SasError::ConfigurationError(_))));
    }
}
