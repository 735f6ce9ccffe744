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

// Main entry point for the csiv2-sas inspection tool
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use csiv2_sas::codec::{CdrEncapsCodec, Codec};
use csiv2_sas::config::Config;
use csiv2_sas::engine_core::constants::{gss, tags};
use csiv2_sas::engine_core::models::{CompoundSecMechList, SasContextBody, SslComponent};
use csiv2_sas::protocol::components::{ComponentFactory, Endpoint};
use csiv2_sas::protocol::token;

#[derive(Parser, Debug)]
#[command(version, about = "Inspect CSIv2 IOR components and SAS tokens", long_about = None)]
struct Cli {
    /// Path to configuration YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the IOR security components built from the configuration
    Components,
    /// Decode a hex GSSUP exported name
    DecodeName { hex: String },
    /// Decode a hex GSSUP InitialContextToken
    DecodeToken { hex: String },
    /// Decode a hex SAS service context body
    DecodeContext { hex: String },
    /// Encode a name as a hex GSSUP exported name
    EncodeName { name: String },
}

#[derive(Serialize)]
struct ComponentView {
    tag: u32,
    data: String,
    decoded: serde_json::Value,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    install_panic_hook();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    let codec = CdrEncapsCodec::new();
    let output = match cli.command {
        Command::Components => components(&config, codec)?,
        Command::DecodeName { hex } => {
            let bytes = parse_hex(&hex)?;
            let name = token::decode_gssup_name(&bytes)
                .ok_or_else(|| anyhow!("Not a GSSUP exported name"))?;
            serde_json::json!({
                "mechanism": hex::encode(gss::GSSUP_MECH_OID),
                "name": String::from_utf8_lossy(&name),
            })
        }
        Command::DecodeToken { hex } => {
            let bytes = parse_hex(&hex)?;
            let initial = token::decode_initial_context_token(&bytes, &codec)
                .ok_or_else(|| anyhow!("Not a GSSUP InitialContextToken"))?;
            debug!("Decoded {:?}", initial);
            let target = token::decode_gssup_name(&initial.target_name);
            serde_json::json!({
                "username": String::from_utf8_lossy(&initial.username),
                "password_len": initial.password.len(),
                "target_name": target.map(|t| String::from_utf8_lossy(&t).into_owned()),
            })
        }
        Command::DecodeContext { hex } => {
            let bytes = parse_hex(&hex)?;
            let body: SasContextBody = codec
                .decode_value(&bytes)
                .context("Not a SAS context body")?;
            serde_json::to_value(&body)?
        }
        Command::EncodeName { name } => {
            serde_json::Value::String(hex::encode(token::encode_gssup_name(&name)?))
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn components(config: &Config, codec: CdrEncapsCodec) -> Result<serde_json::Value> {
    let endpoint = Endpoint::new(config.host.clone(), config.ssl_port);
    let factory = ComponentFactory::new(&config.ior_security, endpoint, codec)?;
    let endpoint = factory.endpoint();
    info!("Rendering components for {}:{}", endpoint.host, endpoint.ssl_port);

    let mut views = Vec::new();
    for component in factory.resolve(None)?.into_components().to_components() {
        let decoded = match component.tag {
            tags::TAG_CSI_SEC_MECH_LIST => {
                let list: CompoundSecMechList = codec.decode_value(&component.data)?;
                for mech in &list.mechanism_list {
                    info!("{}", mech);
                }
                serde_json::to_value(&list)?
            }
            tags::TAG_SSL_SEC_TRANS => {
                let ssl: SslComponent = codec.decode_value(&component.data)?;
                serde_json::to_value(&ssl)?
            }
            _ => serde_json::Value::Null,
        };
        views.push(ComponentView {
            tag: component.tag,
            data: hex::encode(&component.data),
            decoded,
        });
    }
    Ok(serde_json::to_value(&views)?)
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(cleaned).context("Input is not valid hex")
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

fn init_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().try_init().map_err(|e| anyhow!(e.to_string()))?;
    } else {
        subscriber.try_init().map_err(|e| anyhow!(e.to_string()))?;
    }

    Ok(())
}
