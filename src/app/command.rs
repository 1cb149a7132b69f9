//! Command translation
//!
//! Turns the raw tokens left over after flag parsing (for example
//! `salt -G os:Debian state.apply test=true`) into the payload salt-api
//! expects on its root endpoint.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{CommandError, CommandResult};

/// Salt command line tool being emulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Salt,
    SaltCall,
    SaltRun,
    SaltWheel,
}

impl Protocol {
    /// Parse a protocol name, case-insensitively
    pub fn parse(token: &str) -> CommandResult<Self> {
        match token.to_ascii_lowercase().as_str() {
            "salt" => Ok(Self::Salt),
            "salt-call" => Ok(Self::SaltCall),
            "salt-run" => Ok(Self::SaltRun),
            "salt-wheel" => Ok(Self::SaltWheel),
            _ => Err(CommandError::UnknownProtocol {
                protocol: token.to_string(),
            }),
        }
    }

    /// Async client the API should dispatch the call to
    pub fn client(self) -> ClientKind {
        match self {
            Self::Salt | Self::SaltCall => ClientKind::LocalAsync,
            Self::SaltRun => ClientKind::RunnerAsync,
            Self::SaltWheel => ClientKind::WheelAsync,
        }
    }

    /// Whether the call addresses minions and so needs a target
    pub fn is_targeted(self) -> bool {
        matches!(self, Self::Salt | Self::SaltCall)
    }
}

/// Value of the payload `client` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    LocalAsync,
    RunnerAsync,
    WheelAsync,
}

/// How the target expression is matched against minions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Glob,
    Compound,
    Pcre,
    Grain,
    GrainPcre,
    List,
    Pillar,
    PillarPcre,
    Ipcidr,
    Range,
    Nodegroup,
}

impl TargetType {
    /// Abbreviation table, one flag per target type
    pub const ABBREVIATIONS: [(&'static str, TargetType); 10] = [
        ("-C", TargetType::Compound),
        ("-E", TargetType::Pcre),
        ("-G", TargetType::Grain),
        ("-P", TargetType::GrainPcre),
        ("-L", TargetType::List),
        ("-I", TargetType::Pillar),
        ("-J", TargetType::PillarPcre),
        ("-S", TargetType::Ipcidr),
        ("-R", TargetType::Range),
        ("-N", TargetType::Nodegroup),
    ];

    /// Resolve a two-letter flag such as `-C` to its target type
    pub fn from_flag(flag: &str) -> CommandResult<Self> {
        Self::ABBREVIATIONS
            .iter()
            .find(|(abbrev, _)| *abbrev == flag)
            .map(|(_, target_type)| *target_type)
            .ok_or_else(|| CommandError::UnknownTargetType {
                flag: flag.to_string(),
            })
    }

    /// Name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Glob => "glob",
            Self::Compound => "compound",
            Self::Pcre => "pcre",
            Self::Grain => "grain",
            Self::GrainPcre => "grain_pcre",
            Self::List => "list",
            Self::Pillar => "pillar",
            Self::PillarPcre => "pillar_pcre",
            Self::Ipcidr => "ipcidr",
            Self::Range => "range",
            Self::Nodegroup => "nodegroup",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a salt-api call; sent as the only element of a JSON list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallPayload {
    pub client: ClientKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tgt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tgt_type: Option<TargetType>,
    pub fun: String,
    pub arg: Vec<Value>,
    pub kwarg: Map<String, Value>,
}

/// Translate command tokens into a call payload.
///
/// The first token names the protocol; targeted protocols then take an
/// optional target-type flag and a target expression, followed by the
/// function name and its arguments.
///
/// # Errors
///
/// Returns `CommandError` for an unknown protocol or target type flag, or
/// when the tokens run out before the target or function.
pub fn translate<S: AsRef<str>>(tokens: &[S]) -> CommandResult<CallPayload> {
    let mut tokens = tokens.iter().map(AsRef::as_ref);

    let protocol = Protocol::parse(tokens.next().ok_or(CommandError::MissingToken {
        expected: "salt protocol",
    })?)?;

    let (tgt, tgt_type) = if protocol.is_targeted() {
        let mut next = tokens.next().ok_or(CommandError::MissingToken {
            expected: "target",
        })?;
        let target_type = if next.starts_with('-') {
            let target_type = TargetType::from_flag(next)?;
            next = tokens.next().ok_or(CommandError::MissingToken {
                expected: "target",
            })?;
            target_type
        } else {
            TargetType::Glob
        };
        (Some(next.to_string()), Some(target_type))
    } else {
        (None, None)
    };

    let fun = tokens
        .next()
        .ok_or(CommandError::MissingToken {
            expected: "function",
        })?
        .to_string();

    let mut arg = Vec::new();
    let mut kwarg = Map::new();
    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                kwarg.insert(key.to_string(), decode_value(value));
            }
            _ => arg.push(decode_value(token)),
        }
    }

    debug!(
        "Translated {:?} call to {} with {} args and {} kwargs",
        protocol,
        fun,
        arg.len(),
        kwarg.len()
    );

    Ok(CallPayload {
        client: protocol.client(),
        tgt,
        tgt_type,
        fun,
        arg,
        kwarg,
    })
}

/// Decode a token as JSON, keeping it as a plain string when that fails
pub fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
