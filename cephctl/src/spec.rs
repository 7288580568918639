// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loading (and dumping) of specification files.
//!
//! A specification file is a stream of YAML documents, each of the form
//!
//! ```yaml
//! kind: CephConfig
//! spec:
//!   global:
//!     rbd_cache: "true"
//! ```
//!
//! The kind is matched case-insensitively. Dumps are emitted in the same
//! format, so they can be fed back to `cephctl apply`.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use cephctl_types::CephConfig;
use cephctl_types::CephOsdConfig;
use serde::Deserialize;
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("failed to read specification file {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("failed to parse YAML document")]
    Parse(#[source] serde_yaml::Error),

    #[error("unexpected specification kind: `{kind}`")]
    UnexpectedKind { kind: String },

    #[error("invalid {kind} specification")]
    InvalidSpec {
        kind: &'static str,
        #[source]
        err: serde_yaml::Error,
    },

    #[error(
        "value of {key:?} in section {section:?} must be a scalar, \
         found {found}"
    )]
    TypeMismatch { section: String, key: String, found: &'static str },

    #[error("failed to serialize {kind} specification")]
    Serialize {
        kind: &'static str,
        #[source]
        err: serde_yaml::Error,
    },
}

/// A single document of a specification file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "spec")]
pub enum SpecDocument {
    #[serde(rename = "CephConfig")]
    CephConfig(CephConfig),
    #[serde(rename = "CephOSDConfig")]
    CephOsdConfig(CephOsdConfig),
}

impl SpecDocument {
    pub fn kind(&self) -> &'static str {
        match self {
            SpecDocument::CephConfig(_) => "CephConfig",
            SpecDocument::CephOsdConfig(_) => "CephOSDConfig",
        }
    }

    /// Renders this document as YAML, as `cephctl dump` prints it.
    pub fn to_yaml(&self) -> Result<String, SpecError> {
        serde_yaml::to_string(self)
            .map_err(|err| SpecError::Serialize { kind: self.kind(), err })
    }

    fn from_raw(raw: RawDocument) -> Result<Self, SpecError> {
        match raw.kind.to_lowercase().as_str() {
            "cephconfig" => {
                ceph_config_from_value(raw.spec).map(SpecDocument::CephConfig)
            }
            "cephosdconfig" => {
                osd_config_from_value(raw.spec).map(SpecDocument::CephOsdConfig)
            }
            _ => Err(SpecError::UnexpectedKind { kind: raw.kind }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    kind: String,
    #[serde(default)]
    spec: Value,
}

pub fn load_spec_file(path: &Utf8Path) -> Result<Vec<SpecDocument>, SpecError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| SpecError::Io { path: path.to_owned(), err })?;
    parse_spec(&contents)
}

/// Parses every document of a specification stream, in order.
///
/// Empty documents are skipped. The first invalid document fails the whole
/// stream.
pub fn parse_spec(contents: &str) -> Result<Vec<SpecDocument>, SpecError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(contents) {
        let value = Value::deserialize(document).map_err(SpecError::Parse)?;
        if value.is_null() {
            continue;
        }
        let raw: RawDocument =
            serde_yaml::from_value(value).map_err(SpecError::Parse)?;
        documents.push(SpecDocument::from_raw(raw)?);
    }
    Ok(documents)
}

fn ceph_config_from_value(spec: Value) -> Result<CephConfig, SpecError> {
    if spec.is_null() {
        return Ok(CephConfig::new());
    }
    let sections: BTreeMap<String, BTreeMap<String, Value>> =
        serde_yaml::from_value(spec)
            .map_err(|err| SpecError::InvalidSpec { kind: "CephConfig", err })?;

    let mut config = CephConfig::new();
    for (section, options) in sections {
        let mut values = BTreeMap::new();
        for (key, value) in options {
            let value = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(SpecError::TypeMismatch {
                        section,
                        key,
                        found: value_kind(&other),
                    });
                }
            };
            values.insert(key, value);
        }
        config.insert(section, values);
    }
    Ok(config)
}

fn osd_config_from_value(spec: Value) -> Result<CephOsdConfig, SpecError> {
    if spec.is_null() {
        return Ok(CephOsdConfig::default());
    }
    serde_yaml::from_value(spec)
        .map_err(|err| SpecError::InvalidSpec { kind: "CephOSDConfig", err })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
