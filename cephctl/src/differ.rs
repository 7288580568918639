// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Computing the changes that turn the current configuration into the desired
//! one.

use cephctl_types::CephConfig;
use cephctl_types::CephConfigDifference;
use cephctl_types::CephOsdConfig;
use cephctl_types::CephOsdConfigDifference;
use daft::Diffable;
use std::collections::BTreeMap;

/// Joins a section and a key into a single flattened path.
///
/// Neither section nor key names may contain the separator. Ceph names never
/// do; masked sections like `osd/class:ssd` only use single colons.
const PATH_SEPARATOR: &str = ":::";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("configuration has a section with an empty name")]
    EmptySectionName,

    #[error(
        "configuration section {section:?} has an option with an empty name"
    )]
    EmptyKeyName { section: String },

    #[error("malformed configuration path {path:?}")]
    MalformedDiffPath { path: String },
}

fn flatten(
    config: &CephConfig,
) -> Result<BTreeMap<String, String>, DiffError> {
    let mut flat = BTreeMap::new();
    for (section, options) in config {
        if section.is_empty() {
            return Err(DiffError::EmptySectionName);
        }
        for (key, value) in options {
            if key.is_empty() {
                return Err(DiffError::EmptyKeyName {
                    section: section.clone(),
                });
            }
            flat.insert(
                format!("{section}{PATH_SEPARATOR}{key}"),
                value.clone(),
            );
        }
    }
    Ok(flat)
}

fn split_path(path: &str) -> Result<(String, String), DiffError> {
    match path.split_once(PATH_SEPARATOR) {
        Some((section, key)) if !section.is_empty() && !key.is_empty() => {
            Ok((section.to_string(), key.to_string()))
        }
        _ => Err(DiffError::MalformedDiffPath { path: path.to_string() }),
    }
}

enum Operation<'a> {
    Add { value: &'a str },
    Change { old_value: &'a str, value: &'a str },
    Remove,
}

/// Returns the operations needed to turn `current` into `desired`, ordered by
/// section and then key.
///
/// Both configurations are validated before anything is compared, so a
/// malformed input is reported even if the other configuration matches it.
pub fn diff_ceph_config(
    current: &CephConfig,
    desired: &CephConfig,
) -> Result<Vec<CephConfigDifference>, DiffError> {
    let current = flatten(current)?;
    let desired = flatten(desired)?;

    let diff = current.diff(&desired);

    let mut operations: BTreeMap<&str, Operation<'_>> = BTreeMap::new();
    for (path, value) in &diff.added {
        operations
            .insert(path.as_str(), Operation::Add { value: value.as_str() });
    }
    for (path, leaf) in &diff.common {
        if leaf.before != leaf.after {
            operations.insert(
                path.as_str(),
                Operation::Change {
                    old_value: leaf.before.as_str(),
                    value: leaf.after.as_str(),
                },
            );
        }
    }
    for path in diff.removed.keys() {
        operations.insert(path.as_str(), Operation::Remove);
    }

    operations
        .into_iter()
        .map(|(path, operation)| {
            let (section, key) = split_path(path)?;
            Ok(match operation {
                Operation::Add { value } => CephConfigDifference::Add {
                    section,
                    key,
                    value: value.to_string(),
                },
                Operation::Change { old_value, value } => {
                    CephConfigDifference::Change {
                        section,
                        key,
                        old_value: old_value.to_string(),
                        value: value.to_string(),
                    }
                }
                Operation::Remove => {
                    CephConfigDifference::Remove { section, key }
                }
            })
        })
        .collect()
}

/// Returns every field that differs between `current` and `desired`.
///
/// Values are compared exactly: `0.9` and `0.901` differ even though both
/// display as `0.90`.
pub fn diff_osd_config(
    current: &CephOsdConfig,
    desired: &CephOsdConfig,
) -> Vec<CephOsdConfigDifference> {
    current
        .fields()
        .into_iter()
        .zip(desired.fields())
        .filter(|((_, old_value), (_, value))| old_value != value)
        .map(|((key, old_value), (_, value))| CephOsdConfigDifference {
            key,
            old_value,
            value,
        })
        .collect()
}
