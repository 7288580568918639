// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declarative configuration and health checking for Ceph clusters.
//!
//! `cephctl` reads the desired state of a cluster from YAML specification
//! files, compares it against what the `ceph` CLI reports, and issues the
//! changes needed to converge. It also summarizes `ceph report` and
//! `ceph status` into a set of health indicators.

pub mod ceph_cli;
pub mod differ;
pub mod health;
pub mod printer;
pub mod service;
pub mod spec;

#[cfg(any(test, feature = "testing"))]
pub mod fakes;

pub use ceph_cli::CephApi;
pub use ceph_cli::CephCli;
pub use ceph_cli::CephCliError;
pub use printer::Printer;
pub use service::Service;
pub use service::ServiceError;
pub use spec::SpecDocument;
pub use spec::SpecError;
