// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An in-memory stand-in for a cluster.

use crate::ceph_cli::CephApi;
use crate::ceph_cli::CephCliError;
use cephctl_types::raw::RawReport;
use cephctl_types::raw::RawStatus;
use cephctl_types::CephConfig;
use cephctl_types::CephOsdConfig;
use cephctl_types::Device;
use cephctl_types::ScalarValue;
use std::io;
use std::sync::Mutex;
use std::sync::MutexGuard;

/// A call made against a [`FakeCeph`].
#[derive(Debug, Clone, PartialEq)]
pub enum CephCall {
    DumpConfig,
    SetConfigOption { section: String, key: String, value: String },
    RemoveConfigOption { section: String, key: String },
    DumpOsdConfig,
    SetOsdConfigOption { key: String, value: ScalarValue },
    ClusterReport,
    ClusterStatus,
    ListDevices,
}

impl CephCall {
    fn subcommand(&self) -> &'static str {
        match self {
            CephCall::DumpConfig => "config dump",
            CephCall::SetConfigOption { .. } => "config set",
            CephCall::RemoveConfigOption { .. } => "config rm",
            CephCall::DumpOsdConfig => "osd dump",
            CephCall::SetOsdConfigOption { .. } => "osd set",
            CephCall::ClusterReport => "report",
            CephCall::ClusterStatus => "status",
            CephCall::ListDevices => "device ls",
        }
    }
}

#[derive(Default)]
struct Inner {
    config: CephConfig,
    osd_config: CephOsdConfig,
    report: RawReport,
    status: RawStatus,
    devices: Vec<Device>,
    calls: Vec<CephCall>,
    fail_on: Option<CephCall>,
}

/// A fake implementation of [`crate::ceph_cli::CephCli`].
///
/// Configuration changes are applied to the in-memory state, so that they are
/// visible to subsequent dumps. Every call is recorded, including the ones
/// that fail.
#[derive(Default)]
pub struct FakeCeph {
    inner: Mutex<Inner>,
}

impl FakeCeph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(self, config: CephConfig) -> Self {
        self.inner().config = config;
        self
    }

    pub fn with_osd_config(self, osd_config: CephOsdConfig) -> Self {
        self.inner().osd_config = osd_config;
        self
    }

    pub fn with_report(self, report: RawReport) -> Self {
        self.inner().report = report;
        self
    }

    pub fn with_status(self, status: RawStatus) -> Self {
        self.inner().status = status;
        self
    }

    pub fn with_devices(self, devices: Vec<Device>) -> Self {
        self.inner().devices = devices;
        self
    }

    /// Makes `call` fail (and every identical call after it).
    pub fn fail_on(&self, call: CephCall) {
        self.inner().fail_on = Some(call);
    }

    pub fn calls(&self) -> Vec<CephCall> {
        self.inner().calls.clone()
    }

    pub fn config(&self) -> CephConfig {
        self.inner().config.clone()
    }

    pub fn osd_config(&self) -> CephOsdConfig {
        self.inner().osd_config.clone()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the state from the others.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `call` and returns the state to act on, unless the call is set
    /// up to fail.
    fn record(
        &self,
        call: CephCall,
    ) -> Result<MutexGuard<'_, Inner>, CephCliError> {
        let mut inner = self.inner();
        inner.calls.push(call.clone());
        if inner.fail_on.as_ref() == Some(&call) {
            return Err(CephCliError::InvokeCli {
                subcommand: call.subcommand(),
                err: io::Error::other("injected failure"),
            });
        }
        Ok(inner)
    }
}

#[async_trait::async_trait]
impl CephApi for FakeCeph {
    async fn dump_config(&self) -> Result<CephConfig, CephCliError> {
        Ok(self.record(CephCall::DumpConfig)?.config.clone())
    }

    async fn set_config_option(
        &self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), CephCliError> {
        let mut inner = self.record(CephCall::SetConfigOption {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })?;
        inner
            .config
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_config_option(
        &self,
        section: &str,
        key: &str,
    ) -> Result<(), CephCliError> {
        let mut inner = self.record(CephCall::RemoveConfigOption {
            section: section.to_string(),
            key: key.to_string(),
        })?;
        if let Some(options) = inner.config.get_mut(section) {
            options.remove(key);
            if options.is_empty() {
                inner.config.remove(section);
            }
        }
        Ok(())
    }

    async fn dump_osd_config(&self) -> Result<CephOsdConfig, CephCliError> {
        Ok(self.record(CephCall::DumpOsdConfig)?.osd_config.clone())
    }

    async fn set_osd_config_option(
        &self,
        key: &str,
        value: &ScalarValue,
    ) -> Result<(), CephCliError> {
        let mut inner = self.record(CephCall::SetOsdConfigOption {
            key: key.to_string(),
            value: value.clone(),
        })?;
        let osd_config = &mut inner.osd_config;
        match (key, value) {
            (CephOsdConfig::ALLOW_CRIMSON, ScalarValue::Bool(v)) => {
                osd_config.allow_crimson = *v;
            }
            (CephOsdConfig::NEARFULL_RATIO, ScalarValue::Float(v)) => {
                osd_config.nearfull_ratio = *v;
            }
            (CephOsdConfig::BACKFILLFULL_RATIO, ScalarValue::Float(v)) => {
                osd_config.backfillfull_ratio = *v;
            }
            (CephOsdConfig::FULL_RATIO, ScalarValue::Float(v)) => {
                osd_config.full_ratio = *v;
            }
            (
                CephOsdConfig::REQUIRE_MIN_COMPAT_CLIENT,
                ScalarValue::String(v),
            ) => {
                osd_config.require_min_compat_client = v.clone();
            }
            _ => {
                return Err(CephCliError::UnknownOsdOption {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn cluster_report(&self) -> Result<RawReport, CephCliError> {
        Ok(self.record(CephCall::ClusterReport)?.report.clone())
    }

    async fn cluster_status(&self) -> Result<RawStatus, CephCliError> {
        Ok(self.record(CephCall::ClusterStatus)?.status.clone())
    }

    async fn list_devices(&self) -> Result<Vec<Device>, CephCliError> {
        Ok(self.record(CephCall::ListDevices)?.devices.clone())
    }
}
