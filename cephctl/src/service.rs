// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of the live cluster against a desired state, and health
//! checking of the live cluster.

use crate::ceph_cli::CephApi;
use crate::ceph_cli::CephCliError;
use crate::differ::diff_ceph_config;
use crate::differ::diff_osd_config;
use crate::differ::DiffError;
use crate::health::evaluate;
use crate::health::HealthCheck;
use crate::health::HealthCheckError;
use cephctl_types::raw::NormalizeError;
use cephctl_types::CephConfig;
use cephctl_types::CephConfigDifference;
use cephctl_types::CephOsdConfig;
use cephctl_types::CephOsdConfigDifference;
use cephctl_types::ClusterHealthIndicator;
use cephctl_types::ClusterReport;
use cephctl_types::ClusterStatus;
use slog::debug;
use slog::info;
use slog::o;
use slog::Logger;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to retrieve the current configuration")]
    FetchConfig(#[source] CephCliError),

    #[error("failed to retrieve the current OSD configuration")]
    FetchOsdConfig(#[source] CephCliError),

    #[error("failed to compare current and desired configuration")]
    Diff(#[from] DiffError),

    #[error("failed to set {key:?} in section {section:?}")]
    SetOption {
        section: String,
        key: String,
        #[source]
        err: CephCliError,
    },

    #[error("failed to remove {key:?} from section {section:?}")]
    RemoveOption {
        section: String,
        key: String,
        #[source]
        err: CephCliError,
    },

    #[error("failed to set OSD option {key:?}")]
    SetOsdOption {
        key: &'static str,
        #[source]
        err: CephCliError,
    },

    #[error("failed to retrieve the cluster report")]
    FetchReport(#[source] CephCliError),

    #[error("failed to retrieve the cluster status")]
    FetchStatus(#[source] CephCliError),

    #[error("failed to list devices")]
    ListDevices(#[source] CephCliError),

    #[error("failed to summarize cluster state")]
    Normalize(#[from] NormalizeError),

    #[error("failed to check cluster health")]
    HealthCheck(#[from] HealthCheckError),
}

/// Drives a cluster toward a desired configuration, and checks its health.
///
/// Changes are executed one at a time, in the order the differ produces them.
/// The first failure stops the run; changes that were already made are kept.
pub struct Service {
    ceph: Arc<dyn CephApi>,
    log: Logger,
}

impl Service {
    pub fn new(ceph: Arc<dyn CephApi>, log: &Logger) -> Self {
        Self { ceph, log: log.new(o!("component" => "Service")) }
    }

    pub async fn dump_config(&self) -> Result<CephConfig, ServiceError> {
        self.ceph.dump_config().await.map_err(ServiceError::FetchConfig)
    }

    pub async fn dump_osd_config(
        &self,
    ) -> Result<CephOsdConfig, ServiceError> {
        self.ceph.dump_osd_config().await.map_err(ServiceError::FetchOsdConfig)
    }

    pub async fn diff_ceph_config(
        &self,
        desired: &CephConfig,
    ) -> Result<Vec<CephConfigDifference>, ServiceError> {
        let current = self.dump_config().await?;
        let changes = diff_ceph_config(&current, desired)?;
        debug!(
            self.log,
            "computed configuration changes";
            "num_changes" => changes.len(),
            "changes" => ?changes,
        );
        Ok(changes)
    }

    /// Applies `desired`, returning the changes that were made.
    pub async fn apply_ceph_config(
        &self,
        desired: &CephConfig,
    ) -> Result<Vec<CephConfigDifference>, ServiceError> {
        let changes = self.diff_ceph_config(desired).await?;

        for change in &changes {
            match change {
                CephConfigDifference::Remove { section, key } => {
                    info!(
                        self.log, "removing configuration option";
                        "section" => section,
                        "key" => key,
                    );
                    self.ceph.remove_config_option(section, key).await.map_err(
                        |err| ServiceError::RemoveOption {
                            section: section.clone(),
                            key: key.clone(),
                            err,
                        },
                    )?;
                }
                CephConfigDifference::Add { section, key, value }
                | CephConfigDifference::Change { section, key, value, .. } => {
                    info!(
                        self.log, "setting configuration option";
                        "section" => section,
                        "key" => key,
                        "value" => value,
                    );
                    self.ceph
                        .set_config_option(section, key, value)
                        .await
                        .map_err(|err| ServiceError::SetOption {
                            section: section.clone(),
                            key: key.clone(),
                            err,
                        })?;
                }
            }
        }

        Ok(changes)
    }

    pub async fn diff_osd_config(
        &self,
        desired: &CephOsdConfig,
    ) -> Result<Vec<CephOsdConfigDifference>, ServiceError> {
        let current = self.dump_osd_config().await?;
        let changes = diff_osd_config(&current, desired);
        debug!(
            self.log,
            "computed OSD configuration changes";
            "num_changes" => changes.len(),
            "changes" => ?changes,
        );
        Ok(changes)
    }

    /// Applies `desired`, returning the changes that were made.
    pub async fn apply_osd_config(
        &self,
        desired: &CephOsdConfig,
    ) -> Result<Vec<CephOsdConfigDifference>, ServiceError> {
        let changes = self.diff_osd_config(desired).await?;

        for change in &changes {
            info!(
                self.log, "setting OSD configuration option";
                "key" => change.key,
                "old_value" => %change.old_value,
                "value" => %change.value,
            );
            self.ceph
                .set_osd_config_option(change.key, &change.value)
                .await
                .map_err(|err| ServiceError::SetOsdOption {
                    key: change.key,
                    err,
                })?;
        }

        Ok(changes)
    }

    /// Returns the normalized `ceph report`, with devices attached.
    pub async fn cluster_report(&self) -> Result<ClusterReport, ServiceError> {
        let raw = self
            .ceph
            .cluster_report()
            .await
            .map_err(ServiceError::FetchReport)?;
        let mut report = raw.normalize()?;
        report.devices =
            self.ceph.list_devices().await.map_err(ServiceError::ListDevices)?;
        Ok(report)
    }

    pub async fn check_cluster_health(
        &self,
        checks: &[HealthCheck<ClusterReport>],
    ) -> Result<Vec<ClusterHealthIndicator>, ServiceError> {
        let report = self.cluster_report().await?;
        Ok(evaluate(&report, checks)?)
    }

    pub async fn cluster_status(&self) -> Result<ClusterStatus, ServiceError> {
        let raw = self
            .ceph
            .cluster_status()
            .await
            .map_err(ServiceError::FetchStatus)?;
        Ok(raw.normalize()?)
    }

    pub async fn check_cluster_status(
        &self,
        checks: &[HealthCheck<ClusterStatus>],
    ) -> Result<Vec<ClusterHealthIndicator>, ServiceError> {
        let status = self.cluster_status().await?;
        Ok(evaluate(&status, checks)?)
    }
}
