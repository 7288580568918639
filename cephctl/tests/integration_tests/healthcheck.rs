// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health checks over recorded `ceph` output.

use super::test_logger;
use cephctl::fakes::FakeCeph;
use cephctl::health::default_report_checks;
use cephctl::health::default_status_checks;
use cephctl::Printer;
use cephctl::Service;
use cephctl_types::raw::RawReport;
use cephctl_types::raw::RawStatus;
use cephctl_types::ClusterStatusHealth;
use cephctl_types::Device;
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::sync::Arc;

fn load<T: DeserializeOwned>(name: &str) -> T {
    let path = format!("tests/data/{name}");
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {path}: {err}"));
    serde_json::from_str(&contents)
        .unwrap_or_else(|err| panic!("failed to parse {path}: {err}"))
}

fn report_service() -> Service {
    let report: RawReport = load("report.json");
    let devices: Vec<Device> = load("devices.json");
    let ceph = FakeCeph::new().with_report(report).with_devices(devices);
    Service::new(Arc::new(ceph), &test_logger())
}

#[tokio::test]
async fn test_cluster_report() {
    let report = report_service().cluster_report().await.unwrap();

    assert_eq!(report.health_status, ClusterStatusHealth::Warn);
    assert_eq!(report.checks.len(), 2);
    assert_eq!(report.checks[0].code, "MON_CLOCK_SKEW");
    assert_eq!(report.muted_checks.len(), 1);
    assert_eq!(report.num_mons, 3);
    assert_eq!(report.num_mons_in_quorum, 3);
    assert_eq!(report.num_pools, 2);
    assert_eq!(report.num_osds, 4);
    assert_eq!(report.num_osds_up, 3);
    assert_eq!(report.num_osds_in, 3);
    assert_eq!(report.num_osds_without_cluster_address, 1);
    assert_eq!(report.num_osds_by_version.get("18.2.4"), Some(&3));
    assert_eq!(report.num_osds_by_version.get("18.2.2"), Some(&1));
    assert_eq!(report.num_osds_by_device_type.get("ssd"), Some(&1));
    assert_eq!(report.num_pgs, 128);
    assert_eq!(report.num_pgs_in_state("active"), 127);
    assert_eq!(report.num_pgs_in_state("clean"), 97);
    assert_eq!(report.num_pgs_in_state("degraded"), 30);
    assert_eq!(report.devices.len(), 3);

    let daemon = &report.osd_daemons[2];
    assert_eq!(daemon.id, 2);
    assert_eq!(daemon.hostname, "node3");
    assert_eq!(daemon.front_ip, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)));
    assert_eq!(daemon.back_ip, IpAddr::V4(Ipv4Addr::new(192, 168, 0, 3)));
    assert_eq!(daemon.mem_swap_kb, 8388604);
    assert!(!daemon.rotational);
}

#[tokio::test]
async fn test_healthcheck() {
    let indicators = report_service()
        .check_cluster_health(&default_report_checks())
        .await
        .unwrap();

    let mut printer = Printer::new(false, Vec::new());
    printer.print_indicators(&indicators).unwrap();
    let output = String::from_utf8(printer.into_inner()).unwrap();
    expectorate::assert_contents("tests/output/healthcheck.txt", &output);
}

#[tokio::test]
async fn test_status() {
    let status: RawStatus = load("status.json");
    let ceph = FakeCeph::new().with_status(status);
    let service = Service::new(Arc::new(ceph), &test_logger());
    let indicators = service
        .check_cluster_status(&default_status_checks())
        .await
        .unwrap();

    let mut printer = Printer::new(false, Vec::new());
    printer.print_indicators(&indicators).unwrap();
    let output = String::from_utf8(printer.into_inner()).unwrap();
    expectorate::assert_contents("tests/output/status.txt", &output);
}
