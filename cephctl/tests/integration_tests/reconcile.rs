// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of specification files against a fake cluster.

use super::test_logger;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use camino_tempfile::Utf8TempDir;
use cephctl::fakes::CephCall;
use cephctl::fakes::FakeCeph;
use cephctl::spec::load_spec_file;
use cephctl::Printer;
use cephctl::Service;
use cephctl::SpecDocument;
use cephctl_types::CephConfig;
use cephctl_types::CephOsdConfig;
use cephctl_types::ScalarValue;
use std::sync::Arc;

const SPEC: &str = "\
kind: CephConfig
spec:
  global:
    rbd_cache: true
    osd_pool_default_size: 3
  mon:
    mon_allow_pool_delete: true
  osd.3:
    osd_max_backfills: 4
---
kind: CephOSDConfig
spec:
  full_ratio: 0.97
  require_min_compat_client: squid
";

fn current_config() -> CephConfig {
    let mut config = CephConfig::new();
    config.entry("global".to_string()).or_default().extend([
        ("rbd_cache".to_string(), "true".to_string()),
        ("osd_pool_default_size".to_string(), "2".to_string()),
    ]);
    config
        .entry("osd".to_string())
        .or_default()
        .insert("osd_memory_target".to_string(), "4294967296".to_string());
    config
        .entry("osd.3".to_string())
        .or_default()
        .insert("osd_max_backfills".to_string(), "1".to_string());
    config
}

fn write_spec(dir: &Utf8Path, contents: &str) -> Utf8PathBuf {
    let path = dir.join("cluster.yaml");
    std::fs::write(&path, contents).unwrap();
    path
}

async fn apply(service: &Service, documents: &[SpecDocument]) {
    for document in documents {
        match document {
            SpecDocument::CephConfig(desired) => {
                service.apply_ceph_config(desired).await.unwrap();
            }
            SpecDocument::CephOsdConfig(desired) => {
                service.apply_osd_config(desired).await.unwrap();
            }
        }
    }
}

#[tokio::test]
async fn test_apply_spec_file() {
    let dir = Utf8TempDir::new().unwrap();
    let documents = load_spec_file(&write_spec(dir.path(), SPEC)).unwrap();
    assert_eq!(documents.len(), 2);

    let ceph = Arc::new(FakeCeph::new().with_config(current_config()));
    let service = Service::new(ceph.clone(), &test_logger());
    apply(&service, &documents).await;

    let set = |section: &str, key: &str, value: &str| {
        CephCall::SetConfigOption {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    };
    assert_eq!(
        ceph.calls(),
        [
            CephCall::DumpConfig,
            set("global", "osd_pool_default_size", "3"),
            set("mon", "mon_allow_pool_delete", "true"),
            // "osd.3" sorts before "osd" once flattened.
            set("osd.3", "osd_max_backfills", "4"),
            CephCall::RemoveConfigOption {
                section: "osd".to_string(),
                key: "osd_memory_target".to_string(),
            },
            CephCall::DumpOsdConfig,
            CephCall::SetOsdConfigOption {
                key: "full_ratio".to_string(),
                value: ScalarValue::Float(0.97),
            },
            CephCall::SetOsdConfigOption {
                key: "require_min_compat_client".to_string(),
                value: ScalarValue::String("squid".to_string()),
            },
        ]
    );
    assert_eq!(
        ceph.osd_config(),
        CephOsdConfig {
            full_ratio: 0.97,
            require_min_compat_client: "squid".to_string(),
            ..CephOsdConfig::default()
        }
    );

    // Applying again is a no-op.
    let before = ceph.calls().len();
    apply(&service, &documents).await;
    assert_eq!(
        ceph.calls()[before..],
        [CephCall::DumpConfig, CephCall::DumpOsdConfig]
    );
}

#[tokio::test]
async fn test_diff_spec_file() {
    let dir = Utf8TempDir::new().unwrap();
    let documents = load_spec_file(&write_spec(dir.path(), SPEC)).unwrap();

    let ceph = Arc::new(FakeCeph::new().with_config(current_config()));
    let service = Service::new(ceph.clone(), &test_logger());

    let mut printer = Printer::new(false, Vec::new());
    for document in &documents {
        match document {
            SpecDocument::CephConfig(desired) => {
                let changes = service.diff_ceph_config(desired).await.unwrap();
                printer.print_differences(&changes).unwrap();
            }
            SpecDocument::CephOsdConfig(desired) => {
                let changes = service.diff_osd_config(desired).await.unwrap();
                printer.print_osd_differences(&changes).unwrap();
            }
        }
    }
    let output = String::from_utf8(printer.into_inner()).unwrap();
    expectorate::assert_contents("tests/output/diff.txt", &output);

    // Nothing was changed.
    assert_eq!(ceph.config(), current_config());
    assert_eq!(ceph.osd_config(), CephOsdConfig::default());
}

#[tokio::test]
async fn test_dump_round_trip() {
    let ceph = Arc::new(FakeCeph::new().with_config(current_config()));
    let service = Service::new(ceph.clone(), &test_logger());

    let dump = [
        SpecDocument::CephConfig(service.dump_config().await.unwrap()),
        SpecDocument::CephOsdConfig(service.dump_osd_config().await.unwrap()),
    ]
    .iter()
    .map(|document| document.to_yaml().unwrap())
    .collect::<Vec<_>>()
    .join("---\n");

    let dir = Utf8TempDir::new().unwrap();
    let documents = load_spec_file(&write_spec(dir.path(), &dump)).unwrap();
    apply(&service, &documents).await;

    assert!(ceph.calls().iter().all(|call| matches!(
        call,
        CephCall::DumpConfig | CephCall::DumpOsdConfig
    )));
    assert_eq!(ceph.config(), current_config());
}
