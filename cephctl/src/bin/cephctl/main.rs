// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declarative configuration and health checking for Ceph clusters

use camino::Utf8PathBuf;
use cephctl::ceph_cli::DEFAULT_CEPH_BINARY;
use cephctl::health::default_report_checks;
use cephctl::health::default_status_checks;
use cephctl::spec::load_spec_file;
use cephctl::CephCli;
use cephctl::Printer;
use cephctl::Service;
use cephctl::SpecDocument;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use slog::debug;
use slog::Drain;
use slog::Level;
use slog::LevelFilter;
use slog::Logger;
use slog_term::FullFormat;
use slog_term::TermDecorator;
use std::io;
use std::sync::Arc;
use std::time::Duration;

const BUILD_TIMESTAMP: &str = match option_env!("CEPHCTL_BUILD_TIMESTAMP") {
    Some(timestamp) => timestamp,
    None => "undefined",
};

/// Control Ceph cluster configuration just like any other declarative
/// configuration
#[derive(Debug, Parser)]
#[command(name = "cephctl", version)]
struct Cephctl {
    /// Path to the ceph binary
    #[arg(
        short = 'b',
        long,
        env = "CEPHCTL_CEPH_BINARY",
        default_value = DEFAULT_CEPH_BINARY,
        global = true,
    )]
    ceph_binary: Utf8PathBuf,

    /// Enable debug logging
    #[arg(short, long, env = "CEPHCTL_DEBUG", global = true)]
    debug: bool,

    /// Enable trace logging (very verbose)
    #[arg(short, long, env = "CEPHCTL_TRACE", global = true)]
    trace: bool,

    /// Colorize output
    #[arg(
        short,
        long,
        env = "CEPHCTL_COLOR",
        default_value_t = true,
        action = ArgAction::Set,
        global = true,
    )]
    color: bool,

    /// How long to wait for each ceph command
    #[arg(
        long,
        env = "CEPHCTL_TIMEOUT",
        default_value = "60s",
        value_parser = humantime::parse_duration,
        global = true,
    )]
    timeout: Duration,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Apply the configuration in a specification file
    Apply {
        /// Specification file
        filename: Utf8PathBuf,
    },
    /// Show the difference between running and desired configuration
    Diff {
        /// Specification file
        filename: Utf8PathBuf,
    },
    /// Dump the running configuration as a specification
    #[command(subcommand)]
    Dump(DumpCmd),
    /// Check cluster health using `ceph report`
    Healthcheck,
    /// Check cluster health using `ceph status`
    Status,
    /// Print version and exit
    Version,
}

#[derive(Debug, Subcommand)]
enum DumpCmd {
    /// Dump the central configuration database
    Cephconfig,
    /// Dump the OSD map settings
    Cephosdconfig,
}

impl Cephctl {
    fn log_level(&self) -> Level {
        if self.trace {
            Level::Trace
        } else if self.debug {
            Level::Debug
        } else {
            Level::Warning
        }
    }

    async fn exec(self, log: &Logger) -> anyhow::Result<()> {
        let ceph = CephCli::new(self.ceph_binary, self.timeout, log);
        let service = Service::new(Arc::new(ceph), log);
        let mut printer = Printer::new(self.color, io::stdout());

        match self.cmd {
            Cmd::Apply { filename } => {
                debug!(log, "running apply"; "filename" => %filename);
                for document in load_spec_file(&filename)? {
                    match document {
                        SpecDocument::CephConfig(desired) => {
                            let changes =
                                service.apply_ceph_config(&desired).await?;
                            printer.print_differences(&changes)?;
                        }
                        SpecDocument::CephOsdConfig(desired) => {
                            let changes =
                                service.apply_osd_config(&desired).await?;
                            printer.print_osd_differences(&changes)?;
                        }
                    }
                }
            }
            Cmd::Diff { filename } => {
                debug!(log, "running diff"; "filename" => %filename);
                for document in load_spec_file(&filename)? {
                    match document {
                        SpecDocument::CephConfig(desired) => {
                            let changes =
                                service.diff_ceph_config(&desired).await?;
                            printer.print_differences(&changes)?;
                        }
                        SpecDocument::CephOsdConfig(desired) => {
                            let changes =
                                service.diff_osd_config(&desired).await?;
                            printer.print_osd_differences(&changes)?;
                        }
                    }
                }
            }
            Cmd::Dump(DumpCmd::Cephconfig) => {
                let document =
                    SpecDocument::CephConfig(service.dump_config().await?);
                printer.print_yaml(&document.to_yaml()?)?;
            }
            Cmd::Dump(DumpCmd::Cephosdconfig) => {
                let osd_config = service.dump_osd_config().await?;
                let document = SpecDocument::CephOsdConfig(osd_config);
                printer.print_yaml(&document.to_yaml()?)?;
            }
            Cmd::Healthcheck => {
                let indicators = service
                    .check_cluster_health(&default_report_checks())
                    .await?;
                printer.print_indicators(&indicators)?;
            }
            Cmd::Status => {
                let indicators = service
                    .check_cluster_status(&default_status_checks())
                    .await?;
                printer.print_indicators(&indicators)?;
            }
            Cmd::Version => {
                let argv0 = std::env::args()
                    .next()
                    .unwrap_or_else(|| "cephctl".to_string());
                println!(
                    "{argv0} {} built @ {BUILD_TIMESTAMP}",
                    env!("CARGO_PKG_VERSION"),
                );
            }
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cephctl::parse();

    let decorator = TermDecorator::new().stderr().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = LevelFilter::new(drain, args.log_level()).fuse();
    let log = Logger::root(drain, slog::o!("unit" => "cephctl"));

    args.exec(&log).await
}
