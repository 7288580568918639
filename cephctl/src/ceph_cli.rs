// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to a live cluster through the `ceph` CLI.

use camino::Utf8PathBuf;
use cephctl_types::raw::RawConfigOption;
use cephctl_types::raw::RawOsdDump;
use cephctl_types::raw::RawReport;
use cephctl_types::raw::RawStatus;
use cephctl_types::CephConfig;
use cephctl_types::CephOsdConfig;
use cephctl_types::Device;
use cephctl_types::ScalarValue;
use serde::de::DeserializeOwned;
use slog::debug;
use slog::o;
use slog::trace;
use slog::Logger;
use std::io;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

pub const DEFAULT_CEPH_BINARY: &str = "/usr/bin/ceph";

/// How long a single `ceph` invocation may run before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct CommandFailureInfo {
    command: String,
    status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl std::fmt::Display for CommandFailureInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "command [{}] executed and failed with status: {}",
            self.command, self.status
        )?;
        write!(f, "  stdout: {}", self.stdout)?;
        write!(f, "  stderr: {}", self.stderr)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CephCliError {
    #[error("failed to invoke `ceph {subcommand}`")]
    InvokeCli {
        subcommand: &'static str,
        #[source]
        err: io::Error,
    },
    #[error("{0}")]
    CommandFailure(Box<CommandFailureInfo>),
    #[error(
        "failed to parse output of `ceph {subcommand}`: \
         stdout {stdout:?}, stderr {stderr:?}"
    )]
    ParseOutput {
        subcommand: &'static str,
        stdout: String,
        stderr: String,
        #[source]
        err: serde_json::Error,
    },
    #[error("`ceph {subcommand}` did not complete within {timeout:?}")]
    Timeout { subcommand: &'static str, timeout: Duration },
    #[error("unknown OSD configuration option {key:?}")]
    UnknownOsdOption { key: String },
    #[error("OSD configuration option {key:?} cannot be set to {value}")]
    UnsupportedOsdValue { key: String, value: String },
}

fn output_to_exec_error(
    command: &std::process::Command,
    output: &Output,
) -> CephCliError {
    CephCliError::CommandFailure(Box::new(CommandFailureInfo {
        command: command_to_string(command),
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }))
}

fn command_to_string(command: &std::process::Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The operations `cephctl` performs against a cluster.
#[async_trait::async_trait]
pub trait CephApi: Send + Sync {
    /// Returns the centralized configuration database.
    async fn dump_config(&self) -> Result<CephConfig, CephCliError>;

    async fn set_config_option(
        &self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), CephCliError>;

    async fn remove_config_option(
        &self,
        section: &str,
        key: &str,
    ) -> Result<(), CephCliError>;

    /// Returns the OSD map settings covered by [`CephOsdConfig`].
    async fn dump_osd_config(&self) -> Result<CephOsdConfig, CephCliError>;

    /// Sets a single [`CephOsdConfig`] field, identified by its name.
    async fn set_osd_config_option(
        &self,
        key: &str,
        value: &ScalarValue,
    ) -> Result<(), CephCliError>;

    async fn cluster_report(&self) -> Result<RawReport, CephCliError>;

    async fn cluster_status(&self) -> Result<RawStatus, CephCliError>;

    async fn list_devices(&self) -> Result<Vec<Device>, CephCliError>;
}

/// Returns the arguments of the `ceph` command that sets an OSD map option.
fn osd_option_args(
    key: &str,
    value: &ScalarValue,
) -> Result<Vec<String>, CephCliError> {
    let setter = match key {
        CephOsdConfig::NEARFULL_RATIO => "set-nearfull-ratio",
        CephOsdConfig::BACKFILLFULL_RATIO => "set-backfillfull-ratio",
        CephOsdConfig::FULL_RATIO => "set-full-ratio",
        CephOsdConfig::REQUIRE_MIN_COMPAT_CLIENT => {
            "set-require-min-compat-client"
        }
        CephOsdConfig::ALLOW_CRIMSON => {
            // The flag is one-way: Ceph offers no command to clear it.
            return match value {
                ScalarValue::Bool(true) => Ok(vec![
                    "osd".to_string(),
                    "set-allow-crimson".to_string(),
                    "--yes-i-really-mean-it".to_string(),
                ]),
                _ => Err(CephCliError::UnsupportedOsdValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
            };
        }
        _ => {
            return Err(CephCliError::UnknownOsdOption { key: key.to_string() })
        }
    };
    Ok(vec!["osd".to_string(), setter.to_string(), value.to_cli_arg()])
}

#[derive(Debug)]
pub struct CephCli {
    path_to_ceph_binary: Utf8PathBuf,
    timeout: Duration,
    log: Logger,
}

impl CephCli {
    pub fn new(
        path_to_ceph_binary: Utf8PathBuf,
        timeout: Duration,
        log: &Logger,
    ) -> Self {
        let log = log.new(o!(
            "component" => "CephCli",
            "binary" => path_to_ceph_binary.to_string(),
        ));
        Self { path_to_ceph_binary, timeout, log }
    }

    async fn invoke_cli_with_format_json<I, S, T>(
        &self,
        subcommand_args: I,
        subcommand_description: &'static str,
    ) -> Result<T, CephCliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        T: DeserializeOwned,
    {
        let args: Vec<String> = subcommand_args
            .into_iter()
            .map(|arg| arg.as_ref().to_string())
            .chain(["--format=json".to_string()])
            .collect();
        self.invoke_cli_checking_status(
            args,
            |output| {
                serde_json::from_slice(&output.stdout).map_err(|err| {
                    CephCliError::ParseOutput {
                        subcommand: subcommand_description,
                        stdout: String::from_utf8_lossy(&output.stdout)
                            .to_string(),
                        stderr: String::from_utf8_lossy(&output.stderr)
                            .to_string(),
                        err,
                    }
                })
            },
            subcommand_description,
        )
        .await
    }

    async fn invoke_cli_checking_status<I, S, F, T>(
        &self,
        subcommand_args: I,
        parse_output: F,
        subcommand_description: &'static str,
    ) -> Result<T, CephCliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnOnce(&Output) -> Result<T, CephCliError>,
    {
        let mut command = Command::new(&self.path_to_ceph_binary);
        for arg in subcommand_args {
            command.arg(arg.as_ref());
        }
        // A timed-out (or otherwise abandoned) invocation must not leave the
        // child behind.
        command.kill_on_drop(true);

        let command_str = command_to_string(command.as_std());
        debug!(self.log, "running ceph command"; "command" => &command_str);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| CephCliError::Timeout {
                subcommand: subcommand_description,
                timeout: self.timeout,
            })?
            .map_err(|err| CephCliError::InvokeCli {
                subcommand: subcommand_description,
                err,
            })?;

        trace!(
            self.log,
            "ceph command completed";
            "command" => &command_str,
            "status" => %output.status,
            "stdout" => %String::from_utf8_lossy(&output.stdout),
            "stderr" => %String::from_utf8_lossy(&output.stderr),
        );

        if !output.status.success() {
            return Err(output_to_exec_error(command.as_std(), &output));
        }
        parse_output(&output)
    }
}

#[async_trait::async_trait]
impl CephApi for CephCli {
    async fn dump_config(&self) -> Result<CephConfig, CephCliError> {
        let options: Vec<RawConfigOption> = self
            .invoke_cli_with_format_json(["config", "dump"], "config dump")
            .await?;
        Ok(RawConfigOption::collect(options))
    }

    async fn set_config_option(
        &self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), CephCliError> {
        self.invoke_cli_checking_status(
            ["config", "set", section, key, value],
            |_output| Ok(()),
            "config set",
        )
        .await
    }

    async fn remove_config_option(
        &self,
        section: &str,
        key: &str,
    ) -> Result<(), CephCliError> {
        self.invoke_cli_checking_status(
            ["config", "rm", section, key],
            |_output| Ok(()),
            "config rm",
        )
        .await
    }

    async fn dump_osd_config(&self) -> Result<CephOsdConfig, CephCliError> {
        let dump: RawOsdDump = self
            .invoke_cli_with_format_json(["osd", "dump"], "osd dump")
            .await?;
        Ok(dump.into())
    }

    async fn set_osd_config_option(
        &self,
        key: &str,
        value: &ScalarValue,
    ) -> Result<(), CephCliError> {
        let args = osd_option_args(key, value)?;
        self.invoke_cli_checking_status(args, |_output| Ok(()), "osd set")
            .await
    }

    async fn cluster_report(&self) -> Result<RawReport, CephCliError> {
        self.invoke_cli_with_format_json(["report"], "report").await
    }

    async fn cluster_status(&self) -> Result<RawStatus, CephCliError> {
        self.invoke_cli_with_format_json(["status"], "status").await
    }

    async fn list_devices(&self) -> Result<Vec<Device>, CephCliError> {
        self.invoke_cli_with_format_json(["device", "ls"], "device ls").await
    }
}
