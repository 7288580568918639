// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Console output for the `cephctl` commands.

use cephctl_types::CephConfigDifference;
use cephctl_types::CephOsdConfigDifference;
use cephctl_types::ClusterHealthIndicator;
use cephctl_types::ClusterHealthIndicatorStatus;
use owo_colors::OwoColorize;
use owo_colors::Style;
use std::io;

/// Width of the widest status, `DANGEROUS`.
const STATUS_WIDTH: usize = 9;

#[derive(Clone, Debug, Default)]
struct Styles {
    added: Style,
    changed: Style,
    removed: Style,
    good: Style,
    at_risk: Style,
    dangerous: Style,
    unknown: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.added = Style::new().green();
        self.changed = Style::new().yellow();
        self.removed = Style::new().red();
        self.good = Style::new().green();
        self.at_risk = Style::new().yellow();
        self.dangerous = Style::new().red();
        self.unknown = Style::new().bright_red();
    }

    fn status(&self, status: ClusterHealthIndicatorStatus) -> Style {
        match status {
            ClusterHealthIndicatorStatus::Good => self.good,
            ClusterHealthIndicatorStatus::AtRisk => self.at_risk,
            ClusterHealthIndicatorStatus::Dangerous => self.dangerous,
            ClusterHealthIndicatorStatus::Unknown => self.unknown,
        }
    }
}

/// Writes differences, indicators, and dumps to `out`, one item per line.
pub struct Printer<W> {
    out: W,
    styles: Styles,
}

impl<W: io::Write> Printer<W> {
    pub fn new(colorize: bool, out: W) -> Self {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }
        Self { out, styles }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print_differences(
        &mut self,
        changes: &[CephConfigDifference],
    ) -> io::Result<()> {
        for change in changes {
            match change {
                CephConfigDifference::Add { section, key, value } => writeln!(
                    self.out,
                    "{}",
                    format!("+ {section} {key} {value}")
                        .style(self.styles.added)
                )?,
                CephConfigDifference::Change {
                    section,
                    key,
                    old_value,
                    value,
                } => writeln!(
                    self.out,
                    "{}",
                    format!("~ {section} {key} {old_value} -> {value}")
                        .style(self.styles.changed)
                )?,
                CephConfigDifference::Remove { section, key } => writeln!(
                    self.out,
                    "{}",
                    format!("- {section} {key}").style(self.styles.removed)
                )?,
            }
        }
        Ok(())
    }

    pub fn print_osd_differences(
        &mut self,
        changes: &[CephOsdConfigDifference],
    ) -> io::Result<()> {
        for change in changes {
            writeln!(
                self.out,
                "{}",
                format!(
                    "~ {} {} -> {}",
                    change.key, change.old_value, change.value
                )
                .style(self.styles.changed)
            )?;
        }
        Ok(())
    }

    pub fn print_indicators(
        &mut self,
        indicators: &[ClusterHealthIndicator],
    ) -> io::Result<()> {
        for indicator in indicators {
            let line = format!(
                "[{:>width$}] {} = {}",
                indicator.status,
                indicator.indicator,
                indicator.current_value,
                width = STATUS_WIDTH,
            );
            writeln!(
                self.out,
                "{}",
                line.style(self.styles.status(indicator.status))
            )?;
        }
        Ok(())
    }

    /// Prints an already rendered YAML document, uncolored.
    pub fn print_yaml(&mut self, yaml: &str) -> io::Result<()> {
        self.out.write_all(yaml.as_bytes())?;
        if !yaml.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }
}
