// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging setup of the command line tool.
//!
//! The backend accepts all records and [`log::max_level()`] acts as the
//! gate. Without `RUST_LOG` only warnings and errors pass until the
//! debug mode is enabled.

use log::LevelFilter;

const QUIET_LEVEL: LevelFilter = LevelFilter::Warn;

/// Installs the `env_logger` backend.
///
/// Calling it more than once is harmless.
pub fn init() {
    let filter_from_env = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Trace).parse_default_env();
    if builder.try_init().is_err() {
        return;
    }
    if !filter_from_env {
        log::set_max_level(QUIET_LEVEL);
    }
}

/// Opens or closes the log gate for the frame level records.
pub fn set_debug(debug: bool) {
    if debug {
        log::set_max_level(LevelFilter::Trace);
    } else if std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_none() {
        log::set_max_level(QUIET_LEVEL);
    }
}
