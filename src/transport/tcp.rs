// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connecting a Modbus TCP context

use std::{io, time::Duration};

use tokio_modbus::client::sync::{self, Context};

use crate::{Slave, TcpParams};

/// Connect to a Modbus TCP server, or to a slave device behind a
/// Modbus TCP/RTU gateway that forwards messages for the given unit.
pub fn connect(params: &TcpParams, slave: Slave, timeout: Option<Duration>) -> io::Result<Context> {
    sync::tcp::connect_slave_with_timeout(params.socket_addr(), slave, timeout)
}
