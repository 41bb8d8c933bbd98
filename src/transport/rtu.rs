// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connecting a Modbus RTU context

use std::{io, time::Duration};

use tokio_modbus::client::sync::{self, Context};
use tokio_serial::{DataBits, SerialPortBuilder, StopBits};

use crate::{Parity, RtuParams, Slave};

/// Connect to a slave device on a serial line.
pub fn connect(params: &RtuParams, slave: Slave, timeout: Option<Duration>) -> io::Result<Context> {
    let builder = serial_port_builder(params)?;
    sync::rtu::connect_slave_with_timeout(&builder, slave, timeout)
}

/// Translates the serial line settings.
pub fn serial_port_builder(params: &RtuParams) -> io::Result<SerialPortBuilder> {
    let parity = match params.parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Even => tokio_serial::Parity::Even,
        Parity::Odd => tokio_serial::Parity::Odd,
    };
    let data_bits = match params.data_bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        8 => DataBits::Eight,
        bits => return Err(invalid_setting("data bits", bits)),
    };
    let stop_bits = match params.stop_bits {
        1 => StopBits::One,
        2 => StopBits::Two,
        bits => return Err(invalid_setting("stop bits", bits)),
    };
    Ok(tokio_serial::new(params.device.as_str(), params.baud)
        .parity(parity)
        .data_bits(data_bits)
        .stop_bits(stop_bits))
}

fn invalid_setting(name: &str, value: u8) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("unsupported number of {name}: {value}"),
    )
}
