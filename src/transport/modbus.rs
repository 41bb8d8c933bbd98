// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{fmt, io, time::Duration};

use tokio_modbus::{
    client::sync::Context,
    prelude::{SyncReader as _, SyncWriter as _},
};

use super::Transport;
use crate::{logging, Address, Coil, Connection, Error, Quantity, Result, Slave, Word};

/// [`Transport`] backed by a synchronous _tokio-modbus_ client context.
pub struct ModbusTransport {
    connection: Connection,
    slave: Slave,
    timeout: Option<Duration>,
    debug: bool,
    context: Option<Context>,
}

impl fmt::Debug for ModbusTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModbusTransport")
            .field("connection", &self.connection)
            .field("slave", &self.slave)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl ModbusTransport {
    #[must_use]
    pub fn new(connection: Connection, slave: Slave) -> Self {
        Self {
            connection,
            slave,
            timeout: None,
            debug: false,
            context: None,
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.context.is_some()
    }

    fn context(&mut self) -> Result<&mut Context> {
        self.context.as_mut().ok_or_else(|| {
            Error::Connection(io::Error::new(
                io::ErrorKind::NotConnected,
                "not connected",
            ))
        })
    }

    fn open(&self) -> io::Result<Context> {
        match &self.connection {
            #[cfg(feature = "tcp")]
            Connection::Tcp(params) => super::tcp::connect(params, self.slave, self.timeout),
            #[cfg(feature = "rtu")]
            Connection::Rtu(params) => super::rtu::connect(params, self.slave, self.timeout),
            #[allow(unreachable_patterns)]
            connection => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{} is not supported in this build", connection.kind()),
            )),
        }
    }

    fn trace_call(&self, call: fmt::Arguments<'_>) {
        if self.debug {
            log::debug!("Call {call} on {}", self.connection);
        }
    }
}

impl Transport for ModbusTransport {
    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        logging::set_debug(debug);
    }

    fn set_response_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
        if let Some(context) = self.context.as_mut() {
            context.set_timeout(Some(timeout));
        }
    }

    fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        log::debug!("Connecting to {} slave {}", self.connection, self.slave);
        let context = self.open().map_err(Error::Connection)?;
        self.context = Some(context);
        Ok(())
    }

    fn read_coils(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Coil>> {
        self.trace_call(format_args!("read_coils({addr:#06x}, {cnt})"));
        Ok(self.context()?.read_coils(addr, cnt)??)
    }

    fn read_discrete_inputs(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Coil>> {
        self.trace_call(format_args!("read_discrete_inputs({addr:#06x}, {cnt})"));
        Ok(self.context()?.read_discrete_inputs(addr, cnt)??)
    }

    fn read_holding_registers(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Word>> {
        self.trace_call(format_args!("read_holding_registers({addr:#06x}, {cnt})"));
        Ok(self.context()?.read_holding_registers(addr, cnt)??)
    }

    fn read_input_registers(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Word>> {
        self.trace_call(format_args!("read_input_registers({addr:#06x}, {cnt})"));
        Ok(self.context()?.read_input_registers(addr, cnt)??)
    }

    fn write_single_coil(&mut self, addr: Address, coil: Coil) -> Result<()> {
        self.trace_call(format_args!("write_single_coil({addr:#06x}, {coil})"));
        Ok(self.context()?.write_single_coil(addr, coil)??)
    }

    fn write_multiple_coils(&mut self, addr: Address, coils: &[Coil]) -> Result<()> {
        self.trace_call(format_args!("write_multiple_coils({addr:#06x}, {coils:?})"));
        Ok(self.context()?.write_multiple_coils(addr, coils)??)
    }

    fn write_single_register(&mut self, addr: Address, word: Word) -> Result<()> {
        self.trace_call(format_args!("write_single_register({addr:#06x}, {word:#06x})"));
        Ok(self.context()?.write_single_register(addr, word)??)
    }

    fn write_multiple_registers(&mut self, addr: Address, words: &[Word]) -> Result<()> {
        self.trace_call(format_args!("write_multiple_registers({addr:#06x}, {words:04x?})"));
        Ok(self.context()?.write_multiple_registers(addr, words)??)
    }

    fn close(&mut self) {
        if self.context.take().is_some() {
            log::debug!("Disconnected from {}", self.connection);
        }
    }
}
