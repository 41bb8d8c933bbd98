// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transports used by the dispatcher

use std::time::Duration;

use crate::{Address, Coil, Quantity, Result, Word};

#[cfg(any(feature = "tcp", feature = "rtu"))]
mod modbus;

#[cfg(feature = "rtu")]
pub mod rtu;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(any(feature = "tcp", feature = "rtu"))]
pub use self::modbus::ModbusTransport;

/// A transport independent synchronous _Modbus_ client.
///
/// [`connect()`](Self::connect) must succeed before any read or write
/// operation is invoked. [`close()`](Self::close) releases the connection
/// and may be called repeatedly.
pub trait Transport {
    /// Enables verbose logging of the exchanged frames.
    fn set_debug(&mut self, debug: bool);

    /// Sets the time to wait for each response.
    fn set_response_timeout(&mut self, timeout: Duration);

    fn connect(&mut self) -> Result<()>;

    /// Read multiple coils (0x01)
    fn read_coils(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Coil>>;

    /// Read multiple discrete inputs (0x02)
    fn read_discrete_inputs(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Coil>>;

    /// Read multiple holding registers (0x03)
    fn read_holding_registers(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Word>>;

    /// Read multiple input registers (0x04)
    fn read_input_registers(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Word>>;

    /// Write a single coil (0x05)
    fn write_single_coil(&mut self, addr: Address, coil: Coil) -> Result<()>;

    /// Write multiple coils (0x0F)
    fn write_multiple_coils(&mut self, addr: Address, coils: &[Coil]) -> Result<()>;

    /// Write a single holding register (0x06)
    fn write_single_register(&mut self, addr: Address, word: Word) -> Result<()>;

    /// Write multiple holding registers (0x10)
    fn write_multiple_registers(&mut self, addr: Address, words: &[Word]) -> Result<()>;

    fn close(&mut self);
}
