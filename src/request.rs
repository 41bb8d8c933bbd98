// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validated request types handed from the parser to the dispatcher.

use std::{
    fmt,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

pub use tokio_modbus::Slave;

/// A Modbus protocol address is represented by 16 bit from `0` to `65535`.
///
/// This *protocol address* uses 0-based indexing. The tool passes it
/// through unchanged, no 1-based register numbering is applied.
pub type Address = u16;

/// Number of items to process.
pub type Quantity = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items.
pub type Word = u16;

/// Maximum number of coils or discrete inputs per read request (0x01, 0x02).
pub const MAX_READ_BITS: Quantity = 2000;

/// Maximum number of registers per read request (0x03, 0x04).
pub const MAX_READ_REGISTERS: Quantity = 125;

/// Response timeout used when no `-t` option is given.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_micros(50_000);

/// Slave device addressed when no `-s` option is given.
pub const DEFAULT_SLAVE: Slave = Slave(1);

/// The operation selected by an action keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// `rc`: Read Coils (0x01)
    ReadCoils,
    /// `rd`: Read Discrete Inputs (0x02)
    ReadDiscreteInputs,
    /// `rh`: Read Holding Registers (0x03)
    ReadHoldingRegisters,
    /// `ri`: Read Input Registers (0x04)
    ReadInputRegisters,
    /// `wc`: Write Single Coil (0x05) or Write Multiple Coils (0x0F)
    WriteCoils,
    /// `wh`: Write Single Register (0x06) or Write Multiple Registers (0x10)
    WriteRegisters,
    /// No action keyword has been seen yet.
    #[default]
    Undefined,
}

impl Action {
    pub(crate) fn from_keyword(keyword: &[u8]) -> Option<Self> {
        let action = match keyword {
            b"rc" => Self::ReadCoils,
            b"rd" => Self::ReadDiscreteInputs,
            b"rh" => Self::ReadHoldingRegisters,
            b"ri" => Self::ReadInputRegisters,
            b"wc" => Self::WriteCoils,
            b"wh" => Self::WriteRegisters,
            _ => return None,
        };
        Some(action)
    }

    /// The command line keyword of this action.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::ReadCoils => "rc",
            Self::ReadDiscreteInputs => "rd",
            Self::ReadHoldingRegisters => "rh",
            Self::ReadInputRegisters => "ri",
            Self::WriteCoils => "wc",
            Self::WriteRegisters => "wh",
            Self::Undefined => "",
        }
    }

    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(
            self,
            Self::ReadCoils
                | Self::ReadDiscreteInputs
                | Self::ReadHoldingRegisters
                | Self::ReadInputRegisters
        )
    }

    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::WriteCoils | Self::WriteRegisters)
    }

    /// The per request limit of the protocol for read actions.
    #[must_use]
    pub const fn max_read_quantity(self) -> Option<Quantity> {
        match self {
            Self::ReadCoils | Self::ReadDiscreteInputs => Some(MAX_READ_BITS),
            Self::ReadHoldingRegisters | Self::ReadInputRegisters => Some(MAX_READ_REGISTERS),
            Self::WriteCoils | Self::WriteRegisters | Self::Undefined => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadCoils => "read coils",
            Self::ReadDiscreteInputs => "read discrete inputs",
            Self::ReadHoldingRegisters => "read holding registers",
            Self::ReadInputRegisters => "read input registers",
            Self::WriteCoils => "write coils",
            Self::WriteRegisters => "write registers",
            Self::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// The transport selected by the `tcp` or `rtu` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    Tcp,
    Rtu,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("Modbus TCP"),
            Self::Rtu => f.write_str("Modbus RTU"),
        }
    }
}

/// Serial line parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    /// `N`
    None,
    /// `E`
    Even,
    /// `O`
    Odd,
}

impl Parity {
    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'N' => Some(Self::None),
            b'E' => Some(Self::Even),
            b'O' => Some(Self::Odd),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::None => 'N',
            Self::Even => 'E',
            Self::Odd => 'O',
        }
    }
}

/// Parameters of a Modbus TCP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpParams {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl TcpParams {
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.ip, self.port))
    }
}

/// Parameters of a Modbus RTU connection over a serial line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtuParams {
    /// Path of the serial device, e.g. `/dev/ttyUSB0`.
    pub device: String,
    pub baud: u32,
    pub parity: Parity,
    /// 5 to 8
    pub data_bits: u8,
    /// 1 or 2
    pub stop_bits: u8,
}

/// Complete connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Tcp(TcpParams),
    Rtu(RtuParams),
}

impl Connection {
    #[must_use]
    pub const fn kind(&self) -> ConnectionKind {
        match self {
            Self::Tcp(_) => ConnectionKind::Tcp,
            Self::Rtu(_) => ConnectionKind::Rtu,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(params) => write!(f, "tcp {}", params.socket_addr()),
            Self::Rtu(params) => write!(
                f,
                "rtu {} {} {}{}{}",
                params.device,
                params.baud,
                params.data_bits,
                params.parity.as_char(),
                params.stop_bits
            ),
        }
    }
}

/// A completely parsed and validated command.
///
/// Created by [`RequestDescriptor::finalize()`](crate::RequestDescriptor::finalize)
/// and consumed read-only by [`dispatch()`](crate::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub connection: Connection,
    pub slave: Slave,
    pub action: Action,
    pub address: Address,
    pub count: Quantity,
    /// Values to write, `count` items for write actions and empty otherwise.
    ///
    /// Coil values are stored as `0` or `1`.
    pub values: Vec<Word>,
    /// Display coils negated and registers byte-swapped.
    pub inverse: bool,
    pub debug: bool,
    pub timeout: Duration,
}

impl Request {
    /// The values to write as coils.
    #[must_use]
    pub fn coils(&self) -> Vec<Coil> {
        self.values.iter().map(|value| *value != 0).collect()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} slave {} {} address 0x{:04x} count {} timeout {}us",
            self.connection,
            self.slave,
            self.action,
            self.address,
            self.count,
            self.timeout.as_micros()
        )?;
        if !self.values.is_empty() {
            write!(f, " values {:?}", self.values)?;
        }
        if self.inverse {
            f.write_str(" inverse")?;
        }
        Ok(())
    }
}
