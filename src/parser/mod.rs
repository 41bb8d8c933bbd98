// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument parsing automaton
//!
//! Every command line argument is one token. The automaton keeps its
//! position between tokens in [`RequestDescriptor`], so multi-token
//! constructs like `rtu <device> <baud> <parity> <data bits> <stop bits>`
//! are parsed incrementally without looking back at earlier tokens.
//!
//! A token either completes a construct ([`Step::Accepted`]), starts or
//! continues one ([`Step::Continuing`]), or is refused
//! ([`Step::Rejected`]). A refused token never modifies the descriptor.

pub(crate) mod literal;

use std::{net::Ipv4Addr, time::Duration};

use crate::{
    descriptor::{ExceptionFlags, RequestDescriptor, ValueList, MAX_TOKEN_LEN},
    error::{Classification, Rejection},
    Action, Address, Connection, ConnectionKind, Parity, Quantity, Request, Result, RtuParams,
    Slave, TcpParams,
};

/// Outcome of feeding a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The token was consumed, but the construct it belongs to awaits
    /// more tokens.
    Continuing,
    /// The token completed a construct and the descriptor was updated.
    Accepted,
    /// The token is not valid at the current position.
    Rejected(Rejection),
}

impl Step {
    #[must_use]
    pub const fn classification(&self) -> Option<Classification> {
        match self {
            Self::Rejected(rejection) => Some(rejection.classification()),
            Self::Continuing | Self::Accepted => None,
        }
    }
}

/// Position of the automaton between two tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum State {
    /// At a token boundary, any top level token may follow.
    #[default]
    Ready,
    TcpIp,
    TcpPort {
        ip: Ipv4Addr,
    },
    RtuDevice,
    RtuBaud {
        device: String,
    },
    RtuParity {
        device: String,
        baud: u32,
    },
    RtuDataBits {
        device: String,
        baud: u32,
        parity: Parity,
    },
    RtuStopBits {
        device: String,
        baud: u32,
        parity: Parity,
        data_bits: u8,
    },
    /// An option like `-a` was given without its value.
    Operand(Operand),
}

impl State {
    /// What the automaton still waits for, `None` at a token boundary.
    pub(crate) const fn awaiting(&self) -> Option<&'static str> {
        let awaiting = match self {
            Self::Ready => return None,
            Self::TcpIp => "IPv4 address",
            Self::TcpPort { .. } => "TCP port",
            Self::RtuDevice => "serial device",
            Self::RtuBaud { .. } => "baud rate",
            Self::RtuParity { .. } => "parity (N, E or O)",
            Self::RtuDataBits { .. } => "data bits",
            Self::RtuStopBits { .. } => "stop bits",
            Self::Operand(operand) => operand.describe(),
        };
        Some(awaiting)
    }
}

/// Options that carry a value, either attached (`-a0x10`) or as the
/// following token (`-a 0x10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    Address,
    Count,
    Timeout,
    Slave,
}

impl Operand {
    const fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            b'a' => Some(Self::Address),
            b'c' => Some(Self::Count),
            b't' => Some(Self::Timeout),
            b's' => Some(Self::Slave),
            _ => None,
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Address => "address value (-a)",
            Self::Count => "count value (-c)",
            Self::Timeout => "timeout value (-t)",
            Self::Slave => "slave id (-s)",
        }
    }
}

type Transition = std::result::Result<State, Classification>;

impl RequestDescriptor {
    /// Feeds the next command line argument.
    pub fn feed(&mut self, token: impl AsRef<[u8]>) -> Step {
        let token = token.as_ref();
        self.exception_flags = ExceptionFlags::empty();
        let transition = if token.len() > MAX_TOKEN_LEN {
            Err(Classification::Length)
        } else {
            self.advance(token)
        };
        let step = match transition {
            Ok(state) => {
                self.state = state;
                if self.state == State::Ready {
                    Step::Accepted
                } else {
                    Step::Continuing
                }
            }
            Err(classification) => {
                let rejection = Rejection::new(classification, token);
                self.exception_flags = ExceptionFlags::from_classification(classification);
                self.last_error = Some(rejection.clone());
                Step::Rejected(rejection)
            }
        };
        log::trace!(
            "argument: '{}' end state: {:?}",
            String::from_utf8_lossy(token),
            self.state
        );
        step
    }

    fn advance(&mut self, token: &[u8]) -> Transition {
        match self.state.clone() {
            State::Ready => self.top_level(token),
            State::TcpIp => literal::ipv4(token).map(|ip| State::TcpPort { ip }),
            State::TcpPort { ip } => {
                let port = literal::positive(literal::u16_value(token)?)?;
                self.connection = Some(Connection::Tcp(TcpParams { ip, port }));
                Ok(State::Ready)
            }
            State::RtuDevice => literal::device_path(token).map(|device| State::RtuBaud { device }),
            State::RtuBaud { device } => {
                let baud = literal::positive(literal::u32_value(token)?)?;
                Ok(State::RtuParity { device, baud })
            }
            State::RtuParity { device, baud } => {
                let parity = literal::parity(token)?;
                Ok(State::RtuDataBits {
                    device,
                    baud,
                    parity,
                })
            }
            State::RtuDataBits {
                device,
                baud,
                parity,
            } => {
                let data_bits = literal::digit_in(token, 5..=8)?;
                Ok(State::RtuStopBits {
                    device,
                    baud,
                    parity,
                    data_bits,
                })
            }
            State::RtuStopBits {
                device,
                baud,
                parity,
                data_bits,
            } => {
                let stop_bits = literal::digit_in(token, 1..=2)?;
                self.connection = Some(Connection::Rtu(RtuParams {
                    device,
                    baud,
                    parity,
                    data_bits,
                    stop_bits,
                }));
                Ok(State::Ready)
            }
            State::Operand(operand) => {
                self.operand(operand, token)?;
                Ok(State::Ready)
            }
        }
    }

    fn top_level(&mut self, token: &[u8]) -> Transition {
        match token {
            b"tcp" => self.connection_keyword(ConnectionKind::Tcp),
            b"rtu" => self.connection_keyword(ConnectionKind::Rtu),
            b"-i" => {
                self.inverse = true;
                Ok(State::Ready)
            }
            b"-d" => {
                self.debug = true;
                Ok(State::Ready)
            }
            [b'-', flag, literal @ ..] => match Operand::from_flag(*flag) {
                Some(operand) => self.option(operand, literal),
                None if flag.is_ascii_digit() => self.value(token),
                None => Err(Classification::Syntax),
            },
            [b'0'..=b'9', ..] => self.value(token),
            _ => match Action::from_keyword(token) {
                Some(action) => self.action_keyword(action),
                None => Err(Classification::Syntax),
            },
        }
    }

    fn connection_keyword(&mut self, kind: ConnectionKind) -> Transition {
        if self.connection_kind.is_some() {
            return Err(Classification::Syntax);
        }
        self.connection_kind = Some(kind);
        Ok(match kind {
            ConnectionKind::Tcp => State::TcpIp,
            ConnectionKind::Rtu => State::RtuDevice,
        })
    }

    fn action_keyword(&mut self, action: Action) -> Transition {
        if self.action != Action::Undefined {
            return Err(Classification::Syntax);
        }
        if let Some(count) = self.count {
            check_count(action, count)?;
        }
        self.action = action;
        Ok(State::Ready)
    }

    fn option(&mut self, operand: Operand, literal: &[u8]) -> Transition {
        let given = match operand {
            Operand::Address => self.address.is_some(),
            Operand::Count => self.count.is_some(),
            Operand::Timeout | Operand::Slave => false,
        };
        if given {
            return Err(Classification::Syntax);
        }
        if literal.is_empty() {
            return Ok(State::Operand(operand));
        }
        self.operand(operand, literal)?;
        Ok(State::Ready)
    }

    fn operand(&mut self, operand: Operand, literal: &[u8]) -> Result<(), Classification> {
        match operand {
            Operand::Address => {
                let address = literal::u16_value(literal)?;
                if let Some(count) = self.count {
                    check_span(address, count)?;
                }
                self.address = Some(address);
            }
            Operand::Count => {
                let count = literal::u16_value(literal)?;
                check_count(self.action, count)?;
                if let Some(address) = self.address {
                    check_span(address, count)?;
                }
                self.count = Some(count);
            }
            Operand::Timeout => {
                let micros = literal::positive(literal::u32_value(literal)?)?;
                self.timeout = Duration::from_micros(micros.into());
            }
            Operand::Slave => {
                let id = literal::u16_value(literal)?;
                let slave = u8::try_from(id)
                    .map(Slave)
                    .ok()
                    .filter(|slave| *slave <= Slave::max_device())
                    .ok_or(Classification::Range)?;
                self.slave = slave;
            }
        }
        Ok(())
    }

    /// Values follow the count of a write action.
    fn value(&mut self, token: &[u8]) -> Transition {
        if !self.action.is_write() || self.count.is_none() {
            return Err(Classification::Syntax);
        }
        if self.values.is_full() {
            return Err(Classification::Length);
        }
        let value = match self.action {
            Action::WriteCoils => literal::coil(token)?,
            _ => literal::word(token)?,
        };
        self.values.push(value)?;
        Ok(State::Ready)
    }
}

fn check_count(action: Action, count: Quantity) -> Result<(), Classification> {
    if action == Action::Undefined {
        return Ok(());
    }
    if count == 0 {
        return Err(Classification::Range);
    }
    if let Some(max) = action.max_read_quantity() {
        if count > max {
            return Err(Classification::Range);
        }
    }
    if action.is_write() && usize::from(count) > ValueList::CAPACITY {
        return Err(Classification::Length);
    }
    Ok(())
}

/// The addressed items must not extend beyond `0xFFFF`.
fn check_span(address: Address, count: Quantity) -> Result<(), Classification> {
    if u32::from(address) + u32::from(count) > 0x1_0000 {
        return Err(Classification::Range);
    }
    Ok(())
}

/// Parses all command line arguments into a complete [`Request`].
///
/// Stops at the first rejected argument.
pub fn parse<I>(tokens: I) -> Result<Request>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut descriptor = RequestDescriptor::new();
    for token in tokens {
        if let Step::Rejected(rejection) = descriptor.feed(token) {
            return Err(rejection.into());
        }
    }
    Ok(descriptor.finalize()?)
}
