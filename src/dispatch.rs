// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    io::Write,
    ops::{Deref, DerefMut},
};

use crate::{error::Incomplete, render, transport::Transport, Action, Request, Result};

/// An open connection that is closed when dropped.
struct Session<'t, T: Transport + ?Sized> {
    transport: &'t mut T,
}

impl<'t, T: Transport + ?Sized> Session<'t, T> {
    /// Connects the transport. It is closed even if connecting fails.
    fn open(transport: &'t mut T) -> Result<Self> {
        let session = Self { transport };
        session.transport.connect()?;
        Ok(session)
    }
}

impl<T: Transport + ?Sized> Deref for Session<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: Transport + ?Sized> DerefMut for Session<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: Transport + ?Sized> Drop for Session<'_, T> {
    fn drop(&mut self) {
        self.transport.close();
    }
}

/// Executes a finalized request and writes the result to `out`.
///
/// Exactly one operation is performed. The connection is closed before
/// returning, regardless of the outcome. Nothing is written to `out` if
/// the operation fails.
pub fn dispatch<T, W>(request: &Request, transport: &mut T, out: &mut W) -> Result<()>
where
    T: Transport + ?Sized,
    W: Write,
{
    transport.set_debug(request.debug);
    transport.set_response_timeout(request.timeout);
    log::debug!("Request: {request}");

    let mut session = Session::open(transport)?;
    let Request {
        action,
        address,
        count,
        inverse,
        ..
    } = *request;
    match action {
        Action::ReadCoils => {
            log::debug!("Reading {count} coil(s) at {address:#06x}");
            let coils = session.read_coils(address, count)?;
            render::bits(out, address, &coils, inverse)?;
        }
        Action::ReadDiscreteInputs => {
            log::debug!("Reading {count} discrete input(s) at {address:#06x}");
            let inputs = session.read_discrete_inputs(address, count)?;
            render::bits(out, address, &inputs, inverse)?;
        }
        Action::ReadHoldingRegisters => {
            log::debug!("Reading {count} holding register(s) at {address:#06x}");
            let words = session.read_holding_registers(address, count)?;
            render::words(out, address, &words, inverse)?;
        }
        Action::ReadInputRegisters => {
            log::debug!("Reading {count} input register(s) at {address:#06x}");
            let words = session.read_input_registers(address, count)?;
            render::words(out, address, &words, inverse)?;
        }
        Action::WriteCoils => {
            match request.coils().as_slice() {
                [coil] => {
                    log::debug!("Writing single coil at {address:#06x}");
                    session.write_single_coil(address, *coil)?;
                }
                coils => {
                    log::debug!("Writing {} coils at {address:#06x}", coils.len());
                    session.write_multiple_coils(address, coils)?;
                }
            }
            render::success(out)?;
        }
        Action::WriteRegisters => {
            match request.values.as_slice() {
                [word] => {
                    log::debug!("Writing single register at {address:#06x}");
                    session.write_single_register(address, *word)?;
                }
                words => {
                    log::debug!("Writing {} registers at {address:#06x}", words.len());
                    session.write_multiple_registers(address, words)?;
                }
            }
            render::success(out)?;
        }
        Action::Undefined => return Err(Incomplete::Action.into()),
    }
    Ok(())
}
