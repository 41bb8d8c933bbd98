// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [Modbus](https://en.wikipedia.org/wiki/Modbus) diagnostic tool
//! based on [tokio-modbus](https://crates.io/crates/tokio-modbus).
//!
//! A single command line describes a connection (`tcp` or `rtu`), one
//! action and its operands. The arguments are validated one by one by a
//! [`RequestDescriptor`]. Once complete, the resulting [`Request`] is
//! executed through a [`Transport`](transport::Transport) by [`dispatch()`].
//!
//! ```text
//! moddiag tcp 192.168.0.10 502 rh -a0x10 -c4
//! moddiag rtu /dev/ttyUSB0 19200 E 8 1 -s3 wh -a0 -c2 0x1234 -1
//! ```

pub mod error;
pub mod logging;
pub mod render;
pub mod transport;

mod descriptor;
mod dispatch;
mod parser;
mod request;

pub use self::{
    descriptor::{ExceptionFlags, RequestDescriptor, ValueList, MAX_TOKEN_LEN},
    dispatch::dispatch,
    error::{Classification, Error, Incomplete, Rejection, Result},
    parser::{parse, Step},
    request::*,
};
