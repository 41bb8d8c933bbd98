// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text output of completed operations.

use std::io::{self, Write};

use crate::{Address, Coil, Word};

/// Prints coils or discrete inputs, one line per item.
///
/// With `inverse` every bit is printed negated.
pub fn bits<W: Write>(out: &mut W, address: Address, bits: &[Coil], inverse: bool) -> io::Result<()> {
    items(out, address, bits.iter().map(|bit| Word::from(*bit != inverse)))
}

/// Prints registers, one line per item.
///
/// With `inverse` the two bytes of every register are swapped.
pub fn words<W: Write>(
    out: &mut W,
    address: Address,
    words: &[Word],
    inverse: bool,
) -> io::Result<()> {
    items(
        out,
        address,
        words
            .iter()
            .map(|word| if inverse { word.swap_bytes() } else { *word }),
    )
}

/// Confirms a write operation.
pub fn success<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Success")
}

fn items<W, I>(out: &mut W, address: Address, values: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = Word>,
{
    for (offset, value) in (u32::from(address)..).zip(values) {
        writeln!(out, "Addr: 0x{offset:04x} Value: {value:04x}")?;
    }
    Ok(())
}
