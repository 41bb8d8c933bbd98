// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::process::ExitCode;

const USAGE: &str = "\
Usage: moddiag <connection> [options] <action> -a<address> -c<count> [values...]

Connections:
  tcp <ipv4> <port>
  rtu <device> <baud> <parity N|E|O> <data bits 5-8> <stop bits 1-2>

Actions:
  rc    read coils
  rd    read discrete inputs
  rh    read holding registers
  ri    read input registers
  wc    write coils, followed by <count> values 0 or 1
  wh    write holding registers, followed by <count> values

Options:
  -a<address>   start address, decimal or 0x hex
  -c<count>     number of items
  -s<id>        slave id (default 1)
  -t<micros>    response timeout in microseconds (default 50000)
  -i            inverse display (negated bits, byte-swapped registers)
  -d            debug output of the exchanged frames
  -h, --help    print this help

Values to write must follow -c. Option values may be attached or given
as the next argument.

Example:
  moddiag tcp 192.168.0.10 502 wh -a0x10 -c2 0x1234 -1
";

#[cfg(any(feature = "tcp", feature = "rtu"))]
fn main() -> ExitCode {
    use moddiag::transport::ModbusTransport;

    moddiag::logging::init();

    let args: Vec<Vec<u8>> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.into_encoded_bytes())
        .collect();
    if args.is_empty() {
        eprint!("{USAGE}");
        return ExitCode::FAILURE;
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_slice(), b"-h" | b"--help"))
    {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let request = match moddiag::parse(&args) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let mut transport = ModbusTransport::new(request.connection.clone(), request.slave);
    let mut out = std::io::stdout().lock();
    if let Err(err) = moddiag::dispatch(&request, &mut transport, &mut out) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(not(any(feature = "tcp", feature = "rtu")))]
fn main() -> ExitCode {
    eprintln!("moddiag was built without the tcp and rtu features");
    eprint!("{USAGE}");
    ExitCode::FAILURE
}
