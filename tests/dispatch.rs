// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{io, time::Duration};

use moddiag::{
    dispatch, parse, transport::Transport, Address, Coil, Error, Quantity, Request, Result, Word,
};
use tokio_modbus::ExceptionCode;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    SetDebug(bool),
    SetResponseTimeout(Duration),
    Connect,
    ReadCoils(Address, Quantity),
    ReadDiscreteInputs(Address, Quantity),
    ReadHoldingRegisters(Address, Quantity),
    ReadInputRegisters(Address, Quantity),
    WriteSingleCoil(Address, Coil),
    WriteMultipleCoils(Address, Vec<Coil>),
    WriteSingleRegister(Address, Word),
    WriteMultipleRegisters(Address, Vec<Word>),
    Close,
}

#[derive(Debug, Default)]
struct TransportMock {
    calls: Vec<Call>,
    refuse_connection: bool,
    next_exception: Option<ExceptionCode>,
    next_transport_error: Option<io::ErrorKind>,
    coils: Vec<Coil>,
    words: Vec<Word>,
}

impl TransportMock {
    fn operation_calls(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|call| {
                !matches!(
                    call,
                    Call::SetDebug(_) | Call::SetResponseTimeout(_) | Call::Connect | Call::Close
                )
            })
            .cloned()
            .collect()
    }

    fn reply<T>(&mut self, call: Call, response: T) -> Result<T> {
        self.calls.push(call);
        if let Some(exception) = self.next_exception.take() {
            return Err(exception.into());
        }
        if let Some(kind) = self.next_transport_error.take() {
            return Err(tokio_modbus::Error::Transport(io::Error::new(kind, "mock")).into());
        }
        Ok(response)
    }
}

impl Transport for TransportMock {
    fn set_debug(&mut self, debug: bool) {
        self.calls.push(Call::SetDebug(debug));
    }

    fn set_response_timeout(&mut self, timeout: Duration) {
        self.calls.push(Call::SetResponseTimeout(timeout));
    }

    fn connect(&mut self) -> Result<()> {
        self.calls.push(Call::Connect);
        if self.refuse_connection {
            return Err(Error::Connection(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "Connection refused",
            )));
        }
        Ok(())
    }

    fn read_coils(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Coil>> {
        let coils = self.coils[..usize::from(cnt)].to_vec();
        self.reply(Call::ReadCoils(addr, cnt), coils)
    }

    fn read_discrete_inputs(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Coil>> {
        let coils = self.coils[..usize::from(cnt)].to_vec();
        self.reply(Call::ReadDiscreteInputs(addr, cnt), coils)
    }

    fn read_holding_registers(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Word>> {
        let words = self.words[..usize::from(cnt)].to_vec();
        self.reply(Call::ReadHoldingRegisters(addr, cnt), words)
    }

    fn read_input_registers(&mut self, addr: Address, cnt: Quantity) -> Result<Vec<Word>> {
        let words = self.words[..usize::from(cnt)].to_vec();
        self.reply(Call::ReadInputRegisters(addr, cnt), words)
    }

    fn write_single_coil(&mut self, addr: Address, coil: Coil) -> Result<()> {
        self.reply(Call::WriteSingleCoil(addr, coil), ())
    }

    fn write_multiple_coils(&mut self, addr: Address, coils: &[Coil]) -> Result<()> {
        self.reply(Call::WriteMultipleCoils(addr, coils.to_vec()), ())
    }

    fn write_single_register(&mut self, addr: Address, word: Word) -> Result<()> {
        self.reply(Call::WriteSingleRegister(addr, word), ())
    }

    fn write_multiple_registers(&mut self, addr: Address, words: &[Word]) -> Result<()> {
        self.reply(Call::WriteMultipleRegisters(addr, words.to_vec()), ())
    }

    fn close(&mut self) {
        self.calls.push(Call::Close);
    }
}

const TCP: [&str; 3] = ["tcp", "127.0.0.1", "5502"];

fn request(tokens: &[&str]) -> Request {
    parse(TCP.iter().chain(tokens)).unwrap()
}

fn run(transport: &mut TransportMock, tokens: &[&str]) -> (Result<()>, String) {
    let mut out = Vec::new();
    let result = dispatch(&request(tokens), transport, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn read_holding_registers() {
    let mut transport = TransportMock {
        words: vec![0x1234, 0xabcd, 0x0001],
        ..Default::default()
    };
    let (result, output) = run(&mut transport, &["rh", "-a0x10", "-c3", "-t1000"]);
    result.unwrap();
    assert_eq!(
        output,
        "Addr: 0x0010 Value: 1234\nAddr: 0x0011 Value: abcd\nAddr: 0x0012 Value: 0001\n"
    );
    assert_eq!(
        transport.calls,
        vec![
            Call::SetDebug(false),
            Call::SetResponseTimeout(Duration::from_micros(1000)),
            Call::Connect,
            Call::ReadHoldingRegisters(0x10, 3),
            Call::Close,
        ]
    );
}

#[test]
fn read_input_registers_inverse() {
    let mut transport = TransportMock {
        words: vec![0x1234],
        ..Default::default()
    };
    let (result, output) = run(&mut transport, &["ri", "-a1", "-c1", "-i"]);
    result.unwrap();
    assert_eq!(output, "Addr: 0x0001 Value: 3412\n");
    assert_eq!(transport.operation_calls(), vec![Call::ReadInputRegisters(1, 1)]);
}

#[test]
fn read_coils_and_discrete_inputs() {
    let mut transport = TransportMock {
        coils: vec![true, false],
        ..Default::default()
    };
    let (result, output) = run(&mut transport, &["rc", "-a0", "-c2"]);
    result.unwrap();
    assert_eq!(output, "Addr: 0x0000 Value: 0001\nAddr: 0x0001 Value: 0000\n");

    let (result, output) = run(&mut transport, &["rd", "-a0xff", "-c2", "-i"]);
    result.unwrap();
    assert_eq!(output, "Addr: 0x00ff Value: 0000\nAddr: 0x0100 Value: 0001\n");
    assert_eq!(
        transport.operation_calls(),
        vec![Call::ReadCoils(0, 2), Call::ReadDiscreteInputs(0xff, 2)]
    );
}

#[test]
fn single_and_multiple_register_writes() {
    let mut transport = TransportMock::default();
    let (result, output) = run(&mut transport, &["wh", "-a0x10", "-c1", "123"]);
    result.unwrap();
    assert_eq!(output, "Success\n");

    let (result, output) = run(&mut transport, &["wh", "-a0x10", "-c2", "0x1234", "-1"]);
    result.unwrap();
    assert_eq!(output, "Success\n");
    assert_eq!(
        transport.operation_calls(),
        vec![
            Call::WriteSingleRegister(0x10, 123),
            Call::WriteMultipleRegisters(0x10, vec![0x1234, 0xffff]),
        ]
    );
}

#[test]
fn single_and_multiple_coil_writes() {
    let mut transport = TransportMock::default();
    run(&mut transport, &["wc", "-a5", "-c1", "1"]).0.unwrap();
    run(&mut transport, &["wc", "-a5", "-c3", "1", "0", "1"]).0.unwrap();
    assert_eq!(
        transport.operation_calls(),
        vec![
            Call::WriteSingleCoil(5, true),
            Call::WriteMultipleCoils(5, vec![true, false, true]),
        ]
    );
}

#[test]
fn debug_is_applied_before_connecting() {
    let mut transport = TransportMock {
        words: vec![0],
        ..Default::default()
    };
    run(&mut transport, &["-d", "rh", "-a0", "-c1"]).0.unwrap();
    assert_eq!(transport.calls[0], Call::SetDebug(true));
}

#[test]
fn connection_failure_skips_operation() {
    let mut transport = TransportMock {
        refuse_connection: true,
        ..Default::default()
    };
    let (result, output) = run(&mut transport, &["wh", "-a0", "-c1", "1"]);
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
    assert_eq!(err.to_string(), "Connection failed: Connection refused");
    assert!(output.is_empty());
    assert!(transport.operation_calls().is_empty());
    assert_eq!(
        transport.calls[transport.calls.len() - 2..],
        [Call::Connect, Call::Close]
    );
}

#[test]
fn exception_response_closes_connection() {
    let mut transport = TransportMock {
        next_exception: Some(ExceptionCode::IllegalDataAddress),
        coils: vec![false],
        ..Default::default()
    };
    let (result, output) = run(&mut transport, &["rc", "-a0", "-c1"]);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        Error::Exception(ExceptionCode::IllegalDataAddress)
    ));
    assert!(output.is_empty());
    assert_eq!(transport.calls.last(), Some(&Call::Close));
}

#[test]
fn transport_error_closes_connection() {
    let mut transport = TransportMock {
        next_transport_error: Some(io::ErrorKind::TimedOut),
        ..Default::default()
    };
    let (result, output) = run(&mut transport, &["wc", "-a0", "-c1", "0"]);
    assert!(matches!(result, Err(Error::Transport(_))));
    assert!(output.is_empty());
    assert_eq!(
        transport.calls[transport.calls.len() - 2..],
        [Call::WriteSingleCoil(0, false), Call::Close]
    );
}

#[test]
fn surplus_values_never_reach_the_transport() {
    let tokens = ["wh", "-a0", "-c2", "1", "2", "3"];
    let err = parse(TCP.iter().chain(&tokens)).unwrap_err();
    assert!(matches!(
        err,
        Error::Incomplete(moddiag::Incomplete::Values {
            expected: 2,
            actual: 3
        })
    ));
    assert_eq!(
        err.to_string(),
        "Incomplete command: expected 2 value(s) to write, got 3"
    );
}
