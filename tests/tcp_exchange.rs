// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execute this test only if `tcp` feature is selected.

#![cfg(feature = "tcp")]

use std::{future, net::SocketAddr, sync::mpsc, thread};

use moddiag::{dispatch, parse, transport::ModbusTransport, Error};
use tokio::net::TcpListener;
use tokio_modbus::{
    server::{
        tcp::{accept_tcp_connection, Server},
        Service,
    },
    ExceptionCode, Request, Response,
};

struct TestService {}

impl TestService {
    fn handle(&self, req: Request<'static>) -> Result<Response, ExceptionCode> {
        use Request::*;

        match req {
            ReadCoils(addr, cnt) => Ok(Response::ReadCoils(alternating_bits(addr, cnt))),
            ReadDiscreteInputs(addr, cnt) => {
                Ok(Response::ReadDiscreteInputs(alternating_bits(addr, cnt)))
            }
            ReadHoldingRegisters(addr, cnt) => Ok(Response::ReadHoldingRegisters(
                (0..cnt).map(|offset| addr.wrapping_add(offset)).collect(),
            )),
            ReadInputRegisters(_, cnt) => {
                Ok(Response::ReadInputRegisters(vec![0x1234; cnt.into()]))
            }
            WriteSingleCoil(addr, coil) => Ok(Response::WriteSingleCoil(addr, coil)),
            WriteSingleRegister(addr, word) => Ok(Response::WriteSingleRegister(addr, word)),
            WriteMultipleRegisters(addr, words) => Ok(Response::WriteMultipleRegisters(
                addr,
                u16::try_from(words.len()).unwrap(),
            )),
            WriteMultipleCoils(_, _) => Err(ExceptionCode::IllegalDataAddress),
            _ => Err(ExceptionCode::IllegalFunction),
        }
    }
}

fn alternating_bits(addr: u16, cnt: u16) -> Vec<bool> {
    (0..cnt).map(|offset| (addr + offset) % 2 == 0).collect()
}

impl Service for TestService {
    type Request = Request<'static>;

    type Response = Response;

    type Exception = ExceptionCode;

    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        future::ready(self.handle(req))
    }
}

/// Runs a server on its own runtime and returns its address.
fn start_server() -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            let server = Server::new(listener);
            let new_service = |_socket_addr| Ok(Some(TestService {}));
            let on_connected = |stream, socket_addr| async move {
                accept_tcp_connection(stream, socket_addr, new_service)
            };
            let on_process_error = |err| {
                eprintln!("{err}");
            };
            server.serve(&on_connected, on_process_error).await.unwrap();
        });
    });
    rx.recv().unwrap()
}

fn exchange(socket_addr: SocketAddr, tokens: &[&str]) -> (Result<(), Error>, String) {
    let port = socket_addr.port().to_string();
    let mut args = vec!["tcp", "127.0.0.1", port.as_str(), "-t1000000"];
    args.extend_from_slice(tokens);
    let request = parse(&args).unwrap();
    let mut transport = ModbusTransport::new(request.connection.clone(), request.slave);
    let mut out = Vec::new();
    let result = dispatch(&request, &mut transport, &mut out);
    assert!(!transport.is_connected());
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn read_registers() -> anyhow::Result<()> {
    let socket_addr = start_server();

    let (result, output) = exchange(socket_addr, &["rh", "-a0x10", "-c3"]);
    result?;
    assert_eq!(
        output,
        "Addr: 0x0010 Value: 0010\nAddr: 0x0011 Value: 0011\nAddr: 0x0012 Value: 0012\n"
    );

    let (result, output) = exchange(socket_addr, &["ri", "-a0", "-c1", "-i"]);
    result?;
    assert_eq!(output, "Addr: 0x0000 Value: 3412\n");
    Ok(())
}

#[test]
fn read_bits() -> anyhow::Result<()> {
    let socket_addr = start_server();

    let (result, output) = exchange(socket_addr, &["rc", "-a0", "-c3"]);
    result?;
    assert_eq!(
        output,
        "Addr: 0x0000 Value: 0001\nAddr: 0x0001 Value: 0000\nAddr: 0x0002 Value: 0001\n"
    );

    let (result, output) = exchange(socket_addr, &["rd", "-a1", "-c1"]);
    result?;
    assert_eq!(output, "Addr: 0x0001 Value: 0000\n");
    Ok(())
}

#[test]
fn write_registers_and_coils() -> anyhow::Result<()> {
    let socket_addr = start_server();

    for tokens in [
        &["wh", "-a0x10", "-c1", "123"][..],
        &["wh", "-a0x10", "-c3", "1", "0x2", "-3"][..],
        &["wc", "-a7", "-c1", "1"][..],
    ] {
        let (result, output) = exchange(socket_addr, tokens);
        result?;
        assert_eq!(output, "Success\n");
    }
    Ok(())
}

#[test]
fn exception_response() {
    let socket_addr = start_server();

    let (result, output) = exchange(socket_addr, &["wc", "-a0", "-c2", "1", "1"]);
    assert!(matches!(
        result,
        Err(Error::Exception(ExceptionCode::IllegalDataAddress))
    ));
    assert!(output.is_empty());
}

#[test]
fn connection_refused() {
    let socket_addr = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .unwrap();

    let (result, output) = exchange(socket_addr, &["rh", "-a0", "-c1"]);
    assert!(matches!(result, Err(Error::Connection(_))));
    assert!(output.is_empty());
}
