// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mutable request descriptor that accumulates command line arguments.

use std::time::Duration;

use crate::{
    error::{Classification, Incomplete, Rejection},
    parser::State,
    Action, Address, Connection, ConnectionKind, Quantity, Request, Slave, Word,
    DEFAULT_RESPONSE_TIMEOUT, DEFAULT_SLAVE,
};

/// Maximum length of a single command line argument in bytes.
pub const MAX_TOKEN_LEN: usize = 1024;

/// Validation categories triggered by the most recent argument.
///
/// Only used for reporting, never for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExceptionFlags(u8);

impl ExceptionFlags {
    pub const LENGTH: Self = Self(1 << 0);
    pub const RANGE: Self = Self(1 << 1);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub(crate) const fn from_classification(classification: Classification) -> Self {
        match classification {
            Classification::Syntax => Self::empty(),
            Classification::Length => Self::LENGTH,
            Classification::Range => Self::RANGE,
        }
    }
}

/// Values to write, bounded to [`ValueList::CAPACITY`] items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueList {
    items: Vec<Word>,
}

impl ValueList {
    pub const CAPACITY: usize = 20;

    /// Appends a value or fails with [`Classification::Length`] if the list is full.
    pub fn push(&mut self, value: Word) -> Result<(), Classification> {
        if self.is_full() {
            return Err(Classification::Length);
        }
        self.items.push(value);
        Ok(())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= Self::CAPACITY
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Word] {
        &self.items
    }
}

/// Accumulates command line arguments into a [`Request`].
///
/// Each argument is passed to [`feed()`](Self::feed) separately. The
/// automaton position is kept in the descriptor between the calls, so a
/// construct like `tcp <ip> <port>` may span several arguments. After the
/// last argument [`finalize()`](Self::finalize) checks that the command
/// is complete.
///
/// ```
/// use moddiag::{Action, RequestDescriptor, Step};
///
/// let mut descriptor = RequestDescriptor::new();
/// for token in ["tcp", "127.0.0.1", "502", "rh", "-a0x10", "-c2"] {
///     assert!(!matches!(descriptor.feed(token), Step::Rejected(_)));
/// }
/// let request = descriptor.finalize().unwrap();
/// assert_eq!(request.action, Action::ReadHoldingRegisters);
/// assert_eq!(request.address, 0x10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub(crate) state: State,
    pub(crate) connection_kind: Option<ConnectionKind>,
    pub(crate) connection: Option<Connection>,
    pub(crate) slave: Slave,
    pub(crate) action: Action,
    pub(crate) address: Option<Address>,
    pub(crate) count: Option<Quantity>,
    pub(crate) values: ValueList,
    pub(crate) inverse: bool,
    pub(crate) debug: bool,
    pub(crate) timeout: Duration,
    pub(crate) exception_flags: ExceptionFlags,
    pub(crate) last_error: Option<Rejection>,
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDescriptor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ready,
            connection_kind: None,
            connection: None,
            slave: DEFAULT_SLAVE,
            action: Action::Undefined,
            address: None,
            count: None,
            values: ValueList::default(),
            inverse: false,
            debug: false,
            timeout: DEFAULT_RESPONSE_TIMEOUT,
            exception_flags: ExceptionFlags::empty(),
            last_error: None,
        }
    }

    /// Resets the automaton and clears all fields.
    pub fn initialize(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub const fn connection_kind(&self) -> Option<ConnectionKind> {
        self.connection_kind
    }

    /// The connection, once all of its parameters have been parsed.
    #[must_use]
    pub const fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    #[must_use]
    pub const fn slave(&self) -> Slave {
        self.slave
    }

    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub const fn address(&self) -> Option<Address> {
        self.address
    }

    #[must_use]
    pub const fn count(&self) -> Option<Quantity> {
        self.count
    }

    #[must_use]
    pub fn values(&self) -> &[Word] {
        self.values.as_slice()
    }

    /// Position where the next value will be stored.
    #[must_use]
    pub fn index(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub const fn inverse(&self) -> bool {
        self.inverse
    }

    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn exception_flags(&self) -> ExceptionFlags {
        self.exception_flags
    }

    /// The classification and text of the last rejected argument.
    #[must_use]
    pub const fn describe_last_error(&self) -> Option<&Rejection> {
        self.last_error.as_ref()
    }

    /// Whether [`finalize()`](Self::finalize) would succeed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.finalize().is_ok()
    }

    /// Checks that an action and all fields it requires are present.
    ///
    /// Range and capacity limits have already been enforced while feeding,
    /// only presence and the number of values are checked here.
    pub fn finalize(&self) -> Result<Request, Incomplete> {
        if let Some(awaiting) = self.state.awaiting() {
            return Err(Incomplete::Pending(awaiting));
        }
        let connection = self.connection.clone().ok_or(Incomplete::Connection)?;
        if self.action == Action::Undefined {
            return Err(Incomplete::Action);
        }
        let address = self.address.ok_or(Incomplete::Address)?;
        let count = self.count.ok_or(Incomplete::Count)?;
        if self.action.is_write() && self.values.len() != usize::from(count) {
            return Err(Incomplete::Values {
                expected: count,
                actual: self.values.len(),
            });
        }
        Ok(Request {
            connection,
            slave: self.slave,
            action: self.action,
            address,
            count,
            values: self.values.as_slice().to_vec(),
            inverse: self.inverse,
            debug: self.debug,
            timeout: self.timeout,
        })
    }
}
