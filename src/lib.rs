//! Device-independent terminal driver core
//!
//! The hardware-agnostic half of a TTY driver for a message-driven
//! microkernel. It provides POSIX termios semantics:
//!
//! - Canonical line assembly with erase/kill/reprint/literal-next editing
//! - Raw mode with VMIN/VTIME read timing
//! - Echo with exact visual backspace (control chars as `^X`, tabs as
//!   spaces, EOF drawn and backed over)
//! - Output post-processing (NL to CR-NL, tab expansion)
//! - XON/XOFF flow control and keyboard signal generation
//! - Select readiness with watch/notify, and suspend/revive for blocking
//!   I/O
//!
//! Input flows from a device back-end through input processing into a
//! tagged queue and onward to the reading process; output flows from the
//! writer through the back-end, post-processed on the way. The
//! device-dependent halves (screen renderer, UART, pseudo-terminal peer)
//! live behind the [`Device`] trait; kernel facilities (message passing,
//! user-memory copies, signals, the alarm) behind [`Kernel`].
//!
//! The driver is one single-threaded cooperative task: build a [`Driver`],
//! [`Driver::attach`] a back-end per line, and feed it messages, either
//! directly with [`Driver::service`] or from a [`Mailbox`] with
//! [`Driver::serve`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod device;
pub mod driver;
pub mod errno;
pub mod input;
pub mod ioctl;
pub mod line;
pub mod line_discipline;
pub mod mailbox;
pub mod message;
pub mod select;
pub mod termios;
pub mod timer;

pub use device::{Device, NullDevice};
pub use driver::{Driver, Line};
pub use input::{InWord, InputQueue, TTY_IN_BYTES};
pub use ioctl::Winsize;
pub use line::{LineState, TAB_MASK, TAB_SIZE};
pub use mailbox::{Mailbox, MessageStream};
pub use message::{Kernel, Message, Reply};
pub use termios::Termios;

/// Clock ticks per second
pub const HZ: u64 = 100;

/// Number of console lines
pub const NR_CONS: usize = 2;

/// Number of serial lines
pub const NR_RS_LINES: usize = 2;

/// Number of pseudo-terminal pairs
pub const NR_PTYS: usize = 2;

/// Total number of lines served, in table order: consoles, serial lines,
/// pseudo-terminals
pub const NR_TTYS: usize = NR_CONS + NR_RS_LINES + NR_PTYS;

/// First console minor
pub const CONS_MINOR: u16 = 0;

/// The write-only log device, aliasing the first console
pub const LOG_MINOR: u16 = 15;

/// First serial line minor
pub const RS232_MINOR: u16 = 16;

/// First pseudo-terminal slave minor
pub const TTYPX_MINOR: u16 = 128;

/// First pseudo-terminal master minor
pub const PTYPX_MINOR: u16 = 192;
