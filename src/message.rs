//! Driver message protocol and kernel service interface
//!
//! The driver is a single-threaded task fed by messages: asynchronous
//! notifications (alarm, hardware interrupt, system events) and device
//! requests issued by the file system on behalf of user processes. Replies
//! travel back as small status messages; a request that cannot complete
//! immediately is answered with the SUSPEND status and finished later via a
//! notify plus a status probe (the revive protocol).

/// A process or server endpoint
pub type Endpoint = u32;

/// A virtual address inside a client process
pub type UserAddr = usize;

/// Clock ticks since boot
pub type Ticks = u64;

/// Endpoint of the kernel itself (source of kernel messages)
pub const KERNEL: Endpoint = 0;

// =============================================================================
// Signal Numbers
// =============================================================================

/// Hangup (line speed set to zero)
pub const SIGHUP: u32 = 1;

/// Interrupt (VINTR typed)
pub const SIGINT: u32 = 2;

/// Quit (VQUIT typed)
pub const SIGQUIT: u32 = 3;

/// Kill
pub const SIGKILL: u32 = 9;

/// Window size changed
pub const SIGWINCH: u32 = 28;

// =============================================================================
// Open / Cancel Flag Bits
// =============================================================================

/// Open-for-reading access bit
pub const R_BIT: u32 = 0x1;

/// Open-for-writing access bit
pub const W_BIT: u32 = 0x2;

/// Do not make the line the caller's controlling terminal
pub const O_NOCTTY: u32 = 0x100;

// =============================================================================
// Select Operation Bits
// =============================================================================

/// Readable
pub const SEL_RD: u8 = 0x1;

/// Writable
pub const SEL_WR: u8 = 0x2;

/// Exceptional condition
pub const SEL_ERR: u8 = 0x4;

// =============================================================================
// Messages
// =============================================================================

/// One incoming message for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A synchronous alarm went off; expire timers
    Alarm,
    /// Hardware interrupt notification; poll the device back-ends
    Interrupt,
    /// System shutdown; stop the console back-end
    Shutdown,
    /// A new kernel message is available for the log console
    KernelMessage {
        addr: UserAddr,
        count: usize,
    },
    /// A server wants text printed on the console
    Diagnostics {
        caller: Endpoint,
        proc_nr: Endpoint,
        addr: UserAddr,
        count: usize,
    },
    /// Register a function-key observer for the keys in the bitmask
    FkeyRegister {
        caller: Endpoint,
        keys: u16,
    },
    /// Unregister a function-key observer
    FkeyUnregister {
        caller: Endpoint,
        keys: u16,
    },
    /// The file system asks for one pending select or revive event
    Status {
        caller: Endpoint,
    },
    /// A process wants to read from a line
    Read {
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
        addr: UserAddr,
        count: usize,
        nonblock: bool,
    },
    /// A process wants to write to a line
    Write {
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
        addr: UserAddr,
        count: usize,
        nonblock: bool,
    },
    /// A process wants to change line parameters
    Ioctl {
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
        request: u32,
        addr: UserAddr,
    },
    /// A line has been opened
    Open {
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
        flags: u32,
    },
    /// A line has been closed
    Close {
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
    },
    /// Start or poll a select request; `watch` asks for a later notify
    Select {
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
        ops: u8,
        watch: bool,
    },
    /// Terminate a previous incomplete request immediately
    Cancel {
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
        mode: u32,
    },
}

impl Message {
    /// The `(minor, caller, proc_nr)` triple of a device request, or None
    /// for notifications and status probes.
    pub fn target(&self) -> Option<(u16, Endpoint, Endpoint)> {
        match *self {
            Message::Read { minor, caller, proc_nr, .. }
            | Message::Write { minor, caller, proc_nr, .. }
            | Message::Ioctl { minor, caller, proc_nr, .. }
            | Message::Open { minor, caller, proc_nr, .. }
            | Message::Close { minor, caller, proc_nr }
            | Message::Select { minor, caller, proc_nr, .. }
            | Message::Cancel { minor, caller, proc_nr, .. } => {
                Some((minor, caller, proc_nr))
            }
            _ => None,
        }
    }
}

/// One outgoing reply message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Direct answer to a request: byte count or negative errno
    Task { proc_nr: Endpoint, status: i32 },
    /// Asynchronous completion of a previously suspended request
    Revive { proc_nr: Endpoint, status: i32 },
    /// A watched select operation became ready
    IoReady { minor: u16, ops: u8 },
    /// Nothing pending for this status probe
    NoStatus,
}

// =============================================================================
// Kernel Services
// =============================================================================

/// The kernel facilities the driver depends on
///
/// Implementations wrap the host system's message passing, user-memory copy
/// primitive, process signalling, and clock. Failure of `send`, `kill`,
/// `uptime`, or `set_alarm` indicates kernel-side corruption; the driver
/// halts with a diagnostic rather than limping on.
pub trait Kernel {
    /// Send a reply message to an endpoint
    fn send(&mut self, dst: Endpoint, reply: Reply) -> Result<(), i32>;

    /// Post an asynchronous notification to an endpoint
    fn notify(&mut self, dst: Endpoint);

    /// Check that `len` bytes at `addr` in the process are addressable
    fn map_user(&mut self, proc_nr: Endpoint, addr: UserAddr, len: usize) -> bool;

    /// Copy bytes into a process
    fn copy_to_user(&mut self, proc_nr: Endpoint, addr: UserAddr, data: &[u8]) -> Result<(), i32>;

    /// Copy bytes out of a process
    fn copy_from_user(
        &mut self,
        proc_nr: Endpoint,
        addr: UserAddr,
        buf: &mut [u8],
    ) -> Result<(), i32>;

    /// Deliver a signal to a process group
    fn kill(&mut self, pgrp: u32, sig: u32) -> Result<(), i32>;

    /// Current time in ticks
    fn uptime(&mut self) -> Ticks;

    /// Program the single driver alarm for an absolute tick
    fn set_alarm(&mut self, at: Ticks);
}

/// Send a reply to a process that wanted to read or write data.
pub(crate) fn tty_reply(
    kernel: &mut dyn Kernel,
    revive: bool,
    dst: Endpoint,
    proc_nr: Endpoint,
    status: i32,
) {
    let reply = if revive {
        Reply::Revive { proc_nr, status }
    } else {
        Reply::Task { proc_nr, status }
    };
    if let Err(e) = kernel.send(dst, reply) {
        panic!("tty: reply to {} failed ({})", dst, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_of_device_requests() {
        let msg = Message::Read {
            minor: 3,
            caller: 10,
            proc_nr: 42,
            addr: 0x1000,
            count: 16,
            nonblock: false,
        };
        assert_eq!(msg.target(), Some((3, 10, 42)));

        let msg = Message::Close { minor: 0, caller: 10, proc_nr: 42 };
        assert_eq!(msg.target(), Some((0, 10, 42)));
    }

    #[test]
    fn test_notifications_have_no_target() {
        assert_eq!(Message::Alarm.target(), None);
        assert_eq!(Message::Interrupt.target(), None);
        assert_eq!(Message::Status { caller: 1 }.target(), None);
    }

    #[test]
    fn test_select_bits_are_distinct() {
        assert_eq!(SEL_RD & SEL_WR, 0);
        assert_eq!(SEL_RD & SEL_ERR, 0);
        assert_eq!(SEL_WR & SEL_ERR, 0);
    }
}
