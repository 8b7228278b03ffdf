//! Per-line state
//!
//! One [`LineState`] exists for every terminal line the driver serves. It
//! carries the termios settings, the tagged input queue, the bookkeeping
//! for at most one pending read, one pending write and one pending ioctl,
//! and the select watch. The dispatcher owns all of it exclusively; device
//! back-ends receive a mutable borrow for the duration of an upcall.

use crate::input::InputQueue;
use crate::ioctl::Winsize;
use crate::message::{Endpoint, UserAddr};
use crate::termios::Termios;

/// Output tab stops are every TAB_SIZE columns
pub const TAB_SIZE: usize = 8;

/// Mask for the column position within a tab stop
pub const TAB_MASK: usize = 7;

/// Bookkeeping for the pending read request, if any
///
/// A read is outstanding exactly while `left > 0`. After a suspended read
/// completes, `cum` holds the byte count until the status probe collects
/// the revive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadSlot {
    /// Endpoint the reply goes to (the file system)
    pub caller: Endpoint,
    /// Process whose buffer receives the bytes
    pub proc_nr: Endpoint,
    /// Next user address to fill
    pub addr: UserAddr,
    /// Bytes still wanted
    pub left: usize,
    /// Bytes delivered so far
    pub cum: usize,
    /// Reply by revive instead of directly
    pub revive: bool,
    /// A revive is waiting to be collected
    pub revived: bool,
}

/// Bookkeeping for the pending write request, if any
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteSlot {
    pub caller: Endpoint,
    pub proc_nr: Endpoint,
    /// Next user address to drain
    pub addr: UserAddr,
    /// Bytes not yet consumed by the device
    pub left: usize,
    /// Bytes consumed so far
    pub cum: usize,
    pub revive: bool,
    pub revived: bool,
}

/// Bookkeeping for an ioctl waiting for output to drain
///
/// `req` is zero when no ioctl is pending.
#[derive(Debug, Default, Clone, Copy)]
pub struct IoctlSlot {
    pub caller: Endpoint,
    pub proc_nr: Endpoint,
    pub req: u32,
    pub addr: UserAddr,
}

/// Complete device-independent state of one terminal line
pub struct LineState {
    /// Minor device number of this line
    pub minor: u16,
    /// Index in the driver's line table
    pub index: usize,
    /// Terminal attributes
    pub termios: Termios,
    /// Window size
    pub winsize: Winsize,
    /// Current screen column, modulo TAB_SIZE
    pub position: usize,
    /// Foreground process group for keyboard signals; 0 when none
    pub pgrp: u32,
    /// Number of open file descriptors on this line
    pub openct: u32,
    /// Output stopped by VSTOP (XOFF)
    pub inhibited: bool,
    /// The next input byte is literal (VLNEXT seen)
    pub escaped: bool,
    /// The echo trail has been disturbed by other output
    pub reprint: bool,
    /// Work is pending; the dispatcher must run the event pump
    pub events: bool,
    /// Effective minimum byte count for the pending read
    pub min: usize,
    /// Queue of cooked input words
    pub input: InputQueue,
    /// Pending read, if any
    pub rd: ReadSlot,
    /// Pending write, if any
    pub wr: WriteSlot,
    /// Pending drain-then-apply ioctl, if any
    pub io: IoctlSlot,
    /// Select operations being watched
    pub select_ops: u8,
    /// Endpoint watching this line
    pub select_proc: Endpoint,
    /// Input processing asked for the inter-byte timer to be armed
    arm_timer: bool,
}

impl LineState {
    pub fn new(minor: u16, index: usize) -> Self {
        Self {
            minor,
            index,
            termios: Termios::default(),
            winsize: Winsize::default(),
            position: 0,
            pgrp: 0,
            openct: 0,
            inhibited: false,
            escaped: false,
            reprint: false,
            events: false,
            min: 1,
            input: InputQueue::new(),
            rd: ReadSlot::default(),
            wr: WriteSlot::default(),
            io: IoctlSlot::default(),
            select_ops: 0,
            select_proc: 0,
            arm_timer: false,
        }
    }

    /// Track the column effect of a byte rendered on the device.
    ///
    /// Back-ends call this from their `echo` path so that tab expansion and
    /// visual erase stay accurate. `position` stays within `[0, TAB_SIZE)`.
    pub fn advance_column(&mut self, ch: u8) {
        match ch {
            0x07 => {}
            0x08 => self.position = (self.position + TAB_SIZE - 1) & TAB_MASK,
            b'\r' | b'\n' => self.position = 0,
            _ => self.position = (self.position + 1) & TAB_MASK,
        }
    }

    pub(crate) fn request_timer(&mut self) {
        self.arm_timer = true;
    }

    pub(crate) fn take_timer_request(&mut self) -> bool {
        core::mem::replace(&mut self.arm_timer, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_is_idle() {
        let line = LineState::new(4, 1);
        assert_eq!(line.minor, 4);
        assert_eq!(line.index, 1);
        assert_eq!(line.rd.left, 0);
        assert_eq!(line.wr.left, 0);
        assert_eq!(line.io.req, 0);
        assert_eq!(line.openct, 0);
        assert_eq!(line.min, 1);
        assert!(!line.inhibited);
        assert!(line.input.is_empty());
    }

    #[test]
    fn test_advance_column_stays_in_tab_stop() {
        let mut line = LineState::new(0, 0);
        for _ in 0..20 {
            line.advance_column(b'x');
            assert!(line.position < TAB_SIZE);
        }
    }

    #[test]
    fn test_advance_column_effects() {
        let mut line = LineState::new(0, 0);
        line.advance_column(b'a');
        line.advance_column(b'b');
        assert_eq!(line.position, 2);

        line.advance_column(0x08);
        assert_eq!(line.position, 1);

        line.advance_column(0x07);
        assert_eq!(line.position, 1);

        line.advance_column(b'\n');
        assert_eq!(line.position, 0);

        // Backspace at column zero wraps within the tab stop, mirroring the
        // modulo arithmetic of output processing.
        line.advance_column(0x08);
        assert_eq!(line.position, TAB_MASK);
    }

    #[test]
    fn test_timer_request_is_one_shot() {
        let mut line = LineState::new(0, 0);
        assert!(!line.take_timer_request());
        line.request_timer();
        assert!(line.take_timer_request());
        assert!(!line.take_timer_request());
    }
}
