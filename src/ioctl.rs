//! TTY ioctl request codes and handlers
//!
//! This module implements ioctl operations for terminal lines:
//! - TCGETS/TCSETS/TCSETSW/TCSETSF: get or set terminal attributes, the
//!   latter two after draining pending output
//! - TCDRAIN: wait for pending output alone
//! - TCFLSH/TCFLOW/TCSBRK: flush queues, flow control, break
//! - TIOCGWINSZ/TIOCSWINSZ: window size (setting notifies the foreground
//!   process group with SIGWINCH)
//! - KIOCSMAP/TIOCSFON: console keymap and font loads, delegated to the
//!   back-end
//!
//! The drain-first requests park in the line's ioctl slot when output is
//! pending; the event pump finishes them through [`Driver::dev_ioctl`]
//! once the write side runs dry, and the caller is revived.

use crate::errno::{EINVAL, ENOTTY, OK, SUSPEND};
use crate::message::{tty_reply, Endpoint, Kernel, UserAddr, SIGHUP, SIGWINCH};
use crate::termios::{Termios, B0, ICANON, IXON, TERMIOS_SIZE, VMIN, VSTART, VSTOP, VTIME};
use crate::driver::Driver;
use crate::NR_CONS;

// =============================================================================
// ioctl Request Codes
// =============================================================================

/// Get termios structure
pub const TCGETS: u32 = 0x5401;

/// Set termios structure immediately
pub const TCSETS: u32 = 0x5402;

/// Set termios structure after draining output
pub const TCSETSW: u32 = 0x5403;

/// Set termios structure after draining output and flushing input
pub const TCSETSF: u32 = 0x5404;

/// Wait until all output has been transmitted
pub const TCDRAIN: u32 = 0x5405;

/// Send a break
pub const TCSBRK: u32 = 0x5409;

/// Suspend or resume output/input
pub const TCFLOW: u32 = 0x540A;

/// Flush input and/or output queues
pub const TCFLSH: u32 = 0x540B;

/// Get foreground process group
pub const TIOCGPGRP: u32 = 0x540F;

/// Set foreground process group
pub const TIOCSPGRP: u32 = 0x5410;

/// Get window size
pub const TIOCGWINSZ: u32 = 0x5413;

/// Set window size
pub const TIOCSWINSZ: u32 = 0x5414;

/// Load a console keymap
pub const KIOCSMAP: u32 = 0x4B03;

/// Load a console font
pub const TIOCSFON: u32 = 0x4B60;

// =============================================================================
// Argument Selectors
// =============================================================================

/// TCFLOW: suspend output
pub const TCOOFF: i32 = 0;

/// TCFLOW: restart output
pub const TCOON: i32 = 1;

/// TCFLOW: transmit a STOP character
pub const TCIOFF: i32 = 2;

/// TCFLOW: transmit a START character
pub const TCION: i32 = 3;

/// TCFLSH: flush received input
pub const TCIFLUSH: i32 = 0;

/// TCFLSH: flush pending output
pub const TCOFLUSH: i32 = 1;

/// TCFLSH: flush both
pub const TCIOFLUSH: i32 = 2;

/// Size of a console keymap parameter
pub const KEYMAP_BYTES: usize = 1536;

/// Size of a console font parameter
pub const FONT_BYTES: usize = 8192;

/// Size of the parameter a request carries across the copy boundary
pub fn param_size(request: u32) -> usize {
    match request {
        TCGETS | TCSETS | TCSETSW | TCSETSF => TERMIOS_SIZE,
        TCSBRK | TCFLOW | TCFLSH | TIOCGPGRP | TIOCSPGRP => core::mem::size_of::<i32>(),
        TIOCGWINSZ | TIOCSWINSZ => WINSIZE_SIZE,
        KIOCSMAP => KEYMAP_BYTES,
        TIOCSFON => FONT_BYTES,
        _ => 0, // TCDRAIN carries no parameter
    }
}

// =============================================================================
// Window Size Structure
// =============================================================================

/// Terminal window size
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Winsize {
    /// Number of rows
    pub ws_row: u16,
    /// Number of columns
    pub ws_col: u16,
    /// Horizontal size in pixels (unused)
    pub ws_xpixel: u16,
    /// Vertical size in pixels (unused)
    pub ws_ypixel: u16,
}

/// Size of the winsize structure as it crosses the ioctl copy boundary
pub const WINSIZE_SIZE: usize = core::mem::size_of::<Winsize>();

impl Winsize {
    /// View the structure as raw bytes for a copy to user space
    pub fn to_bytes(&self) -> [u8; WINSIZE_SIZE] {
        let mut raw = [0u8; WINSIZE_SIZE];
        raw[0..2].copy_from_slice(&self.ws_row.to_ne_bytes());
        raw[2..4].copy_from_slice(&self.ws_col.to_ne_bytes());
        raw[4..6].copy_from_slice(&self.ws_xpixel.to_ne_bytes());
        raw[6..8].copy_from_slice(&self.ws_ypixel.to_ne_bytes());
        raw
    }

    /// Rebuild a structure from raw bytes copied in from user space
    pub fn from_bytes(raw: &[u8; WINSIZE_SIZE]) -> Self {
        Self {
            ws_row: u16::from_ne_bytes([raw[0], raw[1]]),
            ws_col: u16::from_ne_bytes([raw[2], raw[3]]),
            ws_xpixel: u16::from_ne_bytes([raw[4], raw[5]]),
            ws_ypixel: u16::from_ne_bytes([raw[6], raw[7]]),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

impl<K: Kernel> Driver<K> {
    /// Perform an ioctl on a line
    pub(crate) fn do_ioctl(
        &mut self,
        idx: usize,
        caller: Endpoint,
        proc_nr: Endpoint,
        request: u32,
        addr: UserAddr,
    ) {
        let mut r = OK;
        let mut apply_attrs = false;

        match request {
            TCGETS => {
                // Get the termios attributes.
                let raw: [u8; TERMIOS_SIZE] = {
                    let mut tmp = [0u8; TERMIOS_SIZE];
                    tmp.copy_from_slice(self.line(idx).termios.as_bytes());
                    tmp
                };
                r = match self.kernel_mut().copy_to_user(proc_nr, addr, &raw) {
                    Ok(()) => OK,
                    Err(e) => e,
                };
            }

            TCSETSW | TCSETSF | TCDRAIN if self.line(idx).wr.left > 0 => {
                // Wait for all ongoing output processing to finish; the
                // event pump completes the request once output runs dry.
                let state = self.line_mut(idx);
                state.io.caller = caller;
                state.io.proc_nr = proc_nr;
                state.io.req = request;
                state.io.addr = addr;
                r = SUSPEND;
            }

            TCDRAIN => {} // output already drained

            TCSETS | TCSETSW | TCSETSF => {
                if request == TCSETSF {
                    self.flush_input(idx);
                }
                // Set the termios attributes.
                let mut raw = [0u8; TERMIOS_SIZE];
                match self.kernel_mut().copy_from_user(proc_nr, addr, &mut raw) {
                    Ok(()) => {
                        self.line_mut(idx).termios = Termios::from_bytes(&raw);
                        apply_attrs = true;
                    }
                    Err(e) => r = e,
                }
            }

            TCFLSH => match self.read_int_param(proc_nr, addr) {
                Ok(TCIFLUSH) => self.flush_input(idx),
                Ok(TCOFLUSH) => self.flush_output(idx),
                Ok(TCIOFLUSH) => {
                    self.flush_input(idx);
                    self.flush_output(idx);
                }
                Ok(_) => r = EINVAL,
                Err(e) => r = e,
            },

            TCFLOW => match self.read_int_param(proc_nr, addr) {
                Ok(how @ (TCOOFF | TCOON)) => {
                    let state = self.line_mut(idx);
                    state.inhibited = how == TCOOFF;
                    state.events = true;
                }
                Ok(how @ (TCIOFF | TCION)) => {
                    self.with_line_dev(idx, |state, dev| {
                        let ch =
                            state.termios.c_cc[if how == TCIOFF { VSTOP } else { VSTART }];
                        dev.echo(state, ch);
                    });
                }
                Ok(_) => r = EINVAL,
                Err(e) => r = e,
            },

            TCSBRK => {
                self.with_line_dev(idx, |state, dev| dev.send_break(state));
            }

            TIOCGWINSZ => {
                let raw = self.line(idx).winsize.to_bytes();
                r = match self.kernel_mut().copy_to_user(proc_nr, addr, &raw) {
                    Ok(()) => OK,
                    Err(e) => e,
                };
            }

            TIOCSWINSZ => {
                let mut raw = [0u8; WINSIZE_SIZE];
                match self.kernel_mut().copy_from_user(proc_nr, addr, &mut raw) {
                    Ok(()) => {
                        self.line_mut(idx).winsize = Winsize::from_bytes(&raw);
                        // Tell the foreground job about the new geometry.
                        let pgrp = self.line(idx).pgrp;
                        if pgrp != 0 {
                            if let Err(e) = self.kernel_mut().kill(pgrp, SIGWINCH) {
                                panic!("tty: signalling process group {} failed ({})", pgrp, e);
                            }
                        }
                    }
                    Err(e) => r = e,
                }
            }

            KIOCSMAP | TIOCSFON => {
                // Keymap and font loads make sense on the console only.
                if idx < NR_CONS {
                    let mut status = OK;
                    self.with_line_dev_kernel(idx, |state, dev, kernel| {
                        status = dev.console_ioctl(state, kernel, request, proc_nr, addr);
                    });
                    r = status;
                }
            }

            // Process groups are managed by the server layer; everything
            // else is simply not a tty operation.
            _ => r = ENOTTY,
        }

        if apply_attrs {
            self.setattr(idx);
        }

        tty_reply(self.kernel_mut(), false, caller, proc_nr, r);
    }

    /// Finish a TCSETSW/TCSETSF/TCDRAIN that waited for output to drain.
    ///
    /// Called from the event pump. A no-op until `wr.left` reaches zero, so
    /// an attribute change never affects output already in flight.
    pub(crate) fn dev_ioctl(&mut self, idx: usize) {
        if self.line(idx).wr.left > 0 {
            return; // output not finished
        }

        let io = self.line(idx).io;
        let mut r = OK;
        let mut apply_attrs = false;

        if io.req != TCDRAIN {
            if io.req == TCSETSF {
                self.flush_input(idx);
            }
            let mut raw = [0u8; TERMIOS_SIZE];
            match self.kernel_mut().copy_from_user(io.proc_nr, io.addr, &mut raw) {
                Ok(()) => {
                    self.line_mut(idx).termios = Termios::from_bytes(&raw);
                    apply_attrs = true;
                }
                Err(e) => r = e,
            }
        }

        self.line_mut(idx).io.req = 0;
        if apply_attrs {
            self.setattr(idx);
        }
        tty_reply(self.kernel_mut(), true, io.caller, io.proc_nr, r);
    }

    /// Apply freshly-set line attributes.
    ///
    /// Leaving canonical mode stamps a line break on all queued typeahead
    /// so raw reads can see it immediately; a process that wants the queue
    /// emptied instead uses TCSAFLUSH. The effective `min`, the read
    /// timer, flow-control inhibition and the hangup signal all follow
    /// from the new settings, and the device gets an `ioctl` upcall to
    /// apply speed and framing.
    pub(crate) fn setattr(&mut self, idx: usize) {
        {
            let state = self.line_mut(idx);
            if state.termios.c_lflag & ICANON == 0 {
                state.input.stamp_all_eot();
            }
        }

        // Inspect MIN and TIME.
        self.settimer(idx, false);
        {
            let state = self.line_mut(idx);
            if state.termios.c_lflag & ICANON != 0 {
                // No MIN & TIME in canonical mode.
                state.min = 1;
            } else {
                // In raw mode MIN is the number of bytes wanted and TIME
                // how long to wait for them, with exceptions when either
                // is zero.
                state.min = state.termios.c_cc[VMIN] as usize;
                if state.min == 0 && state.termios.c_cc[VTIME] > 0 {
                    state.min = 1;
                }
            }

            if state.termios.c_iflag & IXON == 0 {
                // No start/stop output control, so don't leave output
                // inhibited.
                state.inhibited = false;
                state.events = true;
            }
        }

        // Setting the output speed to zero hangs up the phone.
        let hangup = self.line(idx).termios.c_ospeed == B0;
        self.with_line_dev_kernel(idx, |state, dev, kernel| {
            if hangup {
                state.sigchar(dev, kernel, SIGHUP);
            }
            // Set the new speed, character size, etc. at the device level.
            dev.ioctl(state);
        });
    }

    fn read_int_param(&mut self, proc_nr: Endpoint, addr: UserAddr) -> Result<i32, i32> {
        let mut raw = [0u8; 4];
        self.kernel_mut().copy_from_user(proc_nr, addr, &mut raw)?;
        Ok(i32::from_ne_bytes(raw))
    }

    fn flush_input(&mut self, idx: usize) {
        self.with_line_dev(idx, |state, dev| state.icancel(dev));
        // No back-end also means no device-side queue to discard.
        if self.line(idx).input.len() > 0 {
            self.line_mut(idx).input.clear();
        }
    }

    fn flush_output(&mut self, idx: usize) {
        self.with_line_dev(idx, |state, dev| dev.ocancel(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_codes_are_unique() {
        let codes = [
            TCGETS, TCSETS, TCSETSW, TCSETSF, TCDRAIN, TCSBRK, TCFLOW, TCFLSH, TIOCGPGRP,
            TIOCSPGRP, TIOCGWINSZ, TIOCSWINSZ, KIOCSMAP, TIOCSFON,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for &b in codes.iter().skip(i + 1) {
                assert_ne!(a, b, "duplicate ioctl request code {:#x}", a);
            }
        }
    }

    #[test]
    fn test_param_size_table() {
        assert_eq!(param_size(TCGETS), TERMIOS_SIZE);
        assert_eq!(param_size(TCSETS), TERMIOS_SIZE);
        assert_eq!(param_size(TCSETSW), TERMIOS_SIZE);
        assert_eq!(param_size(TCSETSF), TERMIOS_SIZE);
        assert_eq!(param_size(TCSBRK), 4);
        assert_eq!(param_size(TCFLOW), 4);
        assert_eq!(param_size(TCFLSH), 4);
        assert_eq!(param_size(TIOCGPGRP), 4);
        assert_eq!(param_size(TIOCSPGRP), 4);
        assert_eq!(param_size(TIOCGWINSZ), WINSIZE_SIZE);
        assert_eq!(param_size(TIOCSWINSZ), WINSIZE_SIZE);
        assert_eq!(param_size(KIOCSMAP), KEYMAP_BYTES);
        assert_eq!(param_size(TIOCSFON), FONT_BYTES);
        assert_eq!(param_size(TCDRAIN), 0);
        assert_eq!(param_size(0xFFFF), 0);
    }

    #[test]
    fn test_winsize_default_is_zeroed() {
        let ws = Winsize::default();
        assert_eq!(ws.ws_row, 0);
        assert_eq!(ws.ws_col, 0);
        assert_eq!(ws.ws_xpixel, 0);
        assert_eq!(ws.ws_ypixel, 0);
    }

    #[test]
    fn test_winsize_size() {
        // Four u16 fields, no padding.
        assert_eq!(WINSIZE_SIZE, 8);
        assert_eq!(core::mem::align_of::<Winsize>(), 2);
    }

    #[test]
    fn test_winsize_bytes_round_trip() {
        let ws = Winsize {
            ws_row: 25,
            ws_col: 80,
            ws_xpixel: 640,
            ws_ypixel: 480,
        };
        assert_eq!(Winsize::from_bytes(&ws.to_bytes()), ws);
    }

    #[test]
    fn test_flush_selectors_are_distinct() {
        assert_ne!(TCIFLUSH, TCOFLUSH);
        assert_ne!(TCIFLUSH, TCIOFLUSH);
        assert_ne!(TCOFLUSH, TCIOFLUSH);
    }
}
