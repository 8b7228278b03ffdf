//! Device back-end contract
//!
//! Each line is bound at initialization to a value implementing [`Device`]:
//! the device-dependent half that moves bytes to and from real hardware (a
//! console renderer, a UART) or a peer program (a pseudo-terminal). The
//! core invokes these operations synchronously from its event loop; they
//! must not block.
//!
//! Conventions the core relies on:
//! - `read` with `probe` false pulls whatever the device has received and
//!   feeds it through [`LineState::in_process`]; with `probe` true it only
//!   reports whether input is waiting.
//! - `write` with `probe` false moves bytes of the pending write request
//!   toward the device, running [`LineState::out_process`] over its output
//!   ring as appropriate, and calls [`LineState::write_done`] right after
//!   consuming the final byte; with `probe` true it only reports whether
//!   output would make progress.
//! - an upcall that changes the input queue or completes output must set
//!   `line.events` so the dispatcher runs the event pump again before
//!   blocking.
//! - `echo` renders a single byte and keeps `line.position` current (see
//!   [`LineState::advance_column`]).
//!
//! Every operation is optional; the unit [`NullDevice`] accepts all of them
//! as no-ops and reports not-ready from both probes.

use crate::line::LineState;
use crate::message::{Kernel, Message};

/// Operations a device back-end provides to the core
pub trait Device {
    /// Pull received bytes and cook them (`probe` false), or report whether
    /// input is waiting (`probe` true).
    fn read(&mut self, _line: &mut LineState, _kernel: &mut dyn Kernel, _probe: bool) -> bool {
        false
    }

    /// Advance the pending write (`probe` false), or report whether output
    /// would make progress (`probe` true).
    fn write(&mut self, _line: &mut LineState, _kernel: &mut dyn Kernel, _probe: bool) -> bool {
        false
    }

    /// Emit one byte on the device output path
    fn echo(&mut self, _line: &mut LineState, _ch: u8) {}

    /// Discard input buffered on the device side
    fn icancel(&mut self, _line: &mut LineState) {}

    /// Discard output buffered on the device side
    fn ocancel(&mut self, _line: &mut LineState) {}

    /// Apply line speed, character size and framing from the termios
    fn ioctl(&mut self, _line: &mut LineState) {}

    /// Generate a break condition on the line
    fn send_break(&mut self, _line: &mut LineState) {}

    /// The last opener left; release device-side resources
    fn close(&mut self, _line: &mut LineState) {}

    /// A hardware interrupt was reported; collect completed work
    fn interrupt(&mut self, _line: &mut LineState, _kernel: &mut dyn Kernel) {}

    /// Console-only control operation (keymap or font load). Returns a
    /// status for the caller.
    fn console_ioctl(
        &mut self,
        _line: &mut LineState,
        _kernel: &mut dyn Kernel,
        _request: u32,
        _proc_nr: crate::message::Endpoint,
        _addr: crate::message::UserAddr,
    ) -> i32 {
        crate::errno::ENOTTY
    }

    /// Handle a request addressed to the master side of a pseudo-terminal.
    /// Returns true when the request was taken (including its reply).
    fn master(
        &mut self,
        _line: &mut LineState,
        _kernel: &mut dyn Kernel,
        _msg: &Message,
    ) -> bool {
        false
    }
}

/// Shared no-op back-end for operations a device does not need
pub struct NullDevice;

impl Device for NullDevice {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_device_probes_report_not_ready() {
        struct Nk;
        impl Kernel for Nk {
            fn send(&mut self, _: u32, _: crate::message::Reply) -> Result<(), i32> {
                Ok(())
            }
            fn notify(&mut self, _: u32) {}
            fn map_user(&mut self, _: u32, _: usize, _: usize) -> bool {
                false
            }
            fn copy_to_user(&mut self, _: u32, _: usize, _: &[u8]) -> Result<(), i32> {
                Ok(())
            }
            fn copy_from_user(&mut self, _: u32, _: usize, _: &mut [u8]) -> Result<(), i32> {
                Ok(())
            }
            fn kill(&mut self, _: u32, _: u32) -> Result<(), i32> {
                Ok(())
            }
            fn uptime(&mut self) -> u64 {
                0
            }
            fn set_alarm(&mut self, _: u64) {}
        }

        let mut dev = NullDevice;
        let mut line = LineState::new(0, 0);
        let mut k = Nk;
        assert!(!dev.read(&mut line, &mut k, true));
        assert!(!dev.write(&mut line, &mut k, true));
        assert_eq!(
            dev.console_ioctl(&mut line, &mut k, 0, 0, 0),
            crate::errno::ENOTTY
        );
    }
}
