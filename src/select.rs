//! Select readiness
//!
//! A select request asks which of read/write/exception would not block on
//! a line. When nothing is ready and the caller asked to watch, the line
//! records the watched operations and the watcher's endpoint; any later
//! state change runs [`Driver::select_retry`], which notifies the watcher.
//! The watcher then issues a status probe to learn the details.

use crate::driver::Driver;
use crate::message::{tty_reply, Endpoint, Kernel, SEL_RD, SEL_WR};
use crate::termios::{B0, ICANON};

impl<K: Kernel> Driver<K> {
    /// Which of the requested operations are ready right now?
    pub(crate) fn select_try(&mut self, idx: usize, ops: u8) -> u8 {
        let mut ready = 0;

        {
            let state = self.line(idx);

            // Special case: if the line is hung up, no operation will
            // block (and it can be seen as an exceptional condition).
            if state.termios.c_ospeed == B0 {
                ready |= ops;
            }

            if ops & SEL_RD != 0 {
                if state.rd.left > 0 {
                    // A second read would fail immediately, not block.
                    ready |= SEL_RD;
                } else if state.input.len() > 0 {
                    // Data is queued, but a canonical read only succeeds
                    // once a line break has been seen.
                    if state.termios.c_lflag & ICANON == 0 || state.input.eot_count() > 0 {
                        ready |= SEL_RD;
                    }
                }
            }
        }

        if ops & SEL_WR != 0 {
            if self.line(idx).wr.left > 0 {
                ready |= SEL_WR;
            } else {
                let mut writable = false;
                self.with_line_dev_kernel(idx, |state, dev, kernel| {
                    writable = dev.write(state, kernel, true);
                });
                if writable {
                    ready |= SEL_WR;
                }
            }
        }

        ready
    }

    /// Notify the recorded watcher if anything it waits for became ready
    pub(crate) fn select_retry(&mut self, idx: usize) {
        let ops = self.line(idx).select_ops;
        if ops != 0 && self.select_try(idx, ops) != 0 {
            let watcher = self.line(idx).select_proc;
            self.kernel_mut().notify(watcher);
        }
    }

    /// Answer a select request with the ready mask; when nothing is ready
    /// and the caller asked to watch, record the watch for retries.
    pub(crate) fn do_select(
        &mut self,
        idx: usize,
        caller: Endpoint,
        proc_nr: Endpoint,
        ops: u8,
        watch: bool,
    ) {
        let ready = self.select_try(idx, ops);

        if ready == 0 && ops != 0 && watch {
            let state = self.line_mut(idx);
            state.select_ops |= ops;
            state.select_proc = caller;
        }

        tty_reply(self.kernel_mut(), false, caller, proc_nr, ready as i32);
    }
}
