//! TTY dispatcher
//!
//! The driver is one single-threaded cooperative task owning every line
//! exclusively: there is no locking anywhere in the core. Each loop
//! iteration first drains the event flag of every line (running the event
//! pump for those with work), then takes one message:
//!
//! - asynchronous notifications: timer expiry, hardware interrupts, system
//!   shutdown, kernel messages and diagnostics for the console, and
//!   function-key observer control;
//! - status probes, answered with at most one pending select or revive
//!   event;
//! - device requests (read/write/ioctl/open/close/select/cancel) for a
//!   specific minor.
//!
//! A request that cannot finish immediately is recorded in the line's
//! request slot and answered with SUSPEND; when the event pump later
//! completes it, the caller is notified and collects the result through a
//! status probe. Device back-ends never see a blocked process, only slots.

use alloc::boxed::Box;
use alloc::vec::Vec;

use futures_util::StreamExt;

use crate::device::Device;
use crate::errno::{EAGAIN, EACCES, EBUSY, EFAULT, EINTR, EINVAL, EIO, ENXIO, OK, SUSPEND};
use crate::ioctl::Winsize;
use crate::line::LineState;
use crate::mailbox::MessageStream;
use crate::message::{
    tty_reply, Endpoint, Kernel, Message, Reply, Ticks, UserAddr, KERNEL, O_NOCTTY, R_BIT, W_BIT,
};
use crate::termios::{Termios, ICANON, VMIN, VTIME};
use crate::timer::TimerQueue;
use crate::{CONS_MINOR, HZ, LOG_MINOR, NR_CONS, NR_PTYS, NR_RS_LINES, NR_TTYS, PTYPX_MINOR,
    RS232_MINOR, TTYPX_MINOR};

/// Number of observable function keys
pub const NR_FKEYS: usize = 12;

/// A line's device-independent state plus its back-end, if configured
pub struct Line {
    pub state: LineState,
    pub dev: Option<Box<dyn Device>>,
}

/// The terminal driver: all lines, the timer set, and the kernel handle
///
/// Lines are created up front in a fixed order: consoles, then serial
/// lines, then pseudo-terminals. They persist for the driver's lifetime;
/// closing only resets them.
pub struct Driver<K: Kernel> {
    kernel: K,
    lines: Vec<Line>,
    timers: TimerQueue,
    next_timeout: Option<Ticks>,
    fkeys: [Option<Endpoint>; NR_FKEYS],
}

/// Map a minor device number onto a line table index. The second value is
/// true for the master side of a pseudo-terminal.
pub(crate) fn map_minor(minor: u16) -> Option<(usize, bool)> {
    if let Some(off) = minor.checked_sub(CONS_MINOR) {
        if (off as usize) < NR_CONS {
            return Some((off as usize, false));
        }
    }
    if minor == LOG_MINOR {
        return Some((0, false));
    }
    if let Some(off) = minor.checked_sub(RS232_MINOR) {
        if (off as usize) < NR_RS_LINES {
            return Some((NR_CONS + off as usize, false));
        }
    }
    if let Some(off) = minor.checked_sub(TTYPX_MINOR) {
        if (off as usize) < NR_PTYS {
            return Some((NR_CONS + NR_RS_LINES + off as usize, false));
        }
    }
    if let Some(off) = minor.checked_sub(PTYPX_MINOR) {
        if (off as usize) < NR_PTYS {
            return Some((NR_CONS + NR_RS_LINES + off as usize, true));
        }
    }
    None
}

impl<K: Kernel> Driver<K> {
    /// Build the fixed line table. Back-ends are plugged in afterwards with
    /// [`Driver::attach`]; a line without one answers ENXIO.
    pub fn new(kernel: K) -> Self {
        let mut lines = Vec::with_capacity(NR_TTYS);
        for i in 0..NR_TTYS {
            let minor = if i < NR_CONS {
                CONS_MINOR + i as u16
            } else if i < NR_CONS + NR_RS_LINES {
                RS232_MINOR + (i - NR_CONS) as u16
            } else {
                TTYPX_MINOR + (i - NR_CONS - NR_RS_LINES) as u16
            };
            lines.push(Line {
                state: LineState::new(minor, i),
                dev: None,
            });
        }
        log::info!("tty: {} lines configured", NR_TTYS);
        Self {
            kernel,
            lines,
            timers: TimerQueue::new(),
            next_timeout: None,
            fkeys: [None; NR_FKEYS],
        }
    }

    /// Plug a device back-end into a line at initialization
    pub fn attach(&mut self, index: usize, dev: Box<dyn Device>) {
        self.lines[index].dev = Some(dev);
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn line(&self, index: usize) -> &LineState {
        &self.lines[index].state
    }

    pub fn line_mut(&mut self, index: usize) -> &mut LineState {
        &mut self.lines[index].state
    }

    /// Handle one message, then drain any events it raised. This is the
    /// synchronous entry point; [`Driver::serve`] wraps it in a loop.
    pub fn service(&mut self, msg: Message) {
        self.handle_message(msg);
        self.poll_events();
    }

    /// Run the dispatcher from a mailbox stream.
    ///
    /// Events raised by back-end upcalls are always drained before the
    /// task blocks for the next message, so none are lost.
    pub async fn serve(&mut self, messages: &mut MessageStream) {
        loop {
            self.poll_events();
            match messages.next().await {
                Some(msg) => self.handle_message(msg),
                None => break,
            }
        }
    }

    /// Run the event pump for every line whose event flag is raised, until
    /// a full scan finds none.
    pub fn poll_events(&mut self) {
        loop {
            let mut any = false;
            for idx in 0..self.lines.len() {
                if self.lines[idx].state.events {
                    any = true;
                    self.handle_events(idx);
                }
            }
            if !any {
                break;
            }
        }
    }

    /// Decode and dispatch one incoming message
    pub fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Alarm => self.expire_timers(),
            Message::Interrupt => self.do_interrupt(),
            Message::Shutdown => self.do_shutdown(),
            Message::KernelMessage { addr, count } => {
                let _ = self.console_print(KERNEL, addr, count);
            }
            Message::Diagnostics { caller, proc_nr, addr, count } => {
                let r = self.console_print(proc_nr, addr, count);
                tty_reply(&mut self.kernel, false, caller, proc_nr, r);
            }
            Message::FkeyRegister { caller, keys } => self.do_fkey_register(caller, keys),
            Message::FkeyUnregister { caller, keys } => self.do_fkey_unregister(caller, keys),
            Message::Status { caller } => self.do_status(caller),
            other => self.device_request(other),
        }
    }

    /// Route a device request to its line's handler
    fn device_request(&mut self, msg: Message) {
        let (minor, caller, proc_nr) = match msg.target() {
            Some(t) => t,
            None => return,
        };

        let (idx, master) = match map_minor(minor) {
            Some(m) => m,
            None => {
                log::warn!("tty: request for illegal minor {}", minor);
                tty_reply(&mut self.kernel, false, caller, proc_nr, ENXIO);
                return;
            }
        };

        if self.lines[idx].dev.is_none() {
            log::warn!("tty: request for unconfigured minor {}", minor);
            tty_reply(&mut self.kernel, false, caller, proc_nr, ENXIO);
            return;
        }

        // Master-side pseudo-terminal traffic, except ioctls, belongs to
        // the back-end in its entirety.
        if master && !matches!(msg, Message::Ioctl { .. }) {
            let handled = {
                let Self { kernel, lines, .. } = self;
                let line = &mut lines[idx];
                match line.dev.as_deref_mut() {
                    Some(dev) => dev.master(&mut line.state, kernel, &msg),
                    None => false,
                }
            };
            if !handled {
                tty_reply(&mut self.kernel, false, caller, proc_nr, ENXIO);
            }
            return;
        }

        match msg {
            Message::Read { addr, count, nonblock, .. } => {
                self.do_read(idx, caller, proc_nr, addr, count, nonblock)
            }
            Message::Write { addr, count, nonblock, .. } => {
                self.do_write(idx, caller, proc_nr, addr, count, nonblock)
            }
            Message::Ioctl { request, addr, .. } => {
                self.do_ioctl(idx, caller, proc_nr, request, addr)
            }
            Message::Open { flags, .. } => self.do_open(idx, minor, caller, proc_nr, flags),
            Message::Close { .. } => self.do_close(idx, minor, caller, proc_nr),
            Message::Select { ops, watch, .. } => {
                self.do_select(idx, caller, proc_nr, ops, watch)
            }
            Message::Cancel { mode, .. } => self.do_cancel(idx, caller, proc_nr, mode),
            _ => {
                log::warn!("tty: unexpected request for minor {}", minor);
                tty_reply(&mut self.kernel, false, caller, proc_nr, EINVAL);
            }
        }
    }

    /// Handle any events pending on a line.
    ///
    /// Keeps invoking the back-end's read and write paths until the event
    /// flag stays clear (an upcall may raise it again), then transfers
    /// queued input to the waiting reader and completes a read that has
    /// reached its minimum.
    pub fn handle_events(&mut self, idx: usize) {
        loop {
            {
                let Self { kernel, lines, .. } = self;
                let line = &mut lines[idx];
                line.state.events = false;
                if let Some(dev) = line.dev.as_deref_mut() {
                    // Read input and perform input processing.
                    dev.read(&mut line.state, kernel, false);
                    // Perform output processing and write output.
                    dev.write(&mut line.state, kernel, false);
                }
            }
            if self.lines[idx].state.take_timer_request() {
                self.settimer(idx, true);
            }
            // Ioctl waiting for output to drain?
            if self.lines[idx].state.io.req != 0 {
                self.dev_ioctl(idx);
            }
            if !self.lines[idx].state.events {
                break;
            }
        }

        // Transfer characters from the input queue to a waiting process.
        {
            let Self { kernel, lines, .. } = self;
            let line = &mut lines[idx];
            line.state.in_transfer(kernel);

            // Reply if enough bytes are available.
            if line.state.rd.left > 0 && line.state.rd.cum >= line.state.min {
                if line.state.rd.revive {
                    kernel.notify(line.state.rd.caller);
                    line.state.rd.revived = true;
                } else {
                    tty_reply(
                        kernel,
                        false,
                        line.state.rd.caller,
                        line.state.rd.proc_nr,
                        line.state.rd.cum as i32,
                    );
                    line.state.rd.left = 0;
                    line.state.rd.cum = 0;
                }
            }
        }

        if self.lines[idx].state.select_ops != 0 {
            self.select_retry(idx);
        }
    }

    /// A process wants to read from a terminal
    fn do_read(
        &mut self,
        idx: usize,
        caller: Endpoint,
        proc_nr: Endpoint,
        addr: UserAddr,
        count: usize,
        nonblock: bool,
    ) {
        let r;
        if self.lines[idx].state.rd.left > 0 {
            r = EIO;
        } else if count == 0 {
            r = EINVAL;
        } else if !self.kernel.map_user(proc_nr, addr, count) {
            r = EFAULT;
        } else {
            // Record the request in the line's read slot.
            let mut timer_op = None;
            {
                let state = &mut self.lines[idx].state;
                state.rd.revive = false;
                state.rd.revived = false;
                state.rd.caller = caller;
                state.rd.proc_nr = proc_nr;
                state.rd.addr = addr;
                state.rd.left = count;
                state.rd.cum = 0;

                if state.termios.c_lflag & ICANON == 0 && state.termios.c_cc[VTIME] > 0 {
                    if state.termios.c_cc[VMIN] == 0 {
                        // MIN & TIME specify a read timer that finishes the
                        // read in TIME/10 seconds if no bytes are available.
                        timer_op = Some(true);
                        state.min = 1;
                    } else {
                        // MIN & TIME specify an inter-byte timer that may
                        // have to be cancelled if there are no bytes yet.
                        if state.input.eot_count() == 0 {
                            timer_op = Some(false);
                            state.min = state.termios.c_cc[VMIN] as usize;
                        }
                    }
                }
            }
            if let Some(enable) = timer_op {
                self.settimer(idx, enable);
            }

            // Anything waiting in the input queue? Clear it out...
            {
                let Self { kernel, lines, .. } = self;
                lines[idx].state.in_transfer(kernel);
            }
            // ...then go back for more.
            self.handle_events(idx);
            if self.lines[idx].state.rd.left == 0 {
                if self.lines[idx].state.select_ops != 0 {
                    self.select_retry(idx);
                }
                return; // already done
            }

            // There were not enough bytes, so either suspend the caller or
            // break off the read if nonblocking.
            if nonblock {
                r = EAGAIN; // cancel the read
                let state = &mut self.lines[idx].state;
                state.rd.left = 0;
                state.rd.cum = 0;
            } else {
                r = SUSPEND; // suspend the caller
                self.lines[idx].state.rd.revive = true;
            }
        }
        tty_reply(&mut self.kernel, false, caller, proc_nr, r);
        if self.lines[idx].state.select_ops != 0 {
            self.select_retry(idx);
        }
    }

    /// A process wants to write on a terminal
    fn do_write(
        &mut self,
        idx: usize,
        caller: Endpoint,
        proc_nr: Endpoint,
        addr: UserAddr,
        count: usize,
        nonblock: bool,
    ) {
        let r;
        if self.lines[idx].state.wr.left > 0 {
            r = EIO;
        } else if count == 0 {
            r = EINVAL;
        } else if !self.kernel.map_user(proc_nr, addr, count) {
            r = EFAULT;
        } else {
            // Record the request in the line's write slot.
            {
                let state = &mut self.lines[idx].state;
                state.wr.revive = false;
                state.wr.revived = false;
                state.wr.caller = caller;
                state.wr.proc_nr = proc_nr;
                state.wr.addr = addr;
                state.wr.left = count;
                state.wr.cum = 0;
            }

            // Try to write.
            self.handle_events(idx);
            if self.lines[idx].state.wr.left == 0 {
                return; // already done
            }

            // None or not all the bytes could be written.
            if nonblock {
                let state = &mut self.lines[idx].state;
                r = if state.wr.cum > 0 { state.wr.cum as i32 } else { EAGAIN };
                state.wr.left = 0;
                state.wr.cum = 0;
            } else {
                r = SUSPEND; // suspend the caller
                self.lines[idx].state.wr.revive = true;
            }
        }
        tty_reply(&mut self.kernel, false, caller, proc_nr, r);
    }

    /// A line has been opened.
    ///
    /// Unless O_NOCTTY is given (and it is not the log device), the line
    /// becomes the caller's controlling terminal and the reply status is 1
    /// instead of 0.
    fn do_open(
        &mut self,
        idx: usize,
        minor: u16,
        caller: Endpoint,
        proc_nr: Endpoint,
        flags: u32,
    ) {
        let mut r = OK;
        if minor == LOG_MINOR {
            // The log device is a write-only diagnostics device.
            if flags & R_BIT != 0 {
                r = EACCES;
            }
        } else {
            let state = &mut self.lines[idx].state;
            if flags & O_NOCTTY == 0 {
                state.pgrp = proc_nr;
                r = 1;
            }
            state.openct += 1;
        }
        tty_reply(&mut self.kernel, false, caller, proc_nr, r);
    }

    /// A line has been closed. Clean it up if this was the last close.
    fn do_close(&mut self, idx: usize, minor: u16, caller: Endpoint, proc_nr: Endpoint) {
        let mut last = false;
        if minor != LOG_MINOR {
            let state = &mut self.lines[idx].state;
            state.openct = state.openct.saturating_sub(1);
            last = state.openct == 0;
        }
        if last {
            {
                let Self { lines, .. } = self;
                let line = &mut lines[idx];
                line.state.pgrp = 0;
                if let Some(dev) = line.dev.as_deref_mut() {
                    line.state.icancel(dev);
                    dev.ocancel(&mut line.state);
                    dev.close(&mut line.state);
                }
                line.state.termios = Termios::default();
                line.state.winsize = Winsize::default();
            }
            self.setattr(idx);
        }
        tty_reply(&mut self.kernel, false, caller, proc_nr, OK);
    }

    /// A signal interrupted a process blocked on this line; finish its
    /// pending request off immediately.
    fn do_cancel(&mut self, idx: usize, caller: Endpoint, proc_nr: Endpoint, mode: u32) {
        let mut read_cancelled = false;
        {
            let Self { lines, .. } = self;
            let line = &mut lines[idx];

            // Check the parameters carefully, to avoid cancelling twice.
            if mode & R_BIT != 0 && line.state.rd.left != 0 && proc_nr == line.state.rd.proc_nr {
                // Process was reading when killed. Clean up input.
                if let Some(dev) = line.dev.as_deref_mut() {
                    line.state.icancel(dev);
                } else {
                    line.state.input.clear();
                }
                line.state.rd.left = 0;
                line.state.rd.cum = 0;
                read_cancelled = true;
            }
            if mode & W_BIT != 0 && line.state.wr.left != 0 && proc_nr == line.state.wr.proc_nr {
                // Process was writing when killed. Clean up output.
                if let Some(dev) = line.dev.as_deref_mut() {
                    dev.ocancel(&mut line.state);
                }
                line.state.wr.left = 0;
                line.state.wr.cum = 0;
            }
            if line.state.io.req != 0 && proc_nr == line.state.io.proc_nr {
                // Process was waiting for output to drain.
                line.state.io.req = 0;
            }
            line.state.events = true;
        }
        if read_cancelled {
            self.settimer(idx, false);
        }
        tty_reply(&mut self.kernel, false, caller, proc_nr, EINTR);
    }

    /// Report one pending select or revive event to the caller.
    ///
    /// Lines are scanned in order; within a line, select readiness is
    /// checked before an input revive, before an output revive. The file
    /// system keeps probing until it gets NoStatus.
    pub fn do_status(&mut self, caller: Endpoint) {
        for idx in 0..self.lines.len() {
            let ops = self.lines[idx].state.select_ops;
            if ops != 0 && self.lines[idx].state.select_proc == caller {
                let ready = self.select_try(idx, ops);
                if ready != 0 {
                    // I/O for a selected minor device is ready.
                    self.lines[idx].state.select_ops &= !ready;
                    let minor = self.lines[idx].state.minor;
                    self.status_reply(caller, Reply::IoReady { minor, ops: ready });
                    return;
                }
            }

            let reply = {
                let state = &mut self.lines[idx].state;
                if state.rd.revived && state.rd.caller == caller {
                    // Suspended read finished. Send a revive.
                    let reply = Reply::Revive {
                        proc_nr: state.rd.proc_nr,
                        status: state.rd.cum as i32,
                    };
                    state.rd.left = 0;
                    state.rd.cum = 0;
                    state.rd.revived = false;
                    Some(reply)
                } else if state.wr.revived && state.wr.caller == caller {
                    // Suspended write finished. Send a revive.
                    let reply = Reply::Revive {
                        proc_nr: state.wr.proc_nr,
                        status: state.wr.cum as i32,
                    };
                    state.wr.cum = 0;
                    state.wr.revived = false;
                    Some(reply)
                } else {
                    None
                }
            };
            if let Some(reply) = reply {
                self.status_reply(caller, reply);
                return;
            }
        }
        // No events of interest were found.
        self.status_reply(caller, Reply::NoStatus);
    }

    fn status_reply(&mut self, caller: Endpoint, reply: Reply) {
        if let Err(e) = self.kernel.send(caller, reply) {
            panic!("tty: status reply to {} failed ({})", caller, e);
        }
    }

    /// Hardware interrupt: let every back-end collect completed work, then
    /// run expired timers.
    fn do_interrupt(&mut self) {
        {
            let Self { kernel, lines, .. } = self;
            for line in lines.iter_mut() {
                if let Some(dev) = line.dev.as_deref_mut() {
                    dev.interrupt(&mut line.state, kernel);
                }
            }
        }
        self.expire_timers();
    }

    /// System shutdown: ask the console back-ends to stop
    fn do_shutdown(&mut self) {
        log::info!("tty: shutdown; stopping console");
        let Self { lines, .. } = self;
        for line in lines.iter_mut().take(NR_CONS) {
            if let Some(dev) = line.dev.as_deref_mut() {
                dev.close(&mut line.state);
            }
        }
    }

    /// Copy text out of `proc_nr` and render it on the primary console.
    /// Console output over pending echo marks the line for reprint.
    fn console_print(&mut self, proc_nr: Endpoint, addr: UserAddr, count: usize) -> i32 {
        let mut addr = addr;
        let mut left = count;
        while left > 0 {
            let n = left.min(64);
            let mut buf = [0u8; 64];
            if let Err(e) = self.kernel.copy_from_user(proc_nr, addr, &mut buf[..n]) {
                return e;
            }
            let Self { lines, .. } = self;
            let line = &mut lines[0];
            if let Some(dev) = line.dev.as_deref_mut() {
                for &b in &buf[..n] {
                    dev.echo(&mut line.state, b);
                }
            }
            addr += n;
            left -= n;
        }
        if count > 0 {
            self.lines[0].state.reprint = true;
        }
        OK
    }

    /// Register the caller as observer of the function keys in `keys`.
    /// A key that already has a different observer stays with it.
    fn do_fkey_register(&mut self, caller: Endpoint, keys: u16) {
        let mut r = OK;
        for (i, slot) in self.fkeys.iter_mut().enumerate() {
            if keys & (1 << i) == 0 {
                continue;
            }
            match slot {
                Some(owner) if *owner != caller => r = EBUSY,
                _ => *slot = Some(caller),
            }
        }
        tty_reply(&mut self.kernel, false, caller, caller, r);
    }

    /// Drop the caller's claim on the function keys in `keys`
    fn do_fkey_unregister(&mut self, caller: Endpoint, keys: u16) {
        for (i, slot) in self.fkeys.iter_mut().enumerate() {
            if keys & (1 << i) != 0 && *slot == Some(caller) {
                *slot = None;
            }
        }
        tty_reply(&mut self.kernel, false, caller, caller, OK);
    }

    /// The keyboard back-end reports a function key; notify its observer.
    pub fn fkey_pressed(&mut self, key: usize) {
        if let Some(Some(observer)) = self.fkeys.get(key) {
            self.kernel.notify(*observer);
        }
    }

    /// Run `f` against the line state and its back-end, if one is attached
    pub(crate) fn with_line_dev(
        &mut self,
        idx: usize,
        f: impl FnOnce(&mut LineState, &mut dyn Device),
    ) {
        let Self { lines, .. } = self;
        let line = &mut lines[idx];
        if let Some(dev) = line.dev.as_deref_mut() {
            f(&mut line.state, dev);
        }
    }

    /// Like [`Driver::with_line_dev`], with the kernel handle as well
    pub(crate) fn with_line_dev_kernel(
        &mut self,
        idx: usize,
        f: impl FnOnce(&mut LineState, &mut dyn Device, &mut dyn Kernel),
    ) {
        let Self { kernel, lines, .. } = self;
        let line = &mut lines[idx];
        if let Some(dev) = line.dev.as_deref_mut() {
            f(&mut line.state, dev, kernel);
        }
    }

    /// Arm or disarm the line's VTIME timer and keep the kernel alarm
    /// pointed at the earliest deadline.
    pub(crate) fn settimer(&mut self, idx: usize, enable: bool) {
        if enable {
            let now = self.kernel.uptime();
            let vtime = self.lines[idx].state.termios.c_cc[VTIME] as Ticks;
            self.timers.set(idx, now + vtime * (HZ / 10));
        } else {
            self.timers.clear(idx);
        }
        self.sync_alarm();
    }

    /// Run the watchdogs of all expired timers: an expired read timer
    /// forces the line's read to complete with whatever is there.
    pub(crate) fn expire_timers(&mut self) {
        let now = self.kernel.uptime();
        for idx in self.timers.expire(now) {
            let state = &mut self.lines[idx].state;
            state.min = 0; // force read to succeed
            state.events = true;
        }
        self.sync_alarm();
    }

    fn sync_alarm(&mut self) {
        match self.timers.next_deadline() {
            None => self.next_timeout = None,
            Some(t) => {
                if self.next_timeout != Some(t) {
                    self.next_timeout = Some(t);
                    self.kernel.set_alarm(t);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_minors_map_to_leading_lines() {
        assert_eq!(map_minor(CONS_MINOR), Some((0, false)));
        assert_eq!(map_minor(CONS_MINOR + NR_CONS as u16 - 1), Some((NR_CONS - 1, false)));
    }

    #[test]
    fn test_log_minor_aliases_first_console() {
        assert_eq!(map_minor(LOG_MINOR), Some((0, false)));
    }

    #[test]
    fn test_serial_minors_follow_consoles() {
        assert_eq!(map_minor(RS232_MINOR), Some((NR_CONS, false)));
        assert_eq!(
            map_minor(RS232_MINOR + NR_RS_LINES as u16 - 1),
            Some((NR_CONS + NR_RS_LINES - 1, false))
        );
    }

    #[test]
    fn test_pty_minors_share_a_line_per_pair() {
        let slave = map_minor(TTYPX_MINOR).unwrap();
        let master = map_minor(PTYPX_MINOR).unwrap();
        assert_eq!(slave.0, master.0);
        assert!(!slave.1);
        assert!(master.1);
    }

    #[test]
    fn test_unassigned_minors_do_not_map() {
        assert_eq!(map_minor(CONS_MINOR + NR_CONS as u16), None);
        assert_eq!(map_minor(RS232_MINOR + NR_RS_LINES as u16), None);
        assert_eq!(map_minor(TTYPX_MINOR + NR_PTYS as u16), None);
        assert_eq!(map_minor(PTYPX_MINOR + NR_PTYS as u16), None);
        assert_eq!(map_minor(u16::MAX), None);
    }
}
