//! Line discipline: input cooking, echo, and output post-processing
//!
//! This is the device-independent heart of the driver. It implements:
//!
//! - **Canonical mode**: line-by-line input assembly with erase, kill,
//!   literal-next and reprint editing
//! - **Raw mode**: every byte is its own delivery unit, governed by
//!   VMIN/VTIME
//! - **Signal generation**: VINTR/VQUIT raise signals against the
//!   foreground process group
//! - **Echo**: control characters render as `^X`, tabs as spaces, EOF is
//!   drawn and immediately backed over; stored widths make visual erase
//!   exact
//! - **Output post-processing**: NL to CR-NL mapping and tab expansion over
//!   a circular device buffer
//!
//! Input arrives from a device back-end through [`LineState::in_process`],
//! accumulates in the tagged input queue, and leaves toward the reading
//! process through [`LineState::in_transfer`].

use crate::device::Device;
use crate::input::InWord;
use crate::line::{LineState, TAB_MASK, TAB_SIZE};
use crate::message::{tty_reply, Kernel, SIGINT, SIGQUIT};
use crate::termios::{
    B0, ECHO, ECHOE, ECHOK, ECHONL, ICANON, ICRNL, IEXTEN, IGNCR, INLCR, ISIG, ISTRIP, IXANY,
    IXON, NOFLSH, ONLCR, OPOST, POSIX_VDISABLE, VEOF, VEOL, VERASE, VINTR, VKILL, VLNEXT, VMIN,
    VQUIT, VREPRINT, VSTART, VSTOP, VTIME, XTABS,
};

/// Bounce buffer size for queue-to-user copies
const XFER_CHUNK: usize = 64;

impl LineState {
    /// Cook a batch of bytes received from the device.
    ///
    /// Each byte runs through stripping, literal-next handling, CR/LF
    /// translation, canonical editing, flow control and signal checks, is
    /// echoed, and lands in the input queue tagged with its classification.
    /// Returns the number of bytes consumed; in raw mode a full queue stops
    /// the batch early so the device can hold the tail.
    pub fn in_process(
        &mut self,
        dev: &mut dyn Device,
        kernel: &mut dyn Kernel,
        buf: &[u8],
    ) -> usize {
        let mut timeset = false;

        for ct in 0..buf.len() {
            let mut ch = buf[ct];

            // Strip to seven bits?
            if self.termios.c_iflag & ISTRIP != 0 {
                ch &= 0x7F;
            }
            let mut w = InWord::new(ch);

            // Input extensions?
            if self.termios.c_lflag & IEXTEN != 0 {
                // Previous character was a character escape?
                if self.escaped {
                    self.escaped = false;
                    w = w.with_escape();
                }

                // LNEXT (^V) to escape the next character?
                if !w.is_escaped() && w.ch() == self.termios.c_cc[VLNEXT] {
                    self.escaped = true;
                    self.rawecho(dev, b'^');
                    self.rawecho(dev, 0x08);
                    continue; // do not store the escape itself
                }

                // REPRINT (^R) to redraw the pending line?
                if !w.is_escaped() && w.ch() == self.termios.c_cc[VREPRINT] {
                    self.reprint_line(dev);
                    continue;
                }
            }

            // The disable value is an ordinary byte value, so protect it
            // from matching any control character below.
            if !w.is_escaped() && w.ch() == POSIX_VDISABLE {
                w = w.with_escape();
            }

            // Map CR to LF, ignore CR, or map LF to CR.
            if !w.is_escaped() {
                if w.ch() == b'\r' {
                    if self.termios.c_iflag & IGNCR != 0 {
                        continue;
                    }
                    if self.termios.c_iflag & ICRNL != 0 {
                        w = InWord::new(b'\n');
                    }
                } else if w.ch() == b'\n' && self.termios.c_iflag & INLCR != 0 {
                    w = InWord::new(b'\r');
                }
            }

            // Canonical mode?
            if self.termios.c_lflag & ICANON != 0 {
                // Erase processing (rub out of last character).
                if !w.is_escaped() && w.ch() == self.termios.c_cc[VERASE] {
                    self.back_over(dev);
                    if self.termios.c_lflag & ECHOE == 0 {
                        let _ = self.echo_word(dev, w);
                    }
                    continue;
                }

                // Kill processing (remove current line).
                if !w.is_escaped() && w.ch() == self.termios.c_cc[VKILL] {
                    while self.back_over(dev) {}
                    if self.termios.c_lflag & ECHOE == 0 {
                        let _ = self.echo_word(dev, w);
                        if self.termios.c_lflag & ECHOK != 0 {
                            self.rawecho(dev, b'\n');
                        }
                    }
                    continue;
                }

                // EOF (^D) means end-of-file, an invisible "line break".
                if !w.is_escaped() && w.ch() == self.termios.c_cc[VEOF] {
                    w = w.with_eot().with_eof();
                }

                // The line may be returned to the user after an LF.
                if !w.is_escaped() && w.ch() == b'\n' {
                    w = w.with_eot();
                }

                // Same thing with EOL, whatever it may be.
                if !w.is_escaped() && w.ch() == self.termios.c_cc[VEOL] {
                    w = w.with_eot();
                }
            }

            // Start/stop input control?
            if self.termios.c_iflag & IXON != 0 {
                // Output stops on STOP (^S).
                if !w.is_escaped() && w.ch() == self.termios.c_cc[VSTOP] {
                    self.inhibited = true;
                    self.events = true;
                    continue;
                }

                // Output restarts on START (^Q) or any character if IXANY.
                if self.inhibited {
                    let is_start = !w.is_escaped() && w.ch() == self.termios.c_cc[VSTART];
                    if is_start || self.termios.c_iflag & IXANY != 0 {
                        self.inhibited = false;
                        self.events = true;
                        if is_start {
                            continue;
                        }
                    }
                }
            }

            if self.termios.c_lflag & ISIG != 0 {
                // Check for INTR and QUIT characters.
                if !w.is_escaped()
                    && (w.ch() == self.termios.c_cc[VINTR]
                        || w.ch() == self.termios.c_cc[VQUIT])
                {
                    let sig = if w.ch() == self.termios.c_cc[VQUIT] {
                        SIGQUIT
                    } else {
                        SIGINT
                    };
                    self.sigchar(dev, kernel, sig);
                    let _ = self.echo_word(dev, w);
                    continue;
                }
            }

            // Is there space in the input queue?
            if self.input.is_full() {
                // No space; discard in canonical mode, keep in raw mode.
                if self.termios.c_lflag & ICANON != 0 {
                    continue;
                }
                return ct;
            }

            if self.termios.c_lflag & ICANON == 0 {
                // In raw mode all characters are "line breaks".
                w = w.with_eot();

                // Start an inter-byte timer?
                if !timeset
                    && self.termios.c_cc[VMIN] > 0
                    && self.termios.c_cc[VTIME] > 0
                {
                    self.request_timer();
                    timeset = true;
                }
            }

            // Perform the intricate function of echoing.
            if self.termios.c_lflag & (ECHO | ECHONL) != 0 {
                w = self.echo_word(dev, w);
            }

            // Save the character in the input queue.
            self.input.push(w);

            // Try to finish input if the queue threatens to overflow.
            if self.input.is_full() {
                self.in_transfer(kernel);
            }
        }
        buf.len()
    }

    /// Move deliverable words from the input queue to the waiting reader.
    ///
    /// Delivery happens once at least `min` line breaks are queued. In
    /// canonical mode it stops at and includes the first one; EOF words are
    /// consumed but never copied out. Completion replies directly or
    /// notifies for a revive, depending on how the read was recorded.
    pub fn in_transfer(&mut self, kernel: &mut dyn Kernel) {
        // Force the read to succeed if the line is hung up; this looks like
        // EOF to the reader.
        if self.termios.c_ospeed == B0 {
            self.min = 0;
        }

        // Anything to do?
        if self.rd.left == 0 || self.input.eot_count() < self.min {
            return;
        }

        let mut buf = [0u8; XFER_CHUNK];
        let mut n = 0;
        while self.rd.left > 0 && self.input.eot_count() > 0 {
            let w = match self.input.pop() {
                Some(w) => w,
                None => break,
            };

            if !w.is_eof() {
                // One character to be delivered to the user.
                buf[n] = w.ch();
                n += 1;
                self.rd.left -= 1;
                if n == XFER_CHUNK {
                    // Bounce buffer full, copy to user space.
                    let _ = kernel.copy_to_user(self.rd.proc_nr, self.rd.addr, &buf[..n]);
                    self.rd.addr += n;
                    self.rd.cum += n;
                    n = 0;
                }
            }

            if w.is_eot() && self.termios.c_lflag & ICANON != 0 {
                // Don't read past a line break in canonical mode.
                self.rd.left = 0;
            }
        }

        if n > 0 {
            // Leftover characters in the buffer.
            let _ = kernel.copy_to_user(self.rd.proc_nr, self.rd.addr, &buf[..n]);
            self.rd.addr += n;
            self.rd.cum += n;
        }

        // Usually reply to the reader, possibly even with zero bytes.
        if self.rd.left == 0 {
            if self.rd.revive {
                kernel.notify(self.rd.caller);
                self.rd.revived = true;
            } else {
                tty_reply(kernel, false, self.rd.caller, self.rd.proc_nr, self.rd.cum as i32);
                self.rd.left = 0;
                self.rd.cum = 0;
            }
        }
    }

    /// Echo one word if echoing is on.
    ///
    /// Some control characters are echoed with their normal effect, other
    /// control characters are echoed as `^X`, normal characters are echoed
    /// unchanged. EOF is echoed, but immediately backspaced over. Returns
    /// the word with the echoed width recorded in its attributes.
    pub(crate) fn echo_word(&mut self, dev: &mut dyn Device, w: InWord) -> InWord {
        let w = w.without_width();

        if self.termios.c_lflag & ECHO == 0 {
            // ECHONL still shows the newline that ends a canonical line.
            if w.is_eot()
                && !w.is_eof()
                && !w.is_escaped()
                && w.ch() == b'\n'
                && self.termios.c_lflag & (ICANON | ECHONL) == ICANON | ECHONL
            {
                dev.echo(self, b'\n');
            }
            return w;
        }

        // "Reprint" tells if the echo output has been messed up by other
        // output; an empty queue means there is nothing left to redraw.
        let rp = if self.input.is_empty() { false } else { self.reprint };

        let len;
        if w.ch() < b' ' {
            if !w.is_escaped() && !w.is_eof() && !w.is_eot() && w.ch() == b'\t' {
                let mut n = 0;
                loop {
                    dev.echo(self, b' ');
                    n += 1;
                    if n >= TAB_SIZE || self.position & TAB_MASK == 0 {
                        break;
                    }
                }
                len = n;
            } else if !w.is_escaped()
                && !w.is_eof()
                && w.is_eot()
                && (w.ch() == b'\r' || w.ch() == b'\n')
            {
                dev.echo(self, w.ch());
                len = 0;
            } else {
                dev.echo(self, b'^');
                dev.echo(self, b'@' + w.ch());
                len = 2;
            }
        } else if w.ch() == 0x7F {
            // A DEL prints as "^?".
            dev.echo(self, b'^');
            dev.echo(self, b'?');
            len = 2;
        } else {
            dev.echo(self, w.ch());
            len = 1;
        }

        // EOF is invisible: back over what was just drawn.
        let mut shown = len;
        if w.is_eof() {
            while shown > 0 {
                dev.echo(self, 0x08);
                shown -= 1;
            }
        }

        self.reprint = rp;
        w.with_width(shown)
    }

    /// Echo without interpretation if ECHO is set.
    pub(crate) fn rawecho(&mut self, dev: &mut dyn Device, ch: u8) {
        let rp = self.reprint;
        if self.termios.c_lflag & ECHO != 0 {
            dev.echo(self, ch);
        }
        self.reprint = rp;
    }

    /// Backspace to the previous character on screen and erase it.
    ///
    /// Line breaks are never erased. Returns true if a character was
    /// removed from the input queue.
    pub(crate) fn back_over(&mut self, dev: &mut dyn Device) -> bool {
        let newest = match self.input.newest() {
            Some(w) => w,
            None => return false, // queue empty
        };
        if newest.is_eot() {
            return false; // can't erase "line breaks"
        }
        if self.reprint {
            self.reprint_line(dev); // redraw first if the trail is messy
        }
        if let Some(w) = self.input.drop_newest() {
            if self.termios.c_lflag & ECHOE != 0 {
                for _ in 0..w.width() {
                    self.rawecho(dev, 0x08);
                    self.rawecho(dev, b' ');
                    self.rawecho(dev, 0x08);
                }
            }
        }
        true // one character erased
    }

    /// Redraw the pending input line.
    ///
    /// Used when the echoed input has been messed up by other output, or
    /// when REPRINT (^R) is typed. Re-echoing updates each word's stored
    /// width, since rendering may differ under changed settings.
    pub(crate) fn reprint_line(&mut self, dev: &mut dyn Device) {
        self.reprint = false;

        let pending = self.input.len_since_break();
        if pending == 0 {
            return; // no reason to reprint
        }

        // Show REPRINT (^R) and move to a new line.
        let mark = InWord::new(self.termios.c_cc[VREPRINT]).with_escape();
        let _ = self.echo_word(dev, mark);
        self.rawecho(dev, b'\r');
        self.rawecho(dev, b'\n');

        // Reprint from the last line break onwards.
        let start = self.input.len() - pending;
        for i in start..self.input.len() {
            let w = self.input.get(i);
            let w = self.echo_word(dev, w);
            self.input.set(i, w);
        }
    }

    /// Perform output processing on a circular buffer, in place.
    ///
    /// `buf` is the whole ring; processing starts at `bpos`, consumes at
    /// most `icount` unprocessed bytes and uses at most `ocount` free
    /// slots. LF becomes CR-LF under OPOST|ONLCR; the LF overwrites the
    /// following slot, so the scan must stop there. Tabs expand to spaces
    /// under OPOST|XTABS when `width` slots are free. The column position
    /// is updated modulo the tab size. Returns (bytes consumed, slots
    /// used).
    pub fn out_process(
        &mut self,
        buf: &mut [u8],
        bpos: usize,
        icount: usize,
        ocount: usize,
    ) -> (usize, usize) {
        let blen = buf.len();
        let mut bpos = bpos;
        let mut ict = icount;
        let mut oct = ocount;
        let mut pos = self.position as i32;

        'scan: while ict > 0 {
            match buf[bpos] {
                0x07 => {}
                0x08 => pos -= 1,
                b'\r' => pos = 0,
                b'\n' => {
                    if self.termios.c_oflag & (OPOST | ONLCR) == OPOST | ONLCR {
                        // Map LF to CR+LF if there is space. The LF lands
                        // in the following slot, so processing cannot
                        // continue past it.
                        if oct >= 2 {
                            buf[bpos] = b'\r';
                            bpos = (bpos + 1) % blen;
                            buf[bpos] = b'\n';
                            pos = 0;
                            ict -= 1;
                            oct -= 2;
                        }
                        break 'scan; // no space or buffer got changed
                    }
                }
                b'\t' => {
                    // Best guess for the tab length.
                    let mut width = TAB_SIZE - ((pos & TAB_MASK as i32) as usize);

                    if self.termios.c_oflag & (OPOST | XTABS) == OPOST | XTABS {
                        // Tabs must be expanded.
                        if oct >= width {
                            pos += width as i32;
                            ict -= 1;
                            oct -= width;
                            loop {
                                buf[bpos] = b' ';
                                bpos = (bpos + 1) % blen;
                                width -= 1;
                                if width == 0 {
                                    break;
                                }
                            }
                        }
                        break 'scan;
                    }
                    // Tabs are output directly.
                    pos += width as i32;
                }
                _ => {
                    // Assume any other character prints as one character.
                    pos += 1;
                }
            }
            bpos = (bpos + 1) % blen;
            ict -= 1;
            oct -= 1;
        }

        self.position = (pos & TAB_MASK as i32) as usize;
        (icount - ict, ocount - oct)
    }

    /// Process a signal character from the keyboard, or a hangup.
    ///
    /// The signal goes to the foreground process group. Unless NOFLSH is
    /// set, earlier input and all pending output are thrown away and an
    /// inhibited line is released.
    pub fn sigchar(&mut self, dev: &mut dyn Device, kernel: &mut dyn Kernel, sig: u32) {
        if self.pgrp != 0 {
            if let Err(e) = kernel.kill(self.pgrp, sig) {
                panic!("tty: signalling process group {} failed ({})", self.pgrp, e);
            }
        }

        if self.termios.c_lflag & NOFLSH == 0 {
            self.input.clear(); // kill earlier input
            dev.ocancel(self); // kill all output
            self.inhibited = false;
            self.events = true;
        }
    }

    /// Discard all pending input, both queued here and at the device.
    pub fn icancel(&mut self, dev: &mut dyn Device) {
        self.input.clear();
        dev.icancel(self);
    }

    /// Device back-ends call this right after consuming the final byte of
    /// the pending write request to deliver the completion.
    pub fn write_done(&mut self, kernel: &mut dyn Kernel) {
        if self.wr.left != 0 {
            return;
        }
        if self.wr.revive {
            if !self.wr.revived {
                kernel.notify(self.wr.caller);
                self.wr.revived = true;
            }
        } else if self.wr.cum > 0 {
            tty_reply(kernel, false, self.wr.caller, self.wr.proc_nr, self.wr.cum as i32);
            self.wr.cum = 0;
        }
    }
}
