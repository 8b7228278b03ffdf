//! POSIX termios structure and constants
//!
//! This module provides the terminal I/O interface structures and constants
//! as defined by POSIX.1-2017. These control input processing (erase, kill,
//! flow control, CR/LF translation), output post-processing, echo behavior,
//! and the VMIN/VTIME read semantics of non-canonical mode.

use core::default::Default;

/// Number of control characters in the c_cc array
pub const NCCS: usize = 20;

/// Control character value that disables the corresponding function
pub const POSIX_VDISABLE: u8 = 0xFF;

// =============================================================================
// Input Flags (c_iflag)
// =============================================================================

/// Strip character to 7 bits
pub const ISTRIP: u32 = 0o000040;

/// Map NL to CR on input
pub const INLCR: u32 = 0o000100;

/// Ignore CR on input
pub const IGNCR: u32 = 0o000200;

/// Map CR to NL on input (unless IGNCR is set)
pub const ICRNL: u32 = 0o000400;

/// Enable XON/XOFF flow control on output
pub const IXON: u32 = 0o002000;

/// Any character will restart after stop
pub const IXANY: u32 = 0o004000;

/// Enable XON/XOFF flow control on input
pub const IXOFF: u32 = 0o010000;

// =============================================================================
// Output Flags (c_oflag)
// =============================================================================

/// Enable output processing
pub const OPOST: u32 = 0o000001;

/// Map NL to CR-NL on output
pub const ONLCR: u32 = 0o000004;

/// Expand tabs to spaces on output
pub const XTABS: u32 = 0o014000;

// =============================================================================
// Local Flags (c_lflag)
// =============================================================================

/// Enable signals (INTR, QUIT)
pub const ISIG: u32 = 0o000001;

/// Canonical mode (line-by-line input)
pub const ICANON: u32 = 0o000002;

/// Enable echo
pub const ECHO: u32 = 0o000010;

/// Echo ERASE as backspace-space-backspace
pub const ECHOE: u32 = 0o000020;

/// Echo KILL by starting a new line
pub const ECHOK: u32 = 0o000040;

/// Echo NL even if ECHO is not set
pub const ECHONL: u32 = 0o000100;

/// Disable flushing after interrupt or quit
pub const NOFLSH: u32 = 0o000200;

/// Send SIGTTOU for background output
pub const TOSTOP: u32 = 0o000400;

/// Enable implementation-defined input processing (LNEXT, REPRINT)
pub const IEXTEN: u32 = 0o100000;

// =============================================================================
// Control Character Indices (c_cc)
// =============================================================================

/// Interrupt character (SIGINT) - typically Ctrl+C
pub const VINTR: usize = 0;

/// Quit character (SIGQUIT) - typically Ctrl+\
pub const VQUIT: usize = 1;

/// Erase character - typically Backspace or DEL
pub const VERASE: usize = 2;

/// Kill line character - typically Ctrl+U
pub const VKILL: usize = 3;

/// End of file character - typically Ctrl+D
pub const VEOF: usize = 4;

/// Timeout in deciseconds for non-canonical read
pub const VTIME: usize = 5;

/// Minimum number of characters for non-canonical read
pub const VMIN: usize = 6;

/// Start character for XON/XOFF - typically Ctrl+Q
pub const VSTART: usize = 8;

/// Stop character for XON/XOFF - typically Ctrl+S
pub const VSTOP: usize = 9;

/// Suspend character (SIGTSTP) - typically Ctrl+Z
pub const VSUSP: usize = 10;

/// Additional end-of-line character
pub const VEOL: usize = 11;

/// Reprint-line character - typically Ctrl+R
pub const VREPRINT: usize = 12;

/// Discard-output character - typically Ctrl+O
pub const VDISCARD: usize = 13;

/// Word erase character - typically Ctrl+W
pub const VWERASE: usize = 14;

/// Literal next character - typically Ctrl+V
pub const VLNEXT: usize = 15;

// =============================================================================
// Line Speeds
// =============================================================================

/// Zero baud: setting the output speed to B0 hangs up the line
pub const B0: u32 = 0;

/// Default line speed
pub const B38400: u32 = 38400;

// =============================================================================
// Default Control Character Values
// =============================================================================

/// Ctrl+C (ETX)
const CTRL_C: u8 = 0x03;

/// Ctrl+\ (FS)
const CTRL_BACKSLASH: u8 = 0x1C;

/// Backspace (BS)
const BS: u8 = 0x08;

/// Ctrl+U (NAK)
const CTRL_U: u8 = 0x15;

/// Ctrl+D (EOT)
const CTRL_D: u8 = 0x04;

/// Ctrl+Z (SUB)
const CTRL_Z: u8 = 0x1A;

/// Ctrl+Q (DC1/XON)
const CTRL_Q: u8 = 0x11;

/// Ctrl+S (DC3/XOFF)
const CTRL_S: u8 = 0x13;

/// Ctrl+R (DC2)
const CTRL_R: u8 = 0x12;

/// Ctrl+O (SI)
const CTRL_O: u8 = 0x0F;

/// Ctrl+V (SYN)
const CTRL_V: u8 = 0x16;

/// Ctrl+W (ETB)
const CTRL_W: u8 = 0x17;

// =============================================================================
// Termios Structure
// =============================================================================

/// Terminal I/O settings structure
///
/// This structure contains all the configuration for a terminal line,
/// following the POSIX termios specification. The layout is `repr(C)` with
/// no interior padding so the structure can cross the ioctl copy boundary
/// as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Termios {
    /// Input mode flags
    pub c_iflag: u32,

    /// Output mode flags
    pub c_oflag: u32,

    /// Control mode flags
    pub c_cflag: u32,

    /// Local mode flags
    pub c_lflag: u32,

    /// Input baud rate
    pub c_ispeed: u32,

    /// Output baud rate
    pub c_ospeed: u32,

    /// Control characters array
    pub c_cc: [u8; NCCS],
}

/// Size of the termios structure as it crosses the ioctl copy boundary
pub const TERMIOS_SIZE: usize = core::mem::size_of::<Termios>();

impl Default for Termios {
    /// Create termios with sane defaults
    ///
    /// Default settings:
    /// - Canonical mode enabled (line-by-line input)
    /// - Echo enabled, with visual erase
    /// - Signal generation enabled
    /// - CR mapped to NL on input, NL mapped to CR-NL on output
    /// - XON/XOFF output flow control enabled
    fn default() -> Self {
        let mut c_cc = [0u8; NCCS];

        c_cc[VINTR] = CTRL_C;
        c_cc[VQUIT] = CTRL_BACKSLASH;
        c_cc[VERASE] = BS;
        c_cc[VKILL] = CTRL_U;
        c_cc[VEOF] = CTRL_D;
        c_cc[VTIME] = 0;
        c_cc[VMIN] = 1;
        c_cc[VSTART] = CTRL_Q;
        c_cc[VSTOP] = CTRL_S;
        c_cc[VSUSP] = CTRL_Z;
        c_cc[VEOL] = POSIX_VDISABLE;
        c_cc[VREPRINT] = CTRL_R;
        c_cc[VDISCARD] = CTRL_O;
        c_cc[VWERASE] = CTRL_W;
        c_cc[VLNEXT] = CTRL_V;

        Self {
            c_iflag: ICRNL | IXON,
            c_oflag: OPOST | ONLCR,
            c_cflag: 0,
            c_lflag: ISIG | ICANON | ECHO | ECHOE | ECHOK | IEXTEN,
            c_ispeed: B38400,
            c_ospeed: B38400,
            c_cc,
        }
    }
}

impl Termios {
    /// Create a new termios with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if canonical (line) mode is enabled
    ///
    /// In canonical mode, input is delivered line by line and the erase,
    /// kill, and reprint characters are interpreted.
    #[inline]
    pub fn is_canonical(&self) -> bool {
        (self.c_lflag & ICANON) != 0
    }

    /// Check if echo is enabled
    #[inline]
    pub fn is_echo(&self) -> bool {
        (self.c_lflag & ECHO) != 0
    }

    /// Check if signal generation is enabled
    #[inline]
    pub fn is_sig(&self) -> bool {
        (self.c_lflag & ISIG) != 0
    }

    /// Get the erase character
    #[inline]
    pub fn erase_char(&self) -> u8 {
        self.c_cc[VERASE]
    }

    /// Get the kill (line erase) character
    #[inline]
    pub fn kill_char(&self) -> u8 {
        self.c_cc[VKILL]
    }

    /// Get the EOF character
    #[inline]
    pub fn eof_char(&self) -> u8 {
        self.c_cc[VEOF]
    }

    /// Get the VMIN value (minimum characters for non-canonical read)
    #[inline]
    pub fn vmin(&self) -> u8 {
        self.c_cc[VMIN]
    }

    /// Get the VTIME value (timeout in deciseconds for non-canonical read)
    #[inline]
    pub fn vtime(&self) -> u8 {
        self.c_cc[VTIME]
    }

    /// Set raw mode (disable canonical processing, echo, and signals)
    ///
    /// Used by applications that handle all input processing themselves.
    pub fn set_raw(&mut self) {
        self.c_lflag &= !(ICANON | ECHO | ECHOE | ECHOK | ECHONL | ISIG | IEXTEN);
        self.c_iflag &= !(ISTRIP | INLCR | IGNCR | ICRNL | IXON | IXANY | IXOFF);
        self.c_cc[VMIN] = 1;
        self.c_cc[VTIME] = 0;
    }

    /// Reset to cooked (default) mode
    pub fn set_cooked(&mut self) {
        *self = Self::default();
    }

    /// View the structure as raw bytes for a copy to user space.
    ///
    /// The layout has no interior or trailing padding (six u32 words
    /// followed by a 20-byte array), so every byte is initialized.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: Termios is repr(C), Copy, and padding-free; TERMIOS_SIZE
        // is its exact size.
        unsafe { core::slice::from_raw_parts(self as *const Termios as *const u8, TERMIOS_SIZE) }
    }

    /// Rebuild a structure from raw bytes copied in from user space.
    pub fn from_bytes(raw: &[u8; TERMIOS_SIZE]) -> Self {
        // SAFETY: the source holds TERMIOS_SIZE initialized bytes and every
        // bit pattern is a valid Termios (all fields are integers).
        unsafe { core::ptr::read_unaligned(raw.as_ptr() as *const Termios) }
    }
}
