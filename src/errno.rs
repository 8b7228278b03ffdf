//! POSIX errno values
//!
//! Error codes returned to clients as negative status values, so a reply
//! status is sign-distinguishable from a byte count. The driver never
//! aborts on any of these; they travel back in reply messages.

/// No error
pub const OK: i32 = 0;

/// Interrupted system call (a pending request was cancelled)
pub const EINTR: i32 = -4;

/// I/O error (a request is already in progress on this line)
pub const EIO: i32 = -5;

/// No such device or address (unknown or unconfigured minor)
pub const ENXIO: i32 = -6;

/// Resource temporarily unavailable (nonblocking request would block)
pub const EAGAIN: i32 = -11;

/// Permission denied (log device opened for reading)
pub const EACCES: i32 = -13;

/// Bad address (user buffer not mappable)
pub const EFAULT: i32 = -14;

/// Device or resource busy
pub const EBUSY: i32 = -16;

/// Invalid argument
pub const EINVAL: i32 = -22;

/// Not a typewriter (unsupported ioctl request)
pub const ENOTTY: i32 = -25;

/// Status telling the file system to suspend the caller; the request
/// completes later with a revive.
pub const SUSPEND: i32 = -998;
