//! Crate-internal logging shims
//!
//! Forward to the `log` facade when it is compiled in and expand to nothing
//! otherwise, so firmware builds without a logger pay zero bytes.

#[cfg(feature = "log")]
macro_rules! node_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! node_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! node_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! node_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! node_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! node_warn {
    ($($arg:tt)*) => {};
}
