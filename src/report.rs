// Events emitted while walking a message, compiled out unless the matching
// cargo feature is enabled.

/// Progress of the multipart walk (`tracing` feature).
macro_rules! trace_walk {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: "multimime::walk", $($arg)+);
    };
}

/// A malformed input that was tolerated (`tracing-recover` feature).
macro_rules! trace_recover {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing-recover")]
        ::tracing::warn!(target: "multimime::recover", $($arg)+);
    };
}

/// Input bytes thrown away without being handed to the caller
/// (`tracing-discard` feature).
macro_rules! trace_discard {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing-discard")]
        ::tracing::debug!(target: "multimime::discard", $($arg)+);
    };
}
