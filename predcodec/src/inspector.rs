//! Per-cell tracing of the coding stages.
//!
//! Build with `--features inspector` to get every prediction, codeword
//! and reconstruction step printed to stdout.

// The debug version
#[cfg(feature = "inspector")]
#[macro_export]
macro_rules! inspector {
    ($( $args:expr ),*) => { println!( $( $args ),* ); }
}

// Non-debug version
#[cfg(not(feature = "inspector"))]
#[macro_export]
macro_rules! inspector {
    ($( $args:expr ),*) => {}
}
