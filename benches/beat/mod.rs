//! Beat loop building blocks.

mod click;
mod clock;

pub use click::bench_click;
pub use clock::bench_clock;
