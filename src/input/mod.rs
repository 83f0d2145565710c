//! Pointer input capability and the synthetic input driver.

mod driver;

pub use driver::*;
