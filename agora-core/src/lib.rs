pub mod clock;
pub mod error;
pub mod shutdown;

pub use clock::{LogicalClock, PhysicalClock};
pub use error::{Error, Result};
pub use shutdown::Shutdown;
