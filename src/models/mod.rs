pub mod alert;
pub mod monitor;
pub mod recurrence;
pub mod schedule;
pub mod treatment;
pub mod weather;

pub use alert::*;
pub use monitor::*;
pub use recurrence::*;
pub use schedule::*;
pub use treatment::*;
pub use weather::*;
