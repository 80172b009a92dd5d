//! Port layer: device access, line parameters and the port state machine.
//!
//! [`PortHandle`] owns one device session. It is generic over a [`Backend`],
//! which is [`Tty`] for real terminals and [`MockLine`] in tests.

pub mod attributes;
pub mod error;
pub mod handle;
pub mod mock;
pub mod params;
pub mod reader;
pub mod traits;
pub mod tty;
mod writer;

pub use attributes::LineAttributes;
pub use error::{PortError, PortResult};
pub use handle::PortHandle;
pub use mock::{MockDevice, MockFault, MockLine};
pub use params::{BaudRate, CharSize, FlowControl, LineSettings, Parity, StopBits};
pub use reader::{ReadTimeoutRequest, MAX_READ_TIMEOUT_MS};
pub use traits::{Backend, LineDevice};
pub use tty::{Tty, TtyDevice};
