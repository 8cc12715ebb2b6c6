//! Mock transports for tests and hardware-free development.

pub mod lamp;
pub mod transport;

pub use lamp::SimulatedLamp;
pub use transport::{MockTransport, ReadEvent, WriteBehavior};
