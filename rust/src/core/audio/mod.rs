pub mod error;
pub mod host;
pub mod transport;

pub use error::TransportError;
pub use host::{HostTransport, PlayPolicy, TransportCommand, TransportSnapshot};
pub use transport::{PlayCompleter, PlayRequest, Transport};
