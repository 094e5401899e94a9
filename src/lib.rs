//! Client for the goods-marking document registry that never sends more than
//! a configured number of documents per time window.
//!
//! - [`rate_limit`]: sliding-window admission counter.
//! - [`dispatcher`]: FIFO queue drained through the window on every submit.
//! - [`transport`] and [`encoding`]: how a queued document reaches the wire.

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod encoding;
pub mod error;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatcher::{CancelHandle, Dispatcher, DrainReport};
pub use encoding::{Encoder, JsonEncoder};
pub use error::{ConfigError, DispatchError, EncodeError, TransportError};
pub use models::{Description, Document, DocumentType, Product};
pub use rate_limit::{SharedSlidingWindow, SlidingWindow, TimeUnit, WindowConfig};
pub use transport::{Delivery, HttpTransport, Transport};
