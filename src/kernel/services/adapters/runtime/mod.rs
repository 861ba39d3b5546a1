//! Async runtime adapter: executes effects and sends completion messages back to the driver.

mod message;
mod runtime;

pub use message::AppMessage;
pub use runtime::{AsyncRuntime, RuntimeServices};
