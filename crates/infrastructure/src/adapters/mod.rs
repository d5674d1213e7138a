//! Adapters for the network, browser and clock ports.

mod loopback_window;
mod reqwest_executor;
mod system_clock;

pub use loopback_window::LoopbackAuthWindow;
pub use reqwest_executor::{DEFAULT_TIMEOUT, ReqwestExecutor, encode_form};
pub use system_clock::SystemClock;
