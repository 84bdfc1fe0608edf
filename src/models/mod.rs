pub mod error;
pub mod event;
pub mod response;

pub use error::BridgeError;
pub use event::GatewayEvent;
pub use response::GatewayResponse;
