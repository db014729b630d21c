mod hub;
mod log;
mod registry;
mod uid;

pub use hub::{Hub, NodeInfo};
pub use log::MessageLog;
pub use registry::{SessionHandle, SessionReceiver, SessionRegistry, SessionSender};
pub use uid::{SessionId, SessionIdGenerator};
