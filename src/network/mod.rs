// Simulated peer-to-peer network

mod error;
mod message;
mod node;
mod simulator;

pub use error::NetworkError;
pub use message::{Message, MessageType};
pub use node::{Admission, Node, NodeId};
pub use simulator::{Network, RELAY_LABEL};
