pub mod chain;
pub mod channel;
pub mod config;
pub mod device;
pub mod euclid;
pub mod filter;
pub mod hardware;
pub mod sequence;
pub mod switches;
pub mod trace;

pub use config::DeviceConfig;
pub use device::{Device, Shared};
pub use switches::{ChannelId, Switches};
