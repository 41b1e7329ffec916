pub mod highlight;
pub mod layout;
pub mod model;
pub mod state;
pub mod timeline;
pub mod view;

pub use layout::{SimParams, Simulation};
pub use model::{build_network, NetworkModel};
pub use state::NetworkState;
