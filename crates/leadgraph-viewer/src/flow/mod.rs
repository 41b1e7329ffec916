pub mod highlight;
pub mod layout;
pub mod model;
pub mod state;

pub use layout::FlowParams;
pub use model::{build_flows, FlowModel};
pub use state::FlowState;
