pub mod protocol;
pub mod source;
pub mod watch;

pub use protocol::{Incoming, IncomingKind};
pub use source::{DemoSource, JsonFileSource, RecordSource};
pub use watch::spawn_reader;
