use leadgraph_core::RelationshipRecord;

#[derive(Debug, Clone)]
pub struct Incoming {
    pub origin: String,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone)]
pub enum IncomingKind {
    Loaded(Vec<RelationshipRecord>),
    Error(String),
}

impl Incoming {
    pub fn loaded(origin: String, records: Vec<RelationshipRecord>) -> Self {
        Self {
            origin,
            kind: IncomingKind::Loaded(records),
        }
    }

    pub fn error(origin: String, msg: String) -> Self {
        Self {
            origin,
            kind: IncomingKind::Error(msg),
        }
    }
}
