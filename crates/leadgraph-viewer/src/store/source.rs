use anyhow::{Context, Result};
use leadgraph_core::{decode_records, demo_records, RelationshipRecord};
use std::fs;
use std::path::{Path, PathBuf};

pub trait RecordSource: Send {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<Vec<RelationshipRecord>>;
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<RelationshipRecord>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read records {}", self.path.display()))?;
        decode_records(&data)
            .with_context(|| format!("failed to decode records {}", self.path.display()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoSource;

impl RecordSource for DemoSource {
    fn describe(&self) -> String {
        "demo".to_string()
    }

    fn fetch(&self) -> Result<Vec<RelationshipRecord>> {
        Ok(demo_records())
    }
}
