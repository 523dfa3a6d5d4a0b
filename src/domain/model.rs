use serde::{Deserialize, Serialize};

/// One input row, cells in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub values: Vec<String>,
}

impl Record {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactStats {
    pub rows: usize,
    pub compacted: usize,
    pub skipped: usize,
    pub empty: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub stats: CompactStats,
}
