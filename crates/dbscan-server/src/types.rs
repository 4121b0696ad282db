use serde::{Deserialize, Serialize};

/// Query string of `GET /metadata`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataQuery {
    pub table_name: Option<String>,
}

impl MetadataQuery {
    /// Build from decoded query pairs. A repeated `table_name` keeps its first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            table_name: pairs
                .into_iter()
                .find(|(key, _)| key == "table_name")
                .map(|(_, value)| value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
