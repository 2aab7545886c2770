use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 事件元数据：事件归属的聚合及提交后的聚合版本
#[derive(Builder, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    aggregate_id: String,
    aggregate_type: String,
    aggregate_version: usize,
    committed_at: DateTime<Utc>,
}

impl Metadata {
    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
    }

    pub fn committed_at(&self) -> &DateTime<Utc> {
        &self.committed_at
    }
}
