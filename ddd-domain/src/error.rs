//! 领域层统一错误定义
//!
//! 聚焦仓储/持久化、并发控制、取消与事件系统等最小必要集合，
//! 便于在应用层统一转换为更粗粒度的错误分类。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 事件系统 ---
    #[error("event bus error: {reason}")]
    EventBus { reason: String },
    #[error("event handler error: handler={handler}, reason={reason}")]
    EventHandler { handler: String, reason: String },

    // --- 仓储/持久化 ---
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error(
        "version conflict: type={aggregate_type}, id={aggregate_id}, expected={expected}, actual={actual}"
    )]
    VersionConflict {
        aggregate_type: &'static str,
        aggregate_id: String,
        expected: usize,
        actual: usize,
    },
    #[error("not found: type={aggregate_type}, id={aggregate_id}")]
    NotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    // --- 领域规则 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },

    // --- 运行时 ---
    #[error("operation cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn repository(reason: impl Into<String>) -> Self {
        Self::Repository {
            reason: reason.into(),
        }
    }

    pub fn event_bus(reason: impl Into<String>) -> Self {
        Self::EventBus {
            reason: reason.into(),
        }
    }

    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }

    /// 是否为取消导致的失败（需与业务失败区分）
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
