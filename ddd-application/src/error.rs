use crate::outcome::FailureKind;
use crate::validation::ValidationFailure;
use ddd_domain::error::DomainError;

/// 应用层错误
///
/// 由领域错误（`DomainError`）按语义归并而来，并补充调度相关的错误。
/// 对外展示时通过 `message_key/message_args` 交给本地化组件生成文案。
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{entity_type} not found: id={id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("concurrent modification: {entity_type} id={id}, expected={expected}, actual={actual}")]
    Conflict {
        entity_type: &'static str,
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("persistence: {0}")]
    Persistence(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("validation: {}", join_failures(.0))]
    Validation(Vec<ValidationFailure>),

    #[error("domain: {0}")]
    Domain(#[source] DomainError),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("handler already registered: query={query}")]
    AlreadyRegisteredQuery { query: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

fn join_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound {
                aggregate_type,
                aggregate_id,
            } => AppError::NotFound {
                entity_type: aggregate_type,
                id: aggregate_id,
            },
            DomainError::VersionConflict {
                aggregate_type,
                aggregate_id,
                expected,
                actual,
            } => AppError::Conflict {
                entity_type: aggregate_type,
                id: aggregate_id,
                expected,
                actual,
            },
            DomainError::Repository { reason } => AppError::Persistence(reason),
            DomainError::Serde { source } => AppError::Persistence(source.to_string()),
            DomainError::Cancelled => AppError::Cancelled,
            other => AppError::Domain(other),
        }
    }
}

impl AppError {
    /// 对外可见的失败分类
    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::NotFound { .. } => FailureKind::NotFound,
            AppError::Conflict { .. } => FailureKind::Conflict,
            AppError::Persistence(_) => FailureKind::Persistence,
            AppError::Cancelled => FailureKind::Cancelled,
            AppError::Validation(_) => FailureKind::Validation,
            _ => FailureKind::Internal,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }

    /// 本地化消息键
    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "error.not_found",
            AppError::Conflict { .. } => "error.conflict",
            AppError::Persistence(_) => "error.persistence",
            AppError::Cancelled => "error.cancelled",
            AppError::Validation(_) => "error.validation",
            AppError::Domain(_) => "error.domain",
            AppError::HandlerNotFound(_) => "error.handler_not_found",
            AppError::AlreadyRegisteredCommand { .. } | AppError::AlreadyRegisteredQuery { .. } => {
                "error.already_registered"
            }
            AppError::TypeMismatch { .. } => "error.type_mismatch",
        }
    }

    /// 本地化消息模板的占位参数
    pub fn message_args(&self) -> Vec<(&'static str, String)> {
        match self {
            AppError::NotFound { entity_type, id } | AppError::Conflict { entity_type, id, .. } => {
                vec![("entity", entity_type.to_string()), ("id", id.clone())]
            }
            AppError::Persistence(reason) => vec![("reason", reason.clone())],
            AppError::Domain(err) => vec![("reason", err.to_string())],
            AppError::HandlerNotFound(name) => vec![("name", name.to_string())],
            AppError::AlreadyRegisteredCommand { command } => vec![("name", command.to_string())],
            AppError::AlreadyRegisteredQuery { query } => vec![("name", query.to_string())],
            AppError::TypeMismatch { expected, found } => vec![
                ("expected", expected.to_string()),
                ("found", found.to_string()),
            ],
            AppError::Cancelled | AppError::Validation(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_fold_into_application_taxonomy() {
        let err: AppError = DomainError::NotFound {
            aggregate_type: "Customer",
            aggregate_id: "7".into(),
        }
        .into();
        assert!(matches!(err, AppError::NotFound { entity_type: "Customer", ref id } if id == "7"));
        assert_eq!(err.kind(), FailureKind::NotFound);

        let err: AppError = DomainError::VersionConflict {
            aggregate_type: "Customer",
            aggregate_id: "7".into(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert_eq!(err.kind(), FailureKind::Conflict);

        let err: AppError = DomainError::repository("disk full").into();
        assert!(matches!(err, AppError::Persistence(ref r) if r == "disk full"));

        let err: AppError = DomainError::Cancelled.into();
        assert!(err.is_cancelled());
        assert_eq!(err.kind(), FailureKind::Cancelled);

        let err: AppError = DomainError::invalid_value("bad").into();
        assert!(matches!(err, AppError::Domain(DomainError::InvalidValue { .. })));
        assert_eq!(err.kind(), FailureKind::Internal);
    }

    #[test]
    fn not_found_exposes_entity_and_id_arguments() {
        let err = AppError::NotFound {
            entity_type: "Customer",
            id: "42".into(),
        };
        assert_eq!(err.message_key(), "error.not_found");
        assert_eq!(
            err.message_args(),
            vec![("entity", "Customer".to_string()), ("id", "42".to_string())]
        );
        assert_eq!(err.to_string(), "Customer not found: id=42");
    }
}
