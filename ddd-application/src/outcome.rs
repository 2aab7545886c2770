//! 调用结果（Outcome）
//!
//! 面向调用方的统一结果：成功携带数据，失败携带分类与（已本地化的）错误消息。
//! 序列化形态：`{ "succeeded": bool, "data": T | null, "errors": [string] }`，失败时追加 `"kind"`。
//!
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// 失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Conflict,
    Validation,
    Persistence,
    Cancelled,
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success { data: T },
    Failure {
        kind: FailureKind,
        errors: Vec<String>,
    },
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Outcome::Success { data }
    }

    pub fn failure(kind: FailureKind, errors: Vec<String>) -> Self {
        Outcome::Failure { kind, errors }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success { data } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Outcome::Success { .. } => &[],
            Outcome::Failure { errors, .. } => errors,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Success { data } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success { data } => Outcome::Success { data: f(data) },
            Outcome::Failure { kind, errors } => Outcome::Failure { kind, errors },
        }
    }
}

impl<T> Serialize for Outcome<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Outcome::Success { data } => {
                let mut s = serializer.serialize_struct("Outcome", 3)?;
                s.serialize_field("succeeded", &true)?;
                s.serialize_field("data", data)?;
                s.serialize_field("errors", &[] as &[String])?;
                s.end()
            }
            Outcome::Failure { kind, errors } => {
                let mut s = serializer.serialize_struct("Outcome", 4)?;
                s.serialize_field("succeeded", &false)?;
                s.serialize_field("data", &None::<&T>)?;
                s.serialize_field("errors", errors)?;
                s.serialize_field("kind", kind)?;
                s.end()
            }
        }
    }
}
