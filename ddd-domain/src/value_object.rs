//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值。
//!
use std::fmt;

use ddd_macros::value_object;

/// 实体版本号（乐观锁令牌）
///
/// `0` 表示尚未持久化；每次提交成功后由存储层推进一位。
///
/// ```
/// use ddd_domain::value_object::Version;
///
/// let loaded = Version::from_value(4);
/// assert_eq!(loaded.next().value(), 5);
/// assert!(Version::new().is_new());
/// ```
#[value_object]
#[derive(Copy, PartialOrd, Ord, Hash)]
pub struct Version(usize);

impl Version {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_value(value: usize) -> Self {
        Self(value)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn value(&self) -> usize {
        self.0
    }

    /// 是否为未持久化的初始版本
    pub fn is_new(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<usize> for Version {
    fn from(value: usize) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_version_is_unpersisted() {
        let v = Version::default();
        assert_eq!(v, Version::new());
        assert!(v.is_new());
        assert!(!v.next().is_new());
    }

    #[test]
    fn versions_order_by_value() {
        let loaded = Version::from(2);
        let committed = loaded.next();
        assert!(committed > loaded);
        assert_eq!(committed, Version::from_value(3));
        assert_eq!(committed.to_string(), "v3");
    }

    // 版本以裸数字序列化，保持事件与快照载荷紧凑
    #[test]
    fn version_serializes_as_number() {
        let json = serde_json::to_string(&Version::from_value(42)).unwrap();
        assert_eq!(json, "42");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value(), 42);
    }
}
