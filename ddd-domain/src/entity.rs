//! 实体（Entity）基础抽象
//!
//! 为实体提供统一的标识（Id）与版本（乐观锁）能力。
//! 通常通过 `#[entity]` 宏自动实现。
//!
use crate::value_object::Version;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// 具备唯一标识与版本的实体抽象
pub trait Entity: Send + Sync {
    /// 实体标识类型：创建后不可变，可作为存储主键
    type Id: Clone + Eq + Hash + Display + Debug + Send + Sync + 'static;

    /// 使用给定标识与版本创建实体，其余字段取默认值
    fn new(id: Self::Id, version: Version) -> Self;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;

    /// 获取当前版本（用于乐观锁与并发控制）
    fn version(&self) -> Version;

    /// 由存储层在提交成功后推进版本，业务代码不应调用
    fn set_version(&mut self, version: Version);
}

#[cfg(test)]
mod tests {
    use super::Entity;
    use crate::value_object::Version;
    use ddd_macros::entity;

    #[entity(id = i64)]
    #[derive(Clone, PartialEq)]
    struct Ticket {
        title: String,
    }

    #[entity]
    #[derive(Clone)]
    struct Note {
        body: String,
        // 已声明的 id 字段会被复用并移至最前
        id: String,
    }

    #[test]
    fn entity_macro_adds_identity_and_version() {
        let mut t = Ticket::new(7, Version::new());
        assert_eq!(*t.id(), 7);
        assert!(t.version().is_new());
        assert_eq!(t.title, "");

        t.set_version(Version::from_value(3));
        assert_eq!(t.version().value(), 3);
    }

    #[test]
    fn entity_macro_reuses_declared_id_field() {
        let n = Note::new("n-1".to_string(), Version::from_value(2));
        assert_eq!(n.id(), "n-1");
        assert_eq!(n.version(), Version::from_value(2));
        assert!(n.body.is_empty());
    }

    #[test]
    fn entity_macro_derives_serde() {
        let t = Ticket {
            title: "printer jam".into(),
            ..Ticket::new(1, Version::from_value(1))
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["version"], 1);
        assert_eq!(json["title"], "printer jam");

        let back: Ticket = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
