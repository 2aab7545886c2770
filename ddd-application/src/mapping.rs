//! 字段映射（MapOnto）
//!
//! 以静态类型的赋值函数替代运行时反射映射：实现方只拷贝允许修改的字段，
//! 其余字段（标识、版本、审计字段等）保持不变。

/// 把 `self` 中允许修改的字段复制到目标对象上
pub trait MapOnto<T> {
    fn map_onto(&self, target: &mut T);

    /// 按值版本，便于链式调用
    fn mapped_onto(&self, mut target: T) -> T {
        self.map_onto(&mut target);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Profile {
        id: u32,
        nickname: String,
        bio: Option<String>,
    }

    struct Rename {
        nickname: String,
    }

    impl MapOnto<Profile> for Rename {
        fn map_onto(&self, target: &mut Profile) {
            target.nickname = self.nickname.clone();
        }
    }

    #[test]
    fn only_permitted_fields_are_copied() {
        let before = Profile {
            id: 1,
            nickname: "old".into(),
            bio: Some("kept".into()),
        };
        let after = Rename {
            nickname: "new".into(),
        }
        .mapped_onto(before.clone());

        assert_eq!(after.id, before.id);
        assert_eq!(after.bio, before.bio);
        assert_eq!(after.nickname, "new");
    }
}
