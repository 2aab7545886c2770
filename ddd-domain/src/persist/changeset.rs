//! 变更集（Changeset）
//!
//! 一次命令执行产生的全部待提交内容：变更后的聚合、加载时的版本与待发布事件。
//! 存储层在同一提交中写入聚合与事件，事件只在提交成功后进入投递流程。
//!
use crate::aggregate::Aggregate;
use crate::value_object::Version;

#[derive(Debug, Clone)]
pub struct Changeset<A>
where
    A: Aggregate,
{
    aggregate: A,
    expected_version: Version,
    events: Vec<A::Event>,
}

impl<A> Changeset<A>
where
    A: Aggregate,
{
    /// 以聚合当前版本作为提交时的期望版本
    pub fn new(aggregate: A) -> Self {
        let expected_version = aggregate.version();
        Self {
            aggregate,
            expected_version,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: A::Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn aggregate(&self) -> &A {
        &self.aggregate
    }

    pub fn expected_version(&self) -> Version {
        self.expected_version
    }

    pub fn into_parts(self) -> (A, Version, Vec<A::Event>) {
        (self.aggregate, self.expected_version, self.events)
    }
}
