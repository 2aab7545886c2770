//! 本地化（Localization）
//!
//! 错误与提示文案通过消息键获取，模板中的 `{name}` 占位符由参数替换。
//! 未登记的键原样返回，保证调用方总能得到可展示的文本。
//!
use std::collections::HashMap;

pub trait Localizer: Send + Sync {
    /// 按键取得本地化文本，未登记时返回键本身
    fn localize(&self, key: &str) -> String;

    /// 取得模板并替换 `{name}` 占位符
    fn format(&self, key: &str, args: &[(&str, String)]) -> String {
        args.iter()
            .fold(self.localize(key), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

/// 基于内存表的消息目录
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置英文文案
    pub fn english() -> Self {
        Self::new()
            .with("error.not_found", "{entity} with id: [{id}] not found.")
            .with(
                "error.conflict",
                "{entity} with id: [{id}] was modified by another request.",
            )
            .with("error.persistence", "The change could not be saved.")
            .with("error.cancelled", "The request was cancelled.")
            .with("error.validation", "One or more validation errors occurred.")
            .with("error.domain", "The request violates a business rule.")
            .with("error.handler_not_found", "No handler is registered for {name}.")
            .with(
                "error.already_registered",
                "A handler is already registered for {name}.",
            )
            .with("error.type_mismatch", "An internal error occurred.")
            .with("validation.required", "'{field}' is required.")
            .with(
                "validation.max_length",
                "'{field}' must not exceed {max} characters.",
            )
    }

    /// 追加或覆盖一条文案
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }
}

impl Localizer for MessageCatalog {
    fn localize(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
