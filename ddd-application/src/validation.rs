//! 校验（Validation）
//!
//! 在命令进入处理器之前执行的校验阶段。校验失败时直接返回
//! `AppError::Validation`，内层处理器不会被调用。
//!
use crate::{command::Command, command_handler::CommandHandler, context::AppContext, error::AppError};
use async_trait::async_trait;
use std::fmt;

/// 单条校验失败：字段、消息键与模板参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub key: &'static str,
    pub args: Vec<(&'static str, String)>,
}

impl ValidationFailure {
    pub fn new(field: &'static str, key: &'static str) -> Self {
        Self {
            field,
            key,
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, name: &'static str, value: impl ToString) -> Self {
        self.args.push((name, value.to_string()));
        self
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.key)
    }
}

/// 命令校验器
pub trait Validate<C>: Send + Sync {
    /// 返回全部校验失败，空表示通过
    fn validate(&self, cmd: &C) -> Vec<ValidationFailure>;
}

/// 校验装饰器：先校验，通过后再交给内层处理器
pub struct ValidationBehaviour<H, V> {
    inner: H,
    validator: V,
}

impl<H, V> ValidationBehaviour<H, V> {
    pub fn new(inner: H, validator: V) -> Self {
        Self { inner, validator }
    }
}

#[async_trait]
impl<C, H, V> CommandHandler<C> for ValidationBehaviour<H, V>
where
    C: Command,
    H: CommandHandler<C>,
    V: Validate<C>,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        let failures = self.validator.validate(&cmd);
        if !failures.is_empty() {
            tracing::debug!(command = C::NAME, failures = failures.len(), "command rejected");
            return Err(AppError::Validation(failures));
        }
        self.inner.handle(ctx, cmd).await
    }
}
