use crate::{command::Command, context::AppContext, error::AppError};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError>;
}

#[async_trait]
impl<C, H> CommandHandler<C> for Arc<H>
where
    C: Command,
    H: CommandHandler<C> + ?Sized,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        (**self).handle(ctx, cmd).await
    }
}
