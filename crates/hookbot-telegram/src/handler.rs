//! The seam between update delivery and the bots.

use async_trait::async_trait;

use crate::error::Result;
use crate::update::Inbound;

/// A bot: consumes one inbound event and sends at most a few replies.
///
/// Errors are returned to the delivery layer, which logs them and moves on;
/// no error from one chat affects another.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    /// Short bot name for logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Handles one event.
    async fn handle(&self, inbound: Inbound) -> Result<()>;
}
