//! Token command implementation

use crate::cache::token_cache_key;
use crate::cli::{CommandContext, GlobalOptions};
use crate::client::{BulletApi, BulletToken};
use crate::error::Result;
use crate::output;

/// Fetch a bullet token, through the shared cache when a session id is given
pub async fn run(opts: &GlobalOptions, session_token: &str, session_id: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let token = fetch(&ctx, session_token, session_id).await?;
    output::print(&token, ctx.format)
}

async fn fetch(
    ctx: &CommandContext,
    session_token: &str,
    session_id: Option<&str>,
) -> Result<BulletToken> {
    let upstream = ctx.upstream()?;

    if ctx.no_cache {
        log::debug!("Cache disabled, calling upstream directly");
        return upstream.fetch_bullet(session_token).await;
    }
    let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
        // No Redis round-trip when there is nothing to key the cache on
        return upstream.fetch_bullet(session_token).await;
    };

    // Reject a bad session id before touching Redis
    token_cache_key(session_id, session_token)?;

    let client = ctx.cached(upstream).await?;
    client.get_token(session_token, Some(session_id)).await
}
