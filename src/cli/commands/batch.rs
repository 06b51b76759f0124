use super::super::{BatchArgs, Ctx, render};
use crate::Result;

pub(crate) async fn handle(ctx: &mut Ctx, args: BatchArgs) -> Result<()> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
            .await
            .map_err(std::io::Error::other)??,
    };

    let report = ctx.view.batch_create(&text, args.parent).await?;
    ctx.emit(&report, || render::render_batch(&report))?;
    match report.failed {
        // Partial success still exits non-zero.
        Some(failure) => Err(failure.error.into()),
        None => Ok(()),
    }
}
