use super::super::{Ctx, RenameArgs};
use super::report;
use crate::Result;

pub(crate) async fn handle(ctx: &mut Ctx, args: RenameArgs) -> Result<()> {
    let outcome = ctx.view.rename(args.id, &args.name).await?;
    report(ctx, &outcome)
}
