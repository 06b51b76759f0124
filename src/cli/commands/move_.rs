use super::super::{Ctx, MoveArgs};
use super::report;
use crate::Result;

pub(crate) async fn handle(ctx: &mut Ctx, args: MoveArgs) -> Result<()> {
    // clap guarantees exactly one of --parent / --root.
    let parent = if args.root { None } else { args.parent };
    let outcome = ctx.view.reparent(args.id, parent).await?;
    report(ctx, &outcome)
}
