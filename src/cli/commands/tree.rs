use super::super::{Ctx, TreeArgs, render};
use crate::Result;

pub(crate) fn handle(ctx: &mut Ctx, args: TreeArgs) -> Result<()> {
    ctx.view.set_search(args.query.join(" "));
    if args.collapse_all {
        ctx.view.collapse_all();
    }
    for id in args.collapse {
        if !ctx.view.forest().contains(id) {
            tracing::warn!(category = %id, "cannot collapse unknown category");
        }
        ctx.view.set_expanded(id, false);
    }

    let rows = ctx.view.rows();
    ctx.emit(&rows, || render::render_tree(&rows))
}
