use super::{Ctx, render};
use crate::Result;
use crate::mutate::MutationOutcome;

pub(super) mod batch;
pub(super) mod create;
pub(super) mod delete;
pub(super) mod init;
pub(super) mod move_;
pub(super) mod rename;
pub(super) mod show;
pub(super) mod tree;

/// Print a mutation result with the view's status line.
fn report(ctx: &Ctx, outcome: &MutationOutcome) -> Result<()> {
    let status = ctx.view.status().map_or("done", |status| status.text.as_str());
    ctx.emit(outcome, || render::render_outcome(outcome, status))
}
