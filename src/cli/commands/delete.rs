use std::io::Write;

use async_trait::async_trait;

use super::super::{Ctx, DeleteArgs};
use super::report;
use crate::Result;
use crate::mutate::{AlwaysConfirm, Confirm, DeletePrompt};

/// Asks on stderr and reads the answer from stdin. Anything but yes declines.
struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &DeletePrompt) -> bool {
        let question = format!("{prompt} [y/N] ");
        match tokio::task::spawn_blocking(move || ask(&question)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(err)) => {
                tracing::warn!("failed to read confirmation: {err}");
                false
            }
            Err(err) => {
                tracing::warn!("confirmation prompt aborted: {err}");
                false
            }
        }
    }
}

fn ask(question: &str) -> std::io::Result<bool> {
    let mut stderr = std::io::stderr().lock();
    write!(stderr, "{question}")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "o" | "oui"
    )
}

pub(crate) async fn handle(ctx: &mut Ctx, args: DeleteArgs) -> Result<()> {
    let confirm: &dyn Confirm = if args.yes {
        &AlwaysConfirm
    } else {
        &StdinConfirm
    };
    let outcome = ctx.view.delete(args.id, confirm).await?;
    report(ctx, &outcome)
}
