use super::super::{CreateArgs, Ctx};
use super::report;
use crate::Result;
use crate::core::{LocaleNames, NewCategory};

pub(crate) async fn handle(ctx: &mut Ctx, args: CreateArgs) -> Result<()> {
    let category = NewCategory {
        nom: args.name,
        parent_id: args.parent,
        description: args.description,
        locales: LocaleNames {
            nom_ar: args.nom_ar,
            nom_en: args.nom_en,
            nom_zh: args.nom_zh,
        },
    };
    let outcome = ctx.view.create_with(category).await?;
    report(ctx, &outcome)
}
