use serde::Serialize;

use super::super::{Ctx, ShowArgs, render};
use crate::Result;
use crate::core::{CategoryId, CategoryRecord};
use crate::mutate::MutationError;
use crate::tree::{Forest, TreeNode};

#[derive(Debug, Serialize)]
struct ChildRef<'a> {
    id: CategoryId,
    nom: &'a str,
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    record: &'a CategoryRecord,
    path: Vec<String>,
    children: Vec<ChildRef<'a>>,
    descendants: usize,
    protected: bool,
}

pub(crate) fn handle(ctx: &Ctx, args: ShowArgs) -> Result<()> {
    let forest = ctx.view.forest();
    let node = forest
        .find(args.id)
        .ok_or(MutationError::NotFound(args.id))?;

    let output = ShowOutput {
        record: &node.record,
        path: path_to(forest, args.id),
        children: node
            .children
            .iter()
            .map(|child| ChildRef {
                id: child.id(),
                nom: child.name(),
            })
            .collect(),
        descendants: node.descendant_count(),
        protected: ctx.view.mutator().policy().is_protected(&node.record),
    };

    ctx.emit(&output, || {
        let children: Vec<(CategoryId, String)> = output
            .children
            .iter()
            .map(|child| (child.id, child.nom.to_string()))
            .collect();
        render::render_record(
            output.record,
            &output.path,
            &children,
            output.descendants,
            output.protected,
        )
    })
}

/// Names from the root down to `id`, inclusive.
fn path_to(forest: &Forest, id: CategoryId) -> Vec<String> {
    let mut path: Vec<String> = Vec::new();
    let mut stack: Vec<(&TreeNode, usize)> = forest.roots().iter().rev().map(|node| (node, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(node.name().to_string());
        if node.id() == id {
            return path;
        }
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    Vec::new()
}
