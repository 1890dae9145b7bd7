use crate::cli::{CardAction, CardMergeArgs};
use crate::context::{Applied, CliContext};
use crate::output;
use retro_core::RetroError;
use retro_domain::CardId;

pub async fn handle(ctx: &CliContext, action: CardAction) -> anyhow::Result<()> {
    match action {
        CardAction::Add {
            board_id,
            column,
            text,
            color,
        } => {
            let mut card_id = None;
            let applied = ctx
                .apply(board_id, |session| {
                    let card = session.new_card(column, text, color);
                    card_id = Some(card.id);
                    session.add_card(card)
                })
                .await?;
            report_card(applied, card_id);
        }
        CardAction::Edit { board_id, id, text } => {
            let applied = ctx
                .apply(board_id, |session| session.edit_text(id, text))
                .await?;
            report_card(applied, Some(id));
        }
        CardAction::Delete { board_id, id } => {
            let applied = ctx
                .apply(board_id, |session| session.delete_card(id))
                .await?;
            report(
                applied,
                Some(serde_json::json!({ "deleted": id.to_string() })),
            );
        }
        CardAction::Move {
            board_id,
            id,
            column,
            index,
            slot,
        } => {
            let applied = ctx
                .apply(board_id, |session| match (index, slot) {
                    (Some(index), _) => session.reorder(id, column, index),
                    (None, Some(slot)) => session.drop_card(id, column, slot),
                    (None, None) => Err(RetroError::Validation(
                        "Either --index or --slot is required".to_string(),
                    )),
                })
                .await?;
            report_card(applied, Some(id));
        }
        CardAction::Vote { board_id, id } => {
            let applied = ctx
                .apply(board_id, |session| session.favorite(id))
                .await?;
            report_card(applied, Some(id));
        }
        CardAction::Unvote { board_id, id } => {
            let applied = ctx
                .apply(board_id, |session| session.unfavorite(id))
                .await?;
            report_card(applied, Some(id));
        }
        CardAction::Merge(args) => handle_merge(ctx, args).await?,
    }
    Ok(())
}

/// Without `--confirm` only the proposal is shown; nothing is written.
async fn handle_merge(ctx: &CliContext, args: CardMergeArgs) -> anyhow::Result<()> {
    if !args.confirm {
        let mut session = ctx.open(args.board_id).await?;
        let proposal = session.propose_merge(args.origin, args.target);
        session.shutdown().await?;
        output::output_success(serde_json::json!({
            "proposal": proposal?,
            "confirmed": false,
        }));
        return Ok(());
    }

    let applied = ctx
        .apply(args.board_id, |session| {
            session.propose_merge(args.origin, args.target)?;
            session.confirm_merge()
        })
        .await?;
    report_card(applied, Some(args.target));
    Ok(())
}

fn report_card(applied: Applied, card_id: Option<CardId>) {
    let card = card_id
        .and_then(|id| applied.board.card(id))
        .and_then(|card| serde_json::to_value(card).ok());
    report(applied, card);
}

fn report(applied: Applied, result: Option<serde_json::Value>) {
    output::output_mutation(applied.outcome, applied.board.revision, result);
}
