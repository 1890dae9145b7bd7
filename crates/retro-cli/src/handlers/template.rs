use crate::cli::{TemplateAction, TemplateUpdateArgs};
use crate::context::CliContext;
use crate::output;
use chrono::{Duration, Utc};
use retro_domain::{ColumnTemplate, FieldUpdate, TemplateUpdate};

pub async fn handle(ctx: &CliContext, action: TemplateAction) -> anyhow::Result<()> {
    match action {
        TemplateAction::Update(args) => {
            let board_id = args.board_id;
            let updates = updates_from_args(args);
            if updates.is_empty() {
                output::output_error("Nothing to update");
            }

            let applied = ctx
                .apply(board_id, |session| session.update_template_config(updates))
                .await?;
            let orphaned: Vec<String> = applied
                .board
                .orphaned_columns()
                .into_iter()
                .map(str::to_string)
                .collect();
            output::output_mutation(
                applied.outcome,
                applied.board.revision,
                Some(serde_json::json!({
                    "template": applied.board.template,
                    "timer": applied.board.timer,
                    "orphaned_columns": orphaned,
                })),
            );
        }
    }
    Ok(())
}

fn updates_from_args(args: TemplateUpdateArgs) -> TemplateUpdate {
    let timer = match (args.timer_seconds, args.stop_timer) {
        (Some(seconds), _) => FieldUpdate::Set(Utc::now() + Duration::seconds(i64::from(seconds))),
        (None, true) => FieldUpdate::Clear,
        (None, false) => FieldUpdate::NoChange,
    };

    TemplateUpdate {
        columns: args.columns.map(ColumnTemplate::from_names),
        max_votes_per_card: args.max_votes_per_card,
        max_votes_per_user: args.max_votes_per_user,
        hide_author: args.hide_author,
        hide_cards_initially: args.hide_cards_initially,
        hide_vote_reactions: args.hide_vote_reactions,
        timer,
    }
}
