use crate::cli::{BoardAction, BoardCreateArgs, DEFAULT_COLUMNS};
use crate::context::CliContext;
use crate::output;
use retro_domain::{BoardView, ColumnTemplate, Template};

pub async fn handle(ctx: &CliContext, action: BoardAction) -> anyhow::Result<()> {
    match action {
        BoardAction::Create(args) => {
            let (name, team, template) = template_from_args(args);
            let board = ctx.create_board(&name, &team, template).await?;
            output::output_success(&board);
        }
        BoardAction::Get { id } => match ctx.get_board(id).await? {
            Some(board) => output::output_success(&board),
            None => output::output_error(&format!("Board not found: {}", id)),
        },
        BoardAction::Archive { id } => {
            let applied = ctx.apply(id, |session| session.archive()).await?;
            let status = applied.board.status;
            output::output_mutation(
                applied.outcome,
                applied.board.revision,
                Some(serde_json::json!({ "id": id.to_string(), "status": status })),
            );
        }
        BoardAction::View { id } => match ctx.get_board(id).await? {
            Some(board) => output::output_success(BoardView::for_viewer(&board, &ctx.user().id)),
            None => output::output_error(&format!("Board not found: {}", id)),
        },
    }
    Ok(())
}

fn template_from_args(args: BoardCreateArgs) -> (String, String, Template) {
    let names = args
        .columns
        .unwrap_or_else(|| DEFAULT_COLUMNS.iter().map(|name| name.to_string()).collect());

    let mut template = Template::new(ColumnTemplate::from_names(names));
    if let Some(per_card) = args.max_votes_per_card {
        template.max_votes_per_card = per_card;
    }
    if let Some(per_user) = args.max_votes_per_user {
        template.max_votes_per_user = per_user;
    }
    template.hide_author = args.hide_author;
    template.hide_cards_initially = args.hide_cards_initially;
    template.hide_vote_reactions = args.hide_vote_reactions;

    (args.name, args.team, template)
}
