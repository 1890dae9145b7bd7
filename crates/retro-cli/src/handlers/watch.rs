use crate::cli::WatchArgs;
use crate::context::CliContext;
use crate::output;
use retro_domain::BoardView;
use retro_session::{RemoteOutcome, SessionEvent};

/// Print the viewer's projection of every remote snapshot, one JSON line each
pub async fn handle(ctx: &CliContext, args: WatchArgs) -> anyhow::Result<()> {
    ctx.gateway().watch().await?;
    let mut session = ctx.open(args.board_id).await?;
    let viewer = ctx.user().id.clone();
    let mut seen = 0;

    while args.count.map_or(true, |limit| seen < limit) {
        let event = tokio::select! {
            event = session.next_event() => event?,
            _ = tokio::signal::ctrl_c() => break,
        };

        match event {
            SessionEvent::Remote(RemoteOutcome::Replaced { .. } | RemoteOutcome::Replayed { .. }) => {
                if let Some(board) = session.board() {
                    output::output_success(BoardView::for_viewer(board, &viewer));
                    seen += 1;
                }
            }
            SessionEvent::Disconnected => break,
            other => tracing::debug!("Watch ignored {:?}", other),
        }
    }

    session.shutdown().await?;
    ctx.gateway().unwatch().await?;
    Ok(())
}
