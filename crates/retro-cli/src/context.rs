use retro_core::{AppConfig, RetroResult};
use retro_domain::{Board, BoardId, CommandOutcome, Owner, Template};
use retro_persistence::{JsonFileGateway, PersistenceGateway};
use retro_session::{BoardSession, Committed, SessionConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Board after a command ran, with what the command did
pub struct Applied {
    pub board: Board,
    pub outcome: CommandOutcome,
}

pub struct CliContext {
    gateway: Arc<JsonFileGateway>,
    config: AppConfig,
    user: Owner,
}

impl CliContext {
    pub fn new(data_dir: PathBuf, config: AppConfig, user: Owner) -> Self {
        tracing::debug!("Using board directory {}", data_dir.display());
        Self {
            gateway: Arc::new(JsonFileGateway::new(data_dir)),
            config,
            user,
        }
    }

    pub fn gateway(&self) -> &Arc<JsonFileGateway> {
        &self.gateway
    }

    pub fn user(&self) -> &Owner {
        &self.user
    }

    pub async fn create_board(&self, name: &str, team: &str, template: Template) -> RetroResult<Board> {
        let board = Board::from_template(name, team, template)?;
        self.gateway.save(board.id, &board).await?;
        tracing::info!("Created board {} ({})", board.name, board.id);
        Ok(board)
    }

    pub async fn get_board(&self, id: BoardId) -> RetroResult<Option<Board>> {
        self.gateway.get_by_id(id).await
    }

    pub async fn open(&self, id: BoardId) -> RetroResult<BoardSession> {
        let (session, _notifications) = BoardSession::load(
            self.gateway.clone(),
            id,
            self.user.clone(),
            SessionConfig::from_app_config(&self.config),
        )
        .await?;
        Ok(session)
    }

    /// Open a session, run one command, wait for its save and close again.
    pub async fn apply<F>(&self, id: BoardId, command: F) -> RetroResult<Applied>
    where
        F: FnOnce(&mut BoardSession) -> RetroResult<Committed>,
    {
        let mut session = self.open(id).await?;
        let result = command(&mut session);
        let outcome = match result {
            Ok(committed) => committed.saved().await,
            Err(e) => Err(e),
        };
        let board = session.board().cloned();
        session.shutdown().await?;

        let outcome = outcome?;
        let board = board.ok_or_else(|| {
            retro_core::RetroError::Internal(format!("board {} vanished from session", id))
        })?;
        Ok(Applied { board, outcome })
    }
}
