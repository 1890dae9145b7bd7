use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

pub const DEFAULT_COLUMNS: [&str; 3] = ["Went well", "To improve", "Action items"];
pub const DEFAULT_CARD_COLOR: &str = "#fff59d";

#[derive(Parser)]
#[command(name = "retro")]
#[command(about = "A shared retrospective board", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
pub struct Cli {
    /// Directory holding board files (or set RETRO_DATA_DIR env var)
    #[arg(long, global = true, value_name = "DIR", env = "RETRO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of the per-user one
    #[arg(long, global = true, value_name = "FILE", env = "RETRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Voter and card owner id
    #[arg(long, global = true, env = "RETRO_USER", default_value = "anonymous")]
    pub user: String,

    /// Display name recorded on new cards (defaults to the user id)
    #[arg(long, global = true, env = "RETRO_USER_NAME")]
    pub user_name: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Board operations
    Board(BoardCommand),
    /// Template configuration
    Template(TemplateCommand),
    /// Card operations
    Card(CardCommand),
    /// Follow a board and print every snapshot that arrives
    Watch(WatchArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Create a new board from a template
    Create(BoardCreateArgs),
    /// Get the full board snapshot
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Archive a board
    Archive {
        #[arg(long)]
        id: Uuid,
    },
    /// Show the board as the current user may see it
    View {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args)]
pub struct BoardCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "default")]
    pub team: String,
    /// Column names, in display order
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
    #[arg(long)]
    pub max_votes_per_card: Option<u32>,
    #[arg(long)]
    pub max_votes_per_user: Option<u32>,
    #[arg(long)]
    pub hide_author: bool,
    #[arg(long)]
    pub hide_cards_initially: bool,
    #[arg(long)]
    pub hide_vote_reactions: bool,
}

// Template commands
#[derive(Args)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub action: TemplateAction,
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Change columns, vote limits, visibility or the countdown
    Update(TemplateUpdateArgs),
}

#[derive(Args)]
pub struct TemplateUpdateArgs {
    #[arg(long)]
    pub board_id: Uuid,
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
    #[arg(long)]
    pub max_votes_per_card: Option<u32>,
    #[arg(long)]
    pub max_votes_per_user: Option<u32>,
    #[arg(long)]
    pub hide_author: Option<bool>,
    #[arg(long)]
    pub hide_cards_initially: Option<bool>,
    #[arg(long)]
    pub hide_vote_reactions: Option<bool>,
    /// Start a countdown ending this many seconds from now
    #[arg(long, conflicts_with = "stop_timer")]
    pub timer_seconds: Option<u32>,
    /// Stop the running countdown
    #[arg(long)]
    pub stop_timer: bool,
}

// Card commands
#[derive(Args)]
pub struct CardCommand {
    #[command(subcommand)]
    pub action: CardAction,
}

#[derive(Subcommand)]
pub enum CardAction {
    /// Add a card at the end of a column
    Add {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        column: String,
        #[arg(long)]
        text: String,
        #[arg(long, default_value = DEFAULT_CARD_COLOR)]
        color: String,
    },
    /// Replace a card's text
    Edit {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        text: String,
    },
    /// Delete a card
    Delete {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
    },
    /// Move a card to a final index or a drop slot, optionally in another column
    Move {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        column: String,
        /// Index of the card after the move
        #[arg(long, required_unless_present = "slot", conflicts_with = "slot")]
        index: Option<usize>,
        /// Drop position counted before the card is lifted
        #[arg(long)]
        slot: Option<usize>,
    },
    /// Vote for a card
    Vote {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
    },
    /// Take back one vote from a card
    Unvote {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
    },
    /// Merge the origin card into the target card
    Merge(CardMergeArgs),
}

#[derive(Args)]
pub struct CardMergeArgs {
    #[arg(long)]
    pub board_id: Uuid,
    /// Card that disappears
    #[arg(long)]
    pub origin: Uuid,
    /// Card that receives the text and votes
    #[arg(long)]
    pub target: Uuid,
    /// Execute the merge instead of only showing the proposal
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Args)]
pub struct WatchArgs {
    #[arg(long)]
    pub board_id: Uuid,
    /// Stop after this many snapshots
    #[arg(long)]
    pub count: Option<usize>,
}
