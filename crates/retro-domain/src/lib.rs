pub mod board;
pub mod card;
pub mod column;
pub mod commands;
pub mod field_update;
pub mod template;
pub mod timer;
pub mod visibility;
pub mod vote;

pub use board::{Board, BoardId, BoardStatus};
pub use card::{Card, CardId, Owner, VoterId};
pub use column::{slugify, ColumnKey, ColumnTemplate};
pub use commands::{
    resolve_drop_slot, CardRef, Command, CommandOutcome, Intent, Mutation, MutationEngine,
    RejectReason,
};
pub use field_update::FieldUpdate;
pub use template::{Template, TemplateUpdate};
pub use timer::BoardTimer;
pub use visibility::{BoardView, CardView, ColumnView};
pub use vote::{eligibility, Eligibility, VoteLimit};
