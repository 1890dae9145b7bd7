pub mod board;
pub mod card;
pub mod template;
pub mod watch;
