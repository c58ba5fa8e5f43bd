mod command;
mod extract;
pub mod parse;

pub use command::Git;
pub use extract::CommitExtractor;
