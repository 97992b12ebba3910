pub mod dictionary;
pub mod error;
pub mod session;
pub mod trie;
pub mod util;

pub use dictionary::Dictionary;
pub use error::{IndexError, Result};
pub use trie::{Completion, PrefixIndex};
