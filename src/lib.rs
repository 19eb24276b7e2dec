pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod lexer;
pub mod normalize;
pub mod store;

pub use config::{IndexPaths, NormalizerConfig, SearchConfig};
pub use engine::SearchEngine;
pub use error::{Result, ScourError};
pub use index::{build_index, IndexSummary};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use normalize::TextNormalizer;
pub use store::DocumentStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
