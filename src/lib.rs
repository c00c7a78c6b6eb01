pub mod config;
pub mod encoder;
pub mod error;
pub mod rng;
pub mod tokenizer;
pub mod vectors;

pub use config::{EncoderConfig, SourceFormat};
pub use encoder::{SequenceEncoder, Sequences};
pub use error::{Error, Result};
pub use tokenizer::{PatternTokenizer, Tokenize};
pub use vectors::{Component, EmbeddingTable, ExtendedEmbeddingTable};
