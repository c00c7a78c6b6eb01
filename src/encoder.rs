use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::debug;

use crate::config::{EncoderConfig, SourceFormat};
use crate::error::{Error, Result};
use crate::tokenizer::{PatternTokenizer, Tokenize};
use crate::vectors::{Component, EmbeddingTable, ExtendedEmbeddingTable};

/// Fit/transform encoder turning raw documents into fixed-length index
/// sequences against a pretrained vocabulary.
///
/// [`SequenceEncoder::fit`] loads the embedding table from the configured
/// source and binds it; [`SequenceEncoder::transform`] then encodes any
/// number of documents against the bound vocabulary. The encoder never
/// mutates its table after `fit`, so a fitted encoder can be shared
/// read-only across concurrent `transform` calls.
pub struct SequenceEncoder<T = f64, A = PatternTokenizer> {
    source: PathBuf,
    config: EncoderConfig,
    analyzer: A,
    vectors: Option<EmbeddingTable<T>>,
}

impl<T: Component> SequenceEncoder<T, PatternTokenizer> {
    /// Encoder over `source` with the default pattern tokenizer.
    pub fn new(source: impl AsRef<Path>, config: EncoderConfig) -> Self {
        Self::with_analyzer(source, config, PatternTokenizer::default())
    }
}

impl<T: Component, A: Tokenize> SequenceEncoder<T, A> {
    /// Encoder over `source` using a caller-supplied analyzer in place of
    /// the default tokenizer.
    pub fn with_analyzer(source: impl AsRef<Path>, config: EncoderConfig, analyzer: A) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            config,
            analyzer,
            vectors: None,
        }
    }

    /// Load the embedding table from the configured source and bind it as
    /// this encoder's vocabulary.
    pub fn fit(&mut self) -> Result<()> {
        let table = match self.config.format {
            SourceFormat::Stanford => EmbeddingTable::from_path(&self.source)?,
        };
        debug!(vectors = table.no_vectors(), "bound vocabulary");
        self.vectors = Some(table);
        Ok(())
    }

    /// The bound embedding table, if `fit` has run.
    pub fn vectors(&self) -> Option<&EmbeddingTable<T>> {
        self.vectors.as_ref()
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Lazily encode `documents`, yielding one fixed-length index sequence
    /// per document in input order.
    ///
    /// Fails with [`Error::UnboundVocabulary`] unless [`SequenceEncoder::fit`]
    /// has bound a table. The returned iterator is finite and single-pass;
    /// call `transform` again for a fresh pass.
    pub fn transform<'a, I>(&'a self, documents: I) -> Result<Sequences<'a, T, A, I::IntoIter>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let vectors = self.vectors.as_ref().ok_or(Error::UnboundVocabulary)?;
        Ok(Sequences {
            vectors,
            analyzer: &self.analyzer,
            max_document_length: self.config.max_document_length,
            allow_oov: self.config.allow_oov,
            documents: documents.into_iter(),
        })
    }

    /// Fit on the configured source, then transform `documents`.
    pub fn fit_transform<'a, I>(
        &'a mut self,
        documents: I,
    ) -> Result<Sequences<'a, T, A, I::IntoIter>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.fit()?;
        self.transform(documents)
    }

    /// The bound table extended with sentinel rows under the configured
    /// OOV policy, materialized as a dense matrix for the downstream
    /// consumer of the encoded sequences.
    pub fn extended_matrix<R: Rng>(&self, rng: &mut R) -> Result<Vec<Vec<T>>> {
        let vectors = self.vectors.as_ref().ok_or(Error::UnboundVocabulary)?;
        let extended = ExtendedEmbeddingTable::materialize(vectors, self.config.allow_oov, rng);
        Ok(extended.to_matrix())
    }
}

/// Lazy sequence of encoded documents produced by
/// [`SequenceEncoder::transform`].
pub struct Sequences<'a, T, A, I> {
    vectors: &'a EmbeddingTable<T>,
    analyzer: &'a A,
    max_document_length: usize,
    allow_oov: bool,
    documents: I,
}

impl<'a, T, A, I> Iterator for Sequences<'a, T, A, I>
where
    T: Component,
    A: Tokenize,
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.documents.next()?;
        let padding = self.vectors.padding_id(self.allow_oov);
        let mut ids = vec![padding; self.max_document_length];
        let mut cursor = 0;
        for token in self.analyzer.tokenize(document.as_ref()) {
            if cursor >= self.max_document_length {
                break;
            }
            if let Some(id) = self.vectors.word_id(token, self.allow_oov) {
                ids[cursor] = id;
                cursor += 1;
            }
        }
        Some(ids)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}
