use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};

/// Scalar type usable as an embedding component.
///
/// Implemented for `f32` and `f64`; the matrix storage width is fixed at
/// compile time by the table's type parameter.
pub trait Component:
    Copy + PartialOrd + FromStr + SampleUniform + Debug + Send + Sync + 'static
{
    const NEG_ONE: Self;
    const ONE: Self;
}

impl Component for f32 {
    const NEG_ONE: Self = -1.0;
    const ONE: Self = 1.0;
}

impl Component for f64 {
    const NEG_ONE: Self = -1.0;
    const ONE: Self = 1.0;
}

/// Word vocabulary plus the dense matrix of pretrained vectors.
///
/// Built once by [`EmbeddingTable::from_path`] and immutable afterwards;
/// row `i` of the matrix holds the vector of the word with vocabulary
/// index `i`, which is the word's zero-based line position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable<T = f64> {
    vocabulary: HashMap<String, usize>,
    data: Vec<T>,
    no_components: usize,
}

impl<T: Component> EmbeddingTable<T> {
    /// Load a table from a line-oriented `word c1 .. cN` file, the format
    /// written by the Stanford GloVe tooling.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            vectors = table.no_vectors(),
            components = table.no_components,
            "loaded embedding table"
        );
        Ok(table)
    }

    /// Load a table from any buffered reader of the same line format.
    ///
    /// Every row must have the dimensionality set by the first line and
    /// every word must be unique; violations fail the whole load with the
    /// offending line number, leaving no partial table behind.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut vocabulary = HashMap::new();
        let mut data: Vec<T> = Vec::new();
        let mut no_components = 0;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.trim_end().split(' ');
            let word = fields.next().unwrap_or("");
            let start = data.len();
            for token in fields {
                let value = token.parse::<T>().map_err(|_| Error::ParseComponent {
                    line: i + 1,
                    token: token.to_string(),
                })?;
                data.push(value);
            }
            let row_len = data.len() - start;
            if i == 0 {
                no_components = row_len;
            } else if row_len != no_components {
                return Err(Error::DimensionMismatch {
                    line: i + 1,
                    expected: no_components,
                    actual: row_len,
                });
            }
            if vocabulary.insert(word.to_string(), i).is_some() {
                return Err(Error::DuplicateWord {
                    line: i + 1,
                    word: word.to_string(),
                });
            }
        }
        if vocabulary.is_empty() {
            return Err(Error::EmptySource);
        }
        Ok(Self {
            vocabulary,
            data,
            no_components,
        })
    }

    /// Number of words (and matrix rows) in the table.
    pub fn no_vectors(&self) -> usize {
        self.vocabulary.len()
    }

    /// Components per vector, inferred from the first line of the source.
    pub fn no_components(&self) -> usize {
        self.no_components
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    /// Vocabulary index for `word`. An unseen word resolves to the OOV
    /// sentinel when `allow_oov` is set and to `None` otherwise.
    pub fn word_id(&self, word: &str, allow_oov: bool) -> Option<usize> {
        match self.vocabulary.get(word) {
            Some(&id) => Some(id),
            None if allow_oov => Some(self.oov_id()),
            None => None,
        }
    }

    /// Vector stored at row `id`, or `None` past the last row.
    pub fn vector(&self, id: usize) -> Option<&[T]> {
        if id >= self.no_vectors() {
            return None;
        }
        let start = id * self.no_components;
        Some(&self.data[start..start + self.no_components])
    }

    /// Vector of an in-vocabulary word, `None` for an unseen one.
    pub fn word_vector(&self, word: &str) -> Option<&[T]> {
        self.vocabulary.get(word).and_then(|&id| self.vector(id))
    }

    /// Sentinel index for out-of-vocabulary tokens, the row right after
    /// the vocabulary range.
    pub fn oov_id(&self) -> usize {
        self.no_vectors()
    }

    /// Sentinel index used to fill sequence slots past the last token.
    ///
    /// With OOV allowed this is the row after the OOV sentinel; with OOV
    /// disallowed no OOV row exists and padding takes the first row past
    /// the vocabulary, so either way the index resolves inside the
    /// extended matrix.
    pub fn padding_id(&self, allow_oov: bool) -> usize {
        if allow_oov {
            self.no_vectors() + 1
        } else {
            self.no_vectors()
        }
    }
}

/// View of an [`EmbeddingTable`] with freshly drawn sentinel rows
/// appended, so every index a sequence can contain resolves to a vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedEmbeddingTable<'a, T = f64> {
    base: &'a EmbeddingTable<T>,
    extra: Vec<T>,
    allow_oov: bool,
}

impl<'a, T: Component> ExtendedEmbeddingTable<'a, T> {
    /// Append sentinel rows to `base`: one padding row when OOV tokens are
    /// dropped, an OOV row followed by a padding row when they are kept.
    /// Each component is drawn uniformly from [-1, 1] using the supplied
    /// random source.
    pub fn materialize<R: Rng>(base: &'a EmbeddingTable<T>, allow_oov: bool, rng: &mut R) -> Self {
        let rows = if allow_oov { 2 } else { 1 };
        let extra = (0..rows * base.no_components())
            .map(|_| rng.gen_range(T::NEG_ONE..=T::ONE))
            .collect();
        Self {
            base,
            extra,
            allow_oov,
        }
    }

    pub fn base(&self) -> &EmbeddingTable<T> {
        self.base
    }

    /// Total rows: the base vocabulary plus the appended sentinels.
    pub fn rows(&self) -> usize {
        self.base.no_vectors() + if self.allow_oov { 2 } else { 1 }
    }

    /// Index of the OOV row, `None` when OOV tokens are dropped.
    pub fn oov_id(&self) -> Option<usize> {
        self.allow_oov.then(|| self.base.oov_id())
    }

    pub fn padding_id(&self) -> usize {
        self.base.padding_id(self.allow_oov)
    }

    /// Vector at row `id`, spanning base rows and the sentinel rows.
    pub fn vector(&self, id: usize) -> Option<&[T]> {
        let base_rows = self.base.no_vectors();
        if id < base_rows {
            return self.base.vector(id);
        }
        let c = self.base.no_components();
        let start = (id - base_rows) * c;
        if start + c <= self.extra.len() && c > 0 {
            Some(&self.extra[start..start + c])
        } else {
            None
        }
    }

    /// The stacked dense matrix, one row per vocabulary word followed by
    /// the sentinel rows, for handoff to a downstream numeric consumer.
    pub fn to_matrix(&self) -> Vec<Vec<T>> {
        let c = self.base.no_components();
        if c == 0 {
            return vec![Vec::new(); self.rows()];
        }
        self.base
            .data
            .chunks(c)
            .chain(self.extra.chunks(c))
            .map(<[T]>::to_vec)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng;
    use std::io::Cursor;

    fn table(src: &str) -> EmbeddingTable<f64> {
        EmbeddingTable::from_reader(Cursor::new(src.as_bytes())).unwrap()
    }

    #[test]
    fn load_builds_vocabulary_and_matrix() {
        let t = table("the 0.1 0.2\ncat 0.3 0.4\n");
        assert_eq!(t.no_vectors(), 2);
        assert_eq!(t.no_components(), 2);
        assert_eq!(t.vocabulary()["the"], 0);
        assert_eq!(t.vocabulary()["cat"], 1);
        assert_eq!(t.vector(0), Some(&[0.1, 0.2][..]));
        assert_eq!(t.vector(1), Some(&[0.3, 0.4][..]));
        assert_eq!(t.vector(2), None);
    }

    #[test]
    fn row_count_matches_vocabulary_size() {
        let t = table("a 1 2 3\nb 4 5 6\nc 7 8 9\n");
        assert_eq!(t.no_vectors(), 3);
        for id in 0..t.no_vectors() {
            assert_eq!(t.vector(id).map(<[f64]>::len), Some(t.no_components()));
        }
    }

    #[test]
    fn loads_f32_components() {
        let t: EmbeddingTable<f32> =
            EmbeddingTable::from_reader(Cursor::new(&b"the 0.5 -0.5\n"[..])).unwrap();
        assert_eq!(t.word_vector("the"), Some(&[0.5f32, -0.5][..]));
    }

    #[test]
    fn loading_twice_is_deterministic() {
        let src = "the 0.1 0.2\ncat 0.3 0.4\n";
        assert_eq!(table(src), table(src));
    }

    #[test]
    fn bad_component_reports_line_and_token() {
        let err = EmbeddingTable::<f64>::from_reader(Cursor::new(
            &b"the 0.1 0.2\ncat 0.3 oops\n"[..],
        ))
        .unwrap_err();
        assert!(
            matches!(&err, Error::ParseComponent { line: 2, token } if token == "oops"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn inconsistent_row_length_is_rejected() {
        let err =
            EmbeddingTable::<f64>::from_reader(Cursor::new(&b"the 0.1 0.2\ncat 0.3\n"[..]))
                .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                line: 2,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn duplicate_word_is_rejected() {
        let err = EmbeddingTable::<f64>::from_reader(Cursor::new(
            &b"the 0.1 0.2\nthe 0.3 0.4\n"[..],
        ))
        .unwrap_err();
        assert!(matches!(&err, Error::DuplicateWord { line: 2, word } if word == "the"));
    }

    #[test]
    fn empty_source_is_rejected() {
        let err = EmbeddingTable::<f64>::from_reader(Cursor::new(&b""[..])).unwrap_err();
        assert!(matches!(err, Error::EmptySource));
    }

    #[test]
    fn word_id_applies_oov_policy() {
        let t = table("the 0.1 0.2\ncat 0.3 0.4\n");
        assert_eq!(t.word_id("cat", false), Some(1));
        assert_eq!(t.word_id("dog", false), None);
        assert_eq!(t.word_id("dog", true), Some(2));
        assert_eq!(t.word_vector("dog"), None);
    }

    #[test]
    fn sentinel_indices_follow_the_vocabulary() {
        let t = table("the 0.1 0.2\ncat 0.3 0.4\n");
        assert_eq!(t.oov_id(), 2);
        assert_eq!(t.padding_id(true), 3);
        assert_eq!(t.padding_id(false), 2);
    }

    #[test]
    fn extended_table_appends_two_rows_when_oov_is_allowed() {
        let t = table("the 0.1 0.2\ncat 0.3 0.4\n");
        let ext = ExtendedEmbeddingTable::materialize(&t, true, &mut rng::seeded(7));
        assert_eq!(ext.rows(), 4);
        assert_eq!(ext.oov_id(), Some(2));
        assert_eq!(ext.padding_id(), 3);
        for id in 0..ext.rows() {
            let row = ext.vector(id).unwrap();
            assert_eq!(row.len(), 2);
        }
        assert!(ext.vector(4).is_none());
        for &x in ext.vector(2).unwrap().iter().chain(ext.vector(3).unwrap()) {
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn extended_table_appends_one_row_when_oov_is_dropped() {
        let t = table("the 0.1 0.2\ncat 0.3 0.4\n");
        let ext = ExtendedEmbeddingTable::materialize(&t, false, &mut rng::seeded(7));
        assert_eq!(ext.rows(), 3);
        assert_eq!(ext.oov_id(), None);
        assert_eq!(ext.padding_id(), 2);
        assert!(ext.vector(2).is_some());
        assert!(ext.vector(3).is_none());
    }

    #[test]
    fn sentinel_rows_are_reproducible_for_a_fixed_seed() {
        let t = table("the 0.1 0.2\ncat 0.3 0.4\n");
        let a = ExtendedEmbeddingTable::materialize(&t, true, &mut rng::seeded(42));
        let b = ExtendedEmbeddingTable::materialize(&t, true, &mut rng::seeded(42));
        assert_eq!(a.to_matrix(), b.to_matrix());
    }

    #[test]
    fn to_matrix_stacks_base_then_sentinel_rows() {
        let t = table("the 0.1 0.2\ncat 0.3 0.4\n");
        let ext = ExtendedEmbeddingTable::materialize(&t, true, &mut rng::seeded(1));
        let m = ext.to_matrix();
        assert_eq!(m.len(), 4);
        assert_eq!(m[0], vec![0.1, 0.2]);
        assert_eq!(m[1], vec![0.3, 0.4]);
        assert_eq!(m[2].as_slice(), ext.vector(2).unwrap());
        assert_eq!(m[3].as_slice(), ext.vector(3).unwrap());
    }
}
