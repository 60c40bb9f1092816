//! Reference retrieval over a small tone corpus.
//!
//! Each corpus row is a short example line tagged with a tone and an emotion.
//! [`TfIdfRetriever`] vectorises the corpus once (unigrams and bigrams,
//! smoothed idf, L2-normalised) and ranks rows by cosine similarity to the
//! incoming message. The top rows travel with each report as context.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One row of the reference corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Example line.
    pub text: String,
    /// Tone label, e.g. `sarcastic`.
    #[serde(default)]
    pub tone: String,
    /// Emotion label, e.g. `joy`.
    #[serde(default)]
    pub emotion_tag: String,
}

/// Errors raised while loading a corpus.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The corpus file could not be opened.
    #[error("failed to open corpus {path}: {source}")]
    Open {
        /// Corpus path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A row could not be read or lacks a `text` column.
    #[error("malformed corpus: {0}")]
    Csv(#[from] csv::Error),
}

/// Finds corpus examples resembling a message.
pub trait Retriever: Send + Sync {
    /// Most similar records, best first.
    fn retrieve(&self, message: &str) -> Vec<ReferenceRecord>;
}

// ---------------------------------------------------------------------------
// Vectoriser
// ---------------------------------------------------------------------------

/// Lower-cased runs of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_owned)
        .collect()
}

/// Unigrams followed by space-joined bigrams.
pub fn terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let bigrams: Vec<String> = tokens
        .windows(2)
        .map(|pair| pair.join(" "))
        .collect();
    let mut terms = tokens;
    terms.extend(bigrams);
    terms
}

fn as_f64(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

/// Sparse L2-normalised vector keyed by vocabulary index. Ordered so sums
/// are reproducible across runs.
type SparseVector = BTreeMap<usize, f64>;

#[derive(Debug, Default)]
struct TfIdfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfModel {
    fn fit(documents: &[Vec<String>]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for doc in documents {
            let mut seen: HashSet<&String> = HashSet::new();
            for term in doc.iter().filter(|term| seen.insert(*term)) {
                let next = vocabulary.len();
                let index = *vocabulary.entry(term.clone()).or_insert(next);
                if index == doc_freq.len() {
                    doc_freq.push(0);
                }
                if let Some(df) = doc_freq.get_mut(index) {
                    *df = df.saturating_add(1);
                }
            }
        }

        let n = as_f64(documents.len());
        let idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + as_f64(df))).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    fn transform(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for term in terms {
            if let Some(&index) = self.vocabulary.get(term) {
                let count = counts.entry(index).or_insert(0);
                *count = count.saturating_add(1);
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, count)| {
                let idf = self.idf.get(index).copied().unwrap_or(0.0);
                (index, as_f64(count) * idf)
            })
            .collect();

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

fn cosine(query: &SparseVector, doc: &SparseVector) -> f64 {
    query
        .iter()
        .filter_map(|(index, w)| doc.get(index).map(|d| w * d))
        .sum()
}

// ---------------------------------------------------------------------------
// Retriever
// ---------------------------------------------------------------------------

/// TF-IDF cosine-similarity retriever.
#[derive(Debug)]
pub struct TfIdfRetriever {
    records: Vec<ReferenceRecord>,
    vectors: Vec<SparseVector>,
    model: TfIdfModel,
    top_k: usize,
}

impl TfIdfRetriever {
    /// Index `records`, returning at most `top_k` per query.
    pub fn new(records: Vec<ReferenceRecord>, top_k: usize) -> Self {
        let documents: Vec<Vec<String>> = records.iter().map(|r| terms(&r.text)).collect();
        let model = TfIdfModel::fit(&documents);
        let vectors = documents.iter().map(|doc| model.transform(doc)).collect();
        Self {
            records,
            vectors,
            model,
            top_k,
        }
    }

    /// Load a `text,tone,emotion_tag` CSV.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the file is missing or malformed.
    pub fn from_path(path: &Path, top_k: usize) -> Result<Self, RetrievalError> {
        let file = std::fs::File::open(path).map_err(|source| RetrievalError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let retriever = Self::from_reader(file, top_k)?;
        info!(
            path = %path.display(),
            records = retriever.len(),
            vocabulary = retriever.vocabulary_len(),
            "reference corpus loaded"
        );
        Ok(retriever)
    }

    /// Read a corpus from any CSV source.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Csv`] on malformed rows.
    pub fn from_reader<R: Read>(reader: R, top_k: usize) -> Result<Self, RetrievalError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let records: Vec<ReferenceRecord> = rdr.deserialize().collect::<Result<_, _>>()?;
        Ok(Self::new(records, top_k))
    }

    /// Number of corpus rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct n-grams in the corpus.
    pub fn vocabulary_len(&self) -> usize {
        self.model.vocabulary.len()
    }

    /// Records paired with their similarity to `message`, best first.
    pub fn ranked(&self, message: &str) -> Vec<(&ReferenceRecord, f64)> {
        let query = self.model.transform(&terms(message));
        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, doc)| (index, cosine(&query, doc)))
            .collect();
        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .take(self.top_k)
            .filter_map(|(index, score)| self.records.get(index).map(|r| (r, score)))
            .collect()
    }
}

impl Retriever for TfIdfRetriever {
    fn retrieve(&self, message: &str) -> Vec<ReferenceRecord> {
        self.ranked(message)
            .into_iter()
            .map(|(record, _)| record.clone())
            .collect()
    }
}
