//! TF-IDF vectorization and cosine similarity over product descriptions.
//!
//! A [`TfidfVectorizer`] is plain configuration. Fitting it returns a fresh
//! [`TfidfModel`] owned by the caller, so vocabulary and idf weights never
//! outlive the request that built them and cannot leak between concurrent
//! requests.

use crate::models::ProductId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Errors raised while scoring description similarity
#[derive(Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("cannot build a vector space from an empty corpus")]
    EmptyCorpus,

    #[error("reference index {index} is out of range for {len} candidates")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("reference product {0} is not among the filtered candidates")]
    UnknownCandidate(ProductId),
}

/// Stop-word list applied before building the vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWords {
    /// Deployment language of the marketplace
    #[default]
    Spanish,
    English,
    None,
}

impl StopWords {
    fn words(self) -> &'static [&'static str] {
        match self {
            StopWords::Spanish => SPANISH_STOP_WORDS,
            StopWords::English => ENGLISH_STOP_WORDS,
            StopWords::None => &[],
        }
    }
}

/// Which vector every candidate is compared against
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ReferenceSelector {
    /// Candidate at this position in filter order
    Index { index: usize },
    /// Candidate with this product id
    Candidate { id: ProductId },
    /// Free text vectorized against the fitted vocabulary
    Query { text: String },
}

impl Default for ReferenceSelector {
    fn default() -> Self {
        ReferenceSelector::Index { index: 0 }
    }
}

/// Sparse, L2-normalised term vector. Entries are sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    entries: Vec<(usize, f64)>,
}

impl TermVector {
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &TermVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity clamped to `0.0..=1.0`; zero vectors score 0
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }
    (a.dot(b) / (a.norm() * b.norm())).clamp(0.0, 1.0)
}

/// TF-IDF vectorizer configuration
///
/// Tokens are lower-cased runs of two or more word characters. Weights are raw
/// term counts times smoothed idf, `ln((1 + n) / (1 + df)) + 1`, and each row
/// is L2-normalised.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer {
    stop_words: StopWords,
}

impl TfidfVectorizer {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }

    /// Split text into lower-cased tokens with stop words removed
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let stop: HashSet<&str> = self.stop_words.words().iter().copied().collect();

        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|raw| raw.chars().count() >= 2)
            .map(str::to_lowercase)
            .filter(|token| !stop.contains(token.as_str()))
            .collect()
    }

    /// Learn vocabulary and idf weights from `documents`
    ///
    /// The returned model holds the vectors of the fitted documents in input
    /// order.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Result<TfidfModel, SimilarityError> {
        if documents.is_empty() {
            return Err(SimilarityError::EmptyCorpus);
        }

        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| self.tokenize(doc.as_ref()))
            .collect();

        // Document frequency per term, terms sorted lexicographically
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (index, (term, df)) in doc_freq.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), index);
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
        }

        let mut model = TfidfModel {
            vectorizer: *self,
            vocabulary,
            idf,
            vectors: Vec::with_capacity(tokenized.len()),
        };
        model.vectors = tokenized
            .iter()
            .map(|tokens| model.weigh(tokens))
            .collect();

        Ok(model)
    }
}

/// Vector space fitted on one corpus
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vectorizer: TfidfVectorizer,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<TermVector>,
}

impl TfidfModel {
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vectors of the fitted documents, in input order
    pub fn vectors(&self) -> &[TermVector] {
        &self.vectors
    }

    /// Vectorize unseen text; terms outside the vocabulary are dropped
    pub fn transform(&self, text: &str) -> TermVector {
        self.weigh(&self.vectorizer.tokenize(text))
    }

    fn weigh(&self, tokens: &[String]) -> TermVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }

        TermVector { entries }
    }
}

/// Score every description against the selected reference
///
/// Returns one similarity per description, in input order. A reference
/// candidate always scores exactly 1.0 against itself.
///
/// # Errors
/// [`SimilarityError::EmptyCorpus`] when `descriptions` is empty, or a
/// reference error when the selector names a candidate that is not present.
pub fn score_similarity<S: AsRef<str>>(
    vectorizer: &TfidfVectorizer,
    descriptions: &[S],
    ids: &[ProductId],
    reference: &ReferenceSelector,
) -> Result<Vec<f64>, SimilarityError> {
    let model = vectorizer.fit(descriptions)?;
    let vectors = model.vectors();

    let (reference_index, reference_vector) = match reference {
        ReferenceSelector::Index { index } => {
            let vector = vectors.get(*index).ok_or(SimilarityError::IndexOutOfRange {
                index: *index,
                len: vectors.len(),
            })?;
            (Some(*index), vector.clone())
        }
        ReferenceSelector::Candidate { id } => {
            let index = ids
                .iter()
                .position(|candidate| candidate == id)
                .ok_or_else(|| SimilarityError::UnknownCandidate(id.clone()))?;
            (Some(index), vectors[index].clone())
        }
        ReferenceSelector::Query { text } => (None, model.transform(text)),
    };

    tracing::debug!(
        "Fitted vector space: {} documents, {} terms",
        vectors.len(),
        model.vocabulary_size()
    );

    Ok(vectors
        .iter()
        .enumerate()
        .map(|(i, vector)| {
            if Some(i) == reference_index {
                1.0
            } else {
                cosine_similarity(&reference_vector, vector)
            }
        })
        .collect())
}

const SPANISH_STOP_WORDS: &[&str] = &[
    "a", "al", "algo", "algunas", "algunos", "ante", "antes", "como", "con", "contra",
    "cual", "cuando", "de", "del", "desde", "donde", "durante", "e", "el", "ella",
    "ellas", "ellos", "en", "entre", "era", "es", "esa", "esas", "ese", "eso", "esos",
    "esta", "estaba", "estado", "estan", "estar", "este", "esto", "estos", "fue", "ha",
    "hay", "la", "las", "le", "les", "lo", "los", "mas", "me", "mi", "mis", "mucho",
    "muy", "más", "nada", "ni", "no", "nos", "nosotros", "o", "os", "otra", "otras",
    "otro", "otros", "para", "pero", "poco", "por", "porque", "que", "quien", "se",
    "sea", "ser", "si", "sin", "sobre", "son", "su", "sus", "sí", "también", "tanto",
    "te", "tiene", "tienen", "todo", "todos", "tu", "tus", "un", "una", "uno", "unos",
    "usted", "ustedes", "y", "ya", "yo", "él", "está", "están",
];

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "been", "but", "by", "can", "could", "do", "does", "for", "from", "had", "has",
    "have", "he", "her", "his", "how", "if", "in", "into", "is", "it", "its", "more",
    "most", "no", "not", "of", "on", "or", "other", "our", "she", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "to", "up", "very", "was", "we", "were", "what", "when", "which", "who", "will",
    "with", "would", "you", "your",
];
