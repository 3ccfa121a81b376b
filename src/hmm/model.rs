use std::{
    io::{Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{matrix::Matrix, viterbi::ViterbiDecoder};
use crate::{
    error::{Error, Result},
    quark::{Quark, StringTable},
};

/// Name of the sentence-boundary sentinel in reports and dumps.
pub const START: &str = "START";

const ROW_TOLERANCE: f64 = 1e-6;

/// Conditioning side of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrevTag {
    /// Sentence boundary.
    #[default]
    Start,
    Tag(usize),
}

impl PrevTag {
    /// Row in the transition matrix. `START` takes row 0.
    #[inline]
    pub(crate) fn row(self) -> usize {
        match self {
            PrevTag::Start => 0,
            PrevTag::Tag(i) => i + 1,
        }
    }
}

/// On-disk encoding of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelFormat {
    Json,
    Bson,
}

impl ModelFormat {
    /// `.bson` files are BSON, everything else JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|x| x.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bson") => ModelFormat::Bson,
            _ => ModelFormat::Json,
        }
    }
}

/// Trained first-order HMM.
///
/// Tags and words are interned, so both tables are dense matrices:
/// `transitions` is `(S + 1) x S` with the `START` row first, `emissions` is
/// `S x V`. A row that was never observed stays all zero; every other row
/// sums to one. Lookups of unseen pairs yield `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmModel {
    tags: Quark,
    words: Quark,
    tag_counts: Vec<u64>,
    transitions: Matrix,
    emissions: Matrix,
}

impl HmmModel {
    pub(crate) fn new(tags: Quark, words: Quark, tag_counts: Vec<u64>, transitions: Matrix, emissions: Matrix) -> Self {
        Self { tags, words, tag_counts, transitions, emissions }
    }

    #[inline]
    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// The state space, in training enumeration order.
    pub fn tags(&self) -> &Quark {
        &self.tags
    }

    pub fn words(&self) -> &Quark {
        &self.words
    }

    pub fn tag_count(&self, tag: &str) -> u64 {
        self.tags.to_id(tag).map_or(0, |i| self.tag_counts[i])
    }

    pub fn tag_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.tags.iter().zip(self.tag_counts.iter().copied())
    }

    /// P(next | prev)
    #[inline]
    pub fn transition(&self, prev: PrevTag, next: usize) -> f64 {
        self.transitions.get(prev.row(), next)
    }

    /// P(word | tag); `None` stands for a word outside the vocabulary.
    #[inline]
    pub fn emission(&self, tag: usize, word: Option<usize>) -> f64 {
        word.map_or(0.0, |w| self.emissions.get(tag, w))
    }

    pub fn transition_row(&self, prev: PrevTag) -> &[f64] {
        self.transitions.row(prev.row())
    }

    pub fn emission_row(&self, tag: usize) -> &[f64] {
        self.emissions.row(tag)
    }

    /// P(next | prev) by name, with `None` standing for [`START`].
    pub fn transition_by_name(&self, prev: Option<&str>, next: &str) -> f64 {
        let prev = match prev {
            None => Some(PrevTag::Start),
            Some(p) => self.tags.to_id(p).map(PrevTag::Tag),
        };
        match (prev, self.tags.to_id(next)) {
            (Some(p), Some(n)) => self.transition(p, n),
            _ => 0.0,
        }
    }

    pub fn emission_by_name(&self, tag: &str, word: &str) -> f64 {
        self.tags.to_id(tag).map_or(0.0, |t| self.emission(t, self.words.to_id(word)))
    }

    pub fn tagger(&self) -> ViterbiDecoder<'_> {
        ViterbiDecoder::new(self)
    }

    /// Checks dimensions and the normalization invariant.
    pub fn validate(&self) -> Result<()> {
        let s = self.num_tags();
        let v = self.num_words();
        if s == 0 {
            return Err(Error::InvalidModel("empty tag set".into()));
        }
        if !self.tags.is_consistent() || !self.words.is_consistent() {
            return Err(Error::InvalidModel("duplicated tag or word".into()));
        }
        if self.tag_counts.len() != s {
            return Err(Error::InvalidModel(format!("{} tag counts for {} tags", self.tag_counts.len(), s)));
        }
        for (name, m, rows, cols) in [("transition", &self.transitions, s + 1, s), ("emission", &self.emissions, s, v)] {
            if m.rows() != rows || m.cols() != cols || !m.is_well_formed() {
                return Err(Error::InvalidModel(format!(
                    "{name} matrix is {}x{}, expected {rows}x{cols}",
                    m.rows(),
                    m.cols()
                )));
            }
            for i in 0..rows {
                let row = m.row(i);
                if row.iter().any(|p| !(0.0..=1.0).contains(p)) {
                    return Err(Error::InvalidModel(format!("{name} row {i} holds a value outside [0, 1]")));
                }
                let sum: f64 = row.iter().sum();
                if sum != 0.0 && (sum - 1.0).abs() > ROW_TOLERANCE {
                    return Err(Error::InvalidModel(format!("{name} row {i} sums to {sum}")));
                }
            }
        }
        Ok(())
    }

    pub fn to_vec(&self, format: ModelFormat) -> Result<Vec<u8>> {
        Ok(match format {
            ModelFormat::Json => serde_json::to_vec(self)?,
            ModelFormat::Bson => bson::to_vec(self)?,
        })
    }

    pub fn from_memory(buffer: &[u8], format: ModelFormat) -> Result<Self> {
        let model: Self = match format {
            ModelFormat::Json => serde_json::from_slice(buffer)?,
            ModelFormat::Bson => bson::from_slice(buffer)?,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn to_writer<W: Write>(&self, mut writer: W, format: ModelFormat) -> Result<()> {
        writer.write_all(&self.to_vec(format)?)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_reader<R: Read>(mut reader: R, format: ModelFormat) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Self::from_memory(&buffer, format)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, format: ModelFormat) -> Result<()> {
        let path = path.as_ref();
        log::info!("write model to {} ({:?})", path.display(), format);
        let buffer = self.to_vec(format)?;
        std::fs::write(path, buffer).map_err(|e| Error::file(path, e))
    }

    pub fn load<P: AsRef<Path>>(path: P, format: ModelFormat) -> Result<Self> {
        let path = path.as_ref();
        log::info!("read model from {} ({:?})", path.display(), format);
        let buffer = std::fs::read(path).map_err(|e| Error::file(path, e))?;
        Self::from_memory(&buffer, format)
    }
}
