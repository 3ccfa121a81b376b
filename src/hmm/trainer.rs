use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    time::Instant,
};

use super::{
    matrix::Matrix,
    model::{HmmModel, PrevTag, START},
};
use crate::{
    dataset::{parse_line, Line, Sentence},
    error::{Error, Result},
    quark::{Quark, StringTable, TextVectorizer},
};

/// Sparse frequency table keyed by `(outer, inner)` ids. An outer key exists
/// only once something was counted under it.
#[derive(Debug, Default)]
struct FreqTable {
    m: HashMap<usize, HashMap<usize, u64>>,
}

impl FreqTable {
    fn add(&mut self, outer: usize, inner: usize) {
        *self.m.entry(outer).or_default().entry(inner).or_default() += 1;
    }

    fn total(&self) -> u64 {
        self.m.values().flat_map(|x| x.values()).sum()
    }

    /// Divides every count by the total of its outer key. Outer keys that
    /// were never seen leave an all-zero row.
    fn normalize<F: Fn(usize) -> String>(&self, rows: usize, cols: usize, name: F) -> Result<Matrix> {
        let mut matrix = Matrix::zeros(rows, cols);
        for (&i, inner) in &self.m {
            let total: u64 = inner.values().sum();
            if total == 0 {
                return Err(Error::EmptyDistribution(name(i)));
            }
            for (&j, &count) in inner {
                matrix.set(i, j, count as f64 / total as f64);
            }
        }
        Ok(matrix)
    }
}

/// Collects transition and emission counts from tagged text.
///
/// The trainer owns the counts while they are accumulated; [`HmmTrainer::build`]
/// consumes it and hands back the normalized, immutable [`HmmModel`].
#[derive(Debug, Default)]
pub struct HmmTrainer {
    tags: Quark,
    words: Quark,
    tag_counts: Vec<u64>,
    /// Rows are [`PrevTag::row`], columns tag ids.
    transitions: FreqTable,
    /// Rows are tag ids, columns word ids.
    emissions: FreqTable,
    prev: PrevTag,
    num_sentences: usize,
    num_tokens: usize,
}

impl HmmTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn num_tokens(&self) -> usize {
        self.num_tokens
    }

    pub fn num_sentences(&self) -> usize {
        self.num_sentences
    }

    pub fn observe(&mut self, word: &str, tag: &str) {
        let t = self.tags.find_or_insert(tag);
        if t == self.tag_counts.len() {
            if tag == START {
                log::warn!("tag {tag:?} shares its name with the sentence-start state");
            }
            self.tag_counts.push(0);
        }
        let w = self.words.find_or_insert(word);
        self.tag_counts[t] += 1;
        self.transitions.add(self.prev.row(), t);
        self.emissions.add(t, w);
        if self.prev == PrevTag::Start {
            self.num_sentences += 1;
        }
        self.prev = PrevTag::Tag(t);
        self.num_tokens += 1;
    }

    /// Closes the current sentence; the next token follows `START`.
    pub fn end_sentence(&mut self) {
        self.prev = PrevTag::Start;
    }

    pub fn feed(&mut self, line: Line<'_>) {
        match line {
            Line::Token { word, tag } => self.observe(word, tag),
            Line::Boundary => self.end_sentence(),
        }
    }

    pub fn append(&mut self, seq: &Sentence) {
        for (word, tag) in seq.words.iter().zip(&seq.tags) {
            self.observe(word, tag);
        }
        self.end_sentence();
    }

    /// Counts a `word<TAB>tag` line stream. The stream is treated as a
    /// complete corpus, so its last sentence is closed at the end.
    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let begin = Instant::now();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            self.feed(parse_line(i + 1, &line)?);
        }
        self.end_sentence();
        log::info!("counted {} tokens, time cost: {:?}", self.num_tokens, begin.elapsed());
        Ok(())
    }

    pub fn from_lines<'a, I: IntoIterator<Item = &'a str>>(lines: I) -> Result<Self> {
        let begin = Instant::now();
        let mut trainer = Self::new();
        for (i, line) in lines.into_iter().enumerate() {
            trainer.feed(parse_line(i + 1, line)?);
        }
        trainer.end_sentence();
        log::info!("counted {} tokens, time cost: {:?}", trainer.num_tokens, begin.elapsed());
        Ok(trainer)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("reading training data from {}", path.display());
        let f = File::open(path).map_err(|e| Error::file(path, e))?;
        let mut trainer = Self::new();
        trainer.read(BufReader::new(f)).map_err(|e| match e {
            Error::Io(source) => Error::file(path, source),
            e => e,
        })?;
        Ok(trainer)
    }

    /// Normalizes the counts into conditional distributions.
    pub fn build(self) -> Result<HmmModel> {
        if self.num_tokens == 0 {
            return Err(Error::EmptyCorpus);
        }
        let begin = Instant::now();
        let num_tags = self.tags.len();
        let num_words = self.words.len();
        log::info!(
            "counted {} tokens in {} sentences (tags: {num_tags}, vocabulary: {num_words})",
            self.num_tokens,
            self.num_sentences
        );
        debug_assert_eq!(self.transitions.total(), self.num_tokens as u64);
        debug_assert_eq!(self.emissions.total(), self.num_tokens as u64);

        let tags = &self.tags;
        let tag_name = |i: usize| tags.to_str(i).unwrap_or_default().to_string();
        let transitions = self.transitions.normalize(num_tags + 1, num_tags, |row| match row {
            0 => START.to_string(),
            r => tag_name(r - 1),
        })?;
        let emissions = self.emissions.normalize(num_tags, num_words, tag_name)?;
        log::info!("normalized model, time cost: {:?}", begin.elapsed());

        Ok(HmmModel::new(self.tags, self.words, self.tag_counts, transitions, emissions))
    }
}

/// Trains a model from a `word<TAB>tag` file.
pub fn train<P: AsRef<Path>>(path: P) -> Result<HmmModel> {
    HmmTrainer::from_path(path)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "the\tDET\ndog\tNOUN\nruns\tVERB\n\nthe\tDET\nold\tADJ\ndog\tNOUN\n\na\tDET\nrun\tNOUN\n";

    fn assert_rows_normalized(model: &HmmModel) {
        let s = model.num_tags();
        let prevs = std::iter::once(PrevTag::Start).chain((0..s).map(PrevTag::Tag));
        for prev in prevs {
            let sum: f64 = model.transition_row(prev).iter().sum();
            assert!(sum == 0.0 || (sum - 1.0).abs() < 1e-9, "{:?}: {}", prev, sum);
        }
        for t in 0..s {
            let sum: f64 = model.emission_row(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{}: {}", t, sum);
        }
    }

    #[test]
    fn counts() {
        let trainer = HmmTrainer::from_lines(CORPUS.lines()).unwrap();
        assert_eq!(trainer.num_tokens(), 8);
        assert_eq!(trainer.num_sentences(), 3);
        assert_eq!(trainer.num_tags(), 4);
        assert_eq!(trainer.num_words(), 6);
        assert_eq!(trainer.tags.iter().collect::<Vec<_>>(), ["DET", "NOUN", "VERB", "ADJ"]);
        assert_eq!(trainer.tag_counts, [3, 3, 1, 1]);
    }

    #[test]
    fn probabilities() {
        let model = HmmTrainer::from_lines(CORPUS.lines()).unwrap().build().unwrap();
        assert_eq!(model.transition_by_name(None, "DET"), 1.0);
        assert_eq!(model.transition_by_name(Some("DET"), "NOUN"), 2.0 / 3.0);
        assert_eq!(model.transition_by_name(Some("DET"), "ADJ"), 1.0 / 3.0);
        assert_eq!(model.transition_by_name(Some("NOUN"), "VERB"), 1.0);
        assert_eq!(model.emission_by_name("DET", "the"), 2.0 / 3.0);
        assert_eq!(model.emission_by_name("NOUN", "dog"), 2.0 / 3.0);
        assert_eq!(model.emission_by_name("NOUN", "run"), 1.0 / 3.0);
        assert_rows_normalized(&model);
    }

    #[test]
    fn blank_line_emits_no_transition() {
        let model = HmmTrainer::from_lines("a\tX\n\nb\tY\n".lines()).unwrap().build().unwrap();
        assert_eq!(model.transition_by_name(Some("X"), "Y"), 0.0);
        assert_eq!(model.transition_by_name(None, "X"), 0.5);
        assert_eq!(model.transition_by_name(None, "Y"), 0.5);
        assert!(model.transition_row(PrevTag::Tag(0)).iter().all(|&p| p == 0.0));
    }

    #[test]
    fn words_are_case_sensitive() {
        let model = HmmTrainer::from_lines("The\tDET\n\nthe\tDET\n".lines()).unwrap().build().unwrap();
        assert_eq!(model.num_words(), 2);
        assert_eq!(model.emission_by_name("DET", "The"), 0.5);
    }

    #[test]
    fn tag_named_start_is_ordinary() {
        let _ = env_logger::builder().is_test(true).try_init();
        let model = HmmTrainer::from_lines("x\tSTART\ny\tSTART\n".lines()).unwrap().build().unwrap();
        assert_eq!(model.transition_by_name(None, START), 1.0);
        assert_eq!(model.transition_by_name(Some(START), START), 1.0);
        assert_eq!(model.num_tags(), 1);
    }

    #[test]
    fn append_sentences() {
        let ds = crate::Dataset::try_from(CORPUS).unwrap();
        let mut trainer = HmmTrainer::new();
        for seq in &ds.seqs {
            trainer.append(seq);
        }
        let from_sentences = trainer.build().unwrap();
        let from_lines = HmmTrainer::from_lines(CORPUS.lines()).unwrap().build().unwrap();
        assert_eq!(from_sentences, from_lines);
    }

    #[test]
    fn read_stream() {
        let mut trainer = HmmTrainer::new();
        trainer.read(CORPUS.as_bytes()).unwrap();
        assert_eq!(trainer.num_tokens(), 8);
    }

    #[test]
    fn malformed_line() {
        match HmmTrainer::from_lines("the\tDET\ndog NOUN\n".lines()) {
            Err(Error::InputFormat { line, .. }) => assert_eq!(line, 2),
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn empty_corpus() {
        let trainer = HmmTrainer::from_lines("\n\n".lines()).unwrap();
        assert!(matches!(trainer.build(), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn zero_sum_group_is_surfaced() {
        let mut table = FreqTable::default();
        table.m.entry(1).or_default().insert(0, 0);
        match table.normalize(2, 1, |i| format!("row {i}")) {
            Err(Error::EmptyDistribution(name)) => assert_eq!(name, "row 1"),
            r => panic!("unexpected: {:?}", r),
        }
    }
}
