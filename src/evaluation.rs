use std::{collections::BTreeMap, fmt::Display, iter::zip, path::Path};

use crate::{dataset::Dataset, error::Result, hmm::tagger::Tagger};

/// Label-wise performance values.
#[derive(Debug, Default, Clone)]
struct LabelMeasure {
    /// Number of correct predictions.
    num_correct: usize,
    /** Number of occurrences of the label in the gold-standard data. */
    num_observation: usize,
    /** Number of predictions. */
    num_prediction: usize,
    precision: f64,
    recall: f64,
    fmeasure: f64,
}

impl LabelMeasure {
    fn update(&mut self) {
        self.precision = 0.0;
        self.recall = 0.0;
        self.fmeasure = 0.0;
        if self.num_prediction > 0 {
            self.precision = self.num_correct as f64 / self.num_prediction as f64;
        }
        if self.num_observation > 0 {
            self.recall = self.num_correct as f64 / self.num_observation as f64;
        }
        if self.precision + self.recall > 0.0 {
            self.fmeasure = self.precision * self.recall * 2.0 / (self.precision + self.recall);
        }
    }
}

/// Accumulated tagging performance against gold-standard data.
#[derive(Debug, Default)]
pub struct Evaluation {
    tbl: BTreeMap<String, LabelMeasure>,

    /** Number of correctly predicted tokens. */
    item_total_correct: usize,
    /** Total number of gold-tagged tokens. */
    item_total_num: usize,

    /** Number of sentences tagged without any error. */
    inst_total_correct: usize,
    inst_total_num: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimation {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl Evaluation {
    /// Compares one sentence position by position.
    pub fn accumulate<R: AsRef<str>, P: AsRef<str>>(&mut self, reference: &[R], prediction: &[P]) {
        let mut matched = 0;
        for (r, p) in zip(reference, prediction) {
            let (r, p) = (r.as_ref(), p.as_ref());
            self.tbl.entry(r.to_string()).or_default().num_observation += 1;
            self.tbl.entry(p.to_string()).or_default().num_prediction += 1;
            if r == p {
                self.tbl.entry(r.to_string()).or_default().num_correct += 1;
                matched += 1;
            }
        }
        self.item_total_correct += matched;
        self.item_total_num += reference.len();

        if matched == reference.len() {
            self.inst_total_correct += 1;
        }
        self.inst_total_num += 1;
    }

    pub fn num_correct(&self) -> usize {
        self.item_total_correct
    }

    pub fn num_items(&self) -> usize {
        self.item_total_num
    }

    pub fn num_sentences(&self) -> usize {
        self.inst_total_num
    }

    /// Token accuracy in percent, rounded to two decimals; `0.0` without any
    /// gold token.
    pub fn accuracy(&self) -> f64 {
        if self.item_total_num == 0 {
            return 0.0;
        }
        let percent = self.item_total_correct as f64 / self.item_total_num as f64 * 100.0;
        (percent * 100.0).round_ties_even() / 100.0
    }

    pub fn item_accuracy(&self) -> f64 {
        ratio(self.item_total_correct, self.item_total_num)
    }

    pub fn sequence_accuracy(&self) -> f64 {
        ratio(self.inst_total_correct, self.inst_total_num)
    }

    /// Macro-averaged precision, recall and F1 over the labels of the
    /// gold-standard data.
    pub fn estimate(&self) -> Estimation {
        let mut est = Estimation { precision: 0.0, recall: 0.0, fmeasure: 0.0 };
        let mut n = 0;
        for lev in self.measures().filter(|x| x.num_observation > 0) {
            est.precision += lev.precision;
            est.recall += lev.recall;
            est.fmeasure += lev.fmeasure;
            n += 1;
        }
        if n > 0 {
            est.precision /= n as f64;
            est.recall /= n as f64;
            est.fmeasure /= n as f64;
        }
        est
    }

    fn measures(&self) -> impl Iterator<Item = LabelMeasure> + '_ {
        self.tbl.values().cloned().map(|mut x| {
            x.update();
            x
        })
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d > 0 {
        n as f64 / d as f64
    } else {
        0.0
    }
}

/// Tags every sentence of `ds` with its gold tags hidden.
pub fn evaluate<T: Tagger>(tagger: &T, ds: &Dataset) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for seq in &ds.seqs {
        let prediction = tagger.tag(&seq.words());
        evaluation.accumulate(&seq.tags, &prediction);
    }
    log::info!(
        "evaluated {} sentences, {} tokens",
        evaluation.num_sentences(),
        evaluation.num_items()
    );
    evaluation
}

pub fn evaluate_file<T: Tagger, P: AsRef<Path>>(tagger: &T, path: P) -> Result<Evaluation> {
    let ds = Dataset::from_path(path)?;
    Ok(evaluate(tagger, &ds))
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for (label, lev) in zip(self.tbl.keys(), self.measures()) {
            if lev.num_observation == 0 {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) (******, ******, ******)",
                    label, lev.num_correct, lev.num_prediction, lev.num_observation
                )?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    label, lev.num_correct, lev.num_prediction, lev.num_observation, lev.precision, lev.recall, lev.fmeasure
                )?;
            }
        }
        let est = self.estimate();
        writeln!(f, "Macro-average precision, recall, F1: ({:.4}, {:.4}, {:.4})", est.precision, est.recall, est.fmeasure)?;
        writeln!(f, "Item accuracy: {}/{} => {:.4}", self.item_total_correct, self.item_total_num, self.item_accuracy())?;
        write!(f, "Sequence accuracy: {}/{} => {:.4}", self.inst_total_correct, self.inst_total_num, self.sequence_accuracy())
    }
}
