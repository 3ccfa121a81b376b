use super::{
    model::{HmmModel, PrevTag},
    tagger::Tagger,
};
use crate::quark::StringTable;

/// Scores and backward edges of one decode call.
#[derive(Debug)]
struct Lattice {
    num_labels: usize,
    /**
     * Viterbi scores.
     *  This is a [T][L] matrix whose element [t][l] presents the probability
     *  of the best path ending at (t, l).
     */
    score: Vec<f64>,
    /**
     * Backward edges.
     *  This is a [T][L] matrix whose element [t][j] represents the label #i
     *  that yields the maximum score to arrive at (t, j).
     */
    backward_edge: Vec<usize>,
}

impl Lattice {
    fn new(num_labels: usize, num_items: usize) -> Self {
        Self {
            num_labels,
            score: vec![0.0; num_labels * num_items],
            backward_edge: vec![0; num_labels * num_items],
        }
    }

    #[inline]
    fn column(&self, t: usize) -> &[f64] {
        &self.score[self.num_labels * t..self.num_labels * (t + 1)]
    }
}

/// First index holding the maximum; later equal values never win.
#[inline]
fn argmax<I: IntoIterator<Item = f64>>(values: I) -> (usize, f64) {
    let mut values = values.into_iter();
    let mut max_score = values.next().unwrap_or(0.0);
    let mut argmax_score = 0;
    for (i, score) in values.enumerate() {
        if max_score < score {
            max_score = score;
            argmax_score = i + 1;
        }
    }
    (argmax_score, max_score)
}

/// Viterbi decoding over a trained [`HmmModel`].
///
/// The decoder only borrows the model, so any number of decoders can share
/// one model across threads.
#[derive(Debug, Clone, Copy)]
pub struct ViterbiDecoder<'a> {
    model: &'a HmmModel,
}

impl<'a> ViterbiDecoder<'a> {
    pub fn new(model: &'a HmmModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'a HmmModel {
        self.model
    }

    /// Returns the best label ids and the probability of their path.
    /// Unknown words and unseen transitions score zero; when a whole column
    /// is zero the lowest label id wins.
    pub fn decode<S: AsRef<str>>(&self, tokens: &[S]) -> (Vec<usize>, f64) {
        let model = self.model;
        let num_labels = model.num_tags();
        let num_items = tokens.len();
        if num_items == 0 || num_labels == 0 {
            return (vec![0; num_items], 0.0);
        }
        let words: Vec<Option<usize>> = tokens.iter().map(|w| model.words().to_id(w.as_ref())).collect();
        let mut lattice = Lattice::new(num_labels, num_items);

        /* Compute the scores at (0, *). */
        for j in 0..num_labels {
            lattice.score[j] = model.transition(PrevTag::Start, j) * model.emission(j, words[0]);
        }

        /* Compute the scores at (t, *). */
        for t in 1..num_items {
            for j in 0..num_labels {
                let emission = model.emission(j, words[t]);
                /* Transit from (t-1, i) to (t, j). */
                let (i, max_score) = argmax(
                    lattice
                        .column(t - 1)
                        .iter()
                        .enumerate()
                        .map(|(i, &prev)| prev * model.transition(PrevTag::Tag(i), j) * emission),
                );
                /* Backward link (#t, #j) -> (#t-1, #i). */
                lattice.backward_edge[num_labels * t + j] = i;
                lattice.score[num_labels * t + j] = max_score;
            }
        }

        /* Find the label at T-1 with the maximum score. */
        let mut labels = vec![0; num_items];
        let (last, max_score) = argmax(lattice.column(num_items - 1).iter().copied());
        labels[num_items - 1] = last;

        /* Tag labels by tracing the backward links. */
        for t in (0..num_items - 1).rev() {
            labels[t] = lattice.backward_edge[num_labels * (t + 1) + labels[t + 1]];
        }
        log::debug!("decoded {num_items} tokens, score = {max_score}");
        (labels, max_score)
    }
}

impl<'a> Tagger for ViterbiDecoder<'a> {
    fn num_labels(&self) -> usize {
        self.model.num_tags()
    }

    fn viterbi(&self, tokens: &[&str], labels: &mut [usize]) -> f64 {
        assert_eq!(labels.len(), tokens.len(), "labels must hold one slot per token");
        let (best, score) = self.decode(tokens);
        labels.copy_from_slice(&best);
        score
    }

    fn label(&self, id: usize) -> Option<&str> {
        self.model.tags().to_str(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::trainer::HmmTrainer;

    fn model(corpus: &str) -> HmmModel {
        HmmTrainer::from_lines(corpus.lines()).unwrap().build().unwrap()
    }

    #[test]
    fn argmax_first_wins() {
        assert_eq!(argmax([0.1, 0.3, 0.3, 0.2]), (1, 0.3));
        assert_eq!(argmax([0.0, 0.0, 0.0]), (0, 0.0));
        assert_eq!(argmax([0.5]), (0, 0.5));
    }

    #[test]
    fn single_sentence() {
        let m = model("the\tDET\ndog\tNOUN\nruns\tVERB\n\n");
        let tagger = m.tagger();
        assert_eq!(tagger.tag(&["the", "dog", "runs"]), ["DET", "NOUN", "VERB"]);
        let (_, score) = tagger.decode(&["the", "dog", "runs"]);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn ambiguous_word() {
        // "run" is a VERB after PRON and a NOUN after DET
        let m = model("I\tPRON\nrun\tVERB\n\nthe\tDET\nrun\tNOUN\n\nwe\tPRON\nrun\tVERB\n");
        let tagger = m.tagger();
        assert_eq!(tagger.tag(&["the", "run"]), ["DET", "NOUN"]);
        assert_eq!(tagger.tag(&["we", "run"]), ["PRON", "VERB"]);
    }

    #[test]
    fn tie_prefers_lower_index() {
        // A and B are equally likely at both positions; A is enumerated first
        let m = model("x\tA\ny\tA\n\nx\tB\ny\tB\n\nx\tA\ny\tB\n\nx\tB\ny\tA\n");
        assert_eq!(m.tags().iter().collect::<Vec<_>>(), ["A", "B"]);
        let (labels, score) = m.tagger().decode(&["x", "y"]);
        assert_eq!(labels, [0, 0]);
        assert_eq!(score, 0.0625);
    }

    #[test]
    fn unknown_word() {
        let m = model("the\tDET\ndog\tNOUN\n\nruns\tVERB\n");
        let (labels, score) = m.tagger().decode(&["the", "unicorn", "runs"]);
        assert_eq!(labels.len(), 3);
        assert_eq!(score, 0.0);
        assert_eq!(labels, [0, 0, 0]);
    }

    #[test]
    fn empty_sentence() {
        let m = model("the\tDET\n");
        let empty: [&str; 0] = [];
        let (labels, score) = m.tagger().decode(&empty);
        assert!(labels.is_empty());
        assert_eq!(score, 0.0);
    }

    #[test]
    #[should_panic(expected = "labels must hold one slot per token")]
    fn viterbi_label_buffer_length() {
        let m = model("the\tDET\ndog\tNOUN\n");
        let mut labels = [0; 1];
        m.tagger().viterbi(&["the", "dog"], &mut labels);
    }

    #[test]
    fn document() {
        let m = model("the\tDET\ndog\tNOUN\n\nit\tPRON\nruns\tVERB\n");
        let tagger = m.tagger();
        let out = tagger.tag_document("the\ndog\n\n\nit\nruns".lines());
        assert_eq!(out, [Some("DET"), Some("NOUN"), None, None, Some("PRON"), Some("VERB")]);
    }
}
