//! First-order hidden Markov model part-of-speech tagger.
//!
//! [`HmmTrainer`] counts tag transitions and word emissions from a
//! `word<TAB>tag` corpus and normalizes them into an immutable [`HmmModel`];
//! [`ViterbiDecoder`] assigns the most likely tag sequence to new sentences.
//!
//! ```
//! use hmmtag::{HmmTrainer, Tagger};
//!
//! let model = HmmTrainer::from_lines("the\tDET\ndog\tNOUN\nruns\tVERB\n\n".lines())
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! assert_eq!(model.tagger().tag(&["the", "dog", "runs"]), ["DET", "NOUN", "VERB"]);
//! ```

pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod hmm;
pub mod quark;

pub use dataset::{Dataset, Sentence};
pub use error::{Error, Result};
pub use evaluation::{evaluate, evaluate_file, Estimation, Evaluation};
pub use hmm::{
    model::{HmmModel, ModelFormat, PrevTag, START},
    tagger::Tagger,
    trainer::{train, HmmTrainer},
    viterbi::ViterbiDecoder,
};
pub use quark::{Quark, StringTable, TextVectorizer};
