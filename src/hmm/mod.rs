pub mod matrix;
pub mod model;
pub mod tagger;
pub mod trainer;
pub mod viterbi;
