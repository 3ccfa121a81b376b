/// Sequence labeller over whitespace-free tokens.
pub trait Tagger {
    fn num_labels(&self) -> usize;

    /// Writes the best label id for every token into `labels` and returns
    /// the score of that path.
    ///
    /// # Panics
    ///
    /// Panics if `labels.len() != tokens.len()`.
    fn viterbi(&self, tokens: &[&str], labels: &mut [usize]) -> f64;

    fn label(&self, id: usize) -> Option<&str>;

    fn tag(&self, tokens: &[&str]) -> Vec<&str> {
        let mut labels = vec![0; tokens.len()];
        self.viterbi(tokens, &mut labels);
        labels.into_iter().map(|i| self.label(i).unwrap_or_default()).collect()
    }

    /// Tags a document given as one token per line, sentences separated by
    /// blank lines. Every blank line yields a `None` marker at its position;
    /// sentences are decoded independently.
    fn tag_document<'a, I: IntoIterator<Item = &'a str>>(&self, lines: I) -> Vec<Option<&str>>
    where
        Self: Sized,
    {
        let mut output = Vec::new();
        let mut sentence = Vec::new();
        for line in lines {
            let token = line.trim();
            if token.is_empty() {
                if !sentence.is_empty() {
                    output.extend(self.tag(&sentence).into_iter().map(Some));
                    sentence.clear();
                }
                output.push(None);
            } else {
                sentence.push(token);
            }
        }
        if !sentence.is_empty() {
            output.extend(self.tag(&sentence).into_iter().map(Some));
        }
        output
    }
}
