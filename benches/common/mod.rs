/// Deterministic synthetic `word<TAB>tag` corpus: `n` sentences over 12 tags
/// and a few thousand words.
pub fn synthetic_corpus(n: usize) -> String {
    const TAGS: [&str; 12] = ["DET", "NOUN", "VERB", "ADJ", "ADV", "ADP", "PRON", "CONJ", "NUM", "PRT", "X", "PUNCT"];
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |m: u64| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state % m
    };
    let mut s = String::new();
    for _ in 0..n {
        let len = 5 + next(20);
        let mut tag = next(TAGS.len() as u64) as usize;
        for _ in 0..len {
            tag = (tag + 1 + next(3) as usize) % TAGS.len();
            let word = next(300) * TAGS.len() as u64 + tag as u64;
            s.push_str(&format!("w{word}\t{}\n", TAGS[tag]));
        }
        s.push('\n');
    }
    s
}
