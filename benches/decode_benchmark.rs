use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmmtag::{Dataset, HmmTrainer, ViterbiDecoder};

mod common;

fn decode(decoder: &ViterbiDecoder, dataset: &Dataset) {
    for seq in &dataset.seqs {
        let (labels, _) = decoder.decode(&seq.words);
        assert_eq!(labels.len(), seq.len());
    }
}

fn decode_benchmark(c: &mut Criterion) {
    let text = common::synthetic_corpus(2000);
    let model = HmmTrainer::from_lines(text.lines())
        .expect("failed to read corpus")
        .build()
        .expect("failed to train");
    let dataset = Dataset::try_from(common::synthetic_corpus(200).as_str()).expect("failed to read dataset");
    let decoder = model.tagger();
    c.bench_function("decode", |b| b.iter(|| decode(black_box(&decoder), black_box(&dataset))));
}

criterion_group! {
    name = benchmarks;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = decode_benchmark
}
criterion_main!(benchmarks);
