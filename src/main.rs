use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use env_logger::Env;
use hmmtag::{evaluate_file, Error, ModelFormat, Result, Tagger};

/// Train an HMM part-of-speech tagger on a `word<TAB>tag` corpus (TRAIN),
/// save the model and print its accuracy on an evaluation corpus
#[derive(Debug, Parser)]
#[command(version)]
struct Argv {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// write the model to a file (MODEL)
    #[arg(short, long, value_name = "MODEL", default_value = "tagger.model")]
    model: PathBuf,
    /// model encoding; inferred from the MODEL extension when omitted
    #[arg(short, long, value_enum)]
    format: Option<ModelFormat>,
    /// evaluate the model on a tagged corpus (EVAL)
    #[arg(short, long, value_name = "EVAL", default_value = "tagger-eval.tsv")]
    eval: PathBuf,
    /// print per-label performance in addition to the accuracy
    #[arg(short, long)]
    report: bool,
    /// tag a document with one token per line and print `word<TAB>tag` lines
    #[arg(short, long, value_name = "FILE")]
    tag: Option<PathBuf>,
    /// training corpus
    #[arg(value_name = "TRAIN")]
    train: PathBuf,
}

fn tag_file<T: Tagger>(tagger: &T, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::File { path: path.to_path_buf(), source })?;
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let tags = tagger.tag_document(lines.iter().copied());
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (word, tag) in lines.iter().zip(tags) {
        match tag {
            Some(tag) => writeln!(out, "{word}\t{tag}")?,
            None => writeln!(out)?,
        }
    }
    out.flush()?;
    Ok(())
}

fn run(argv: &Argv) -> Result<f64> {
    let format = argv.format.unwrap_or_else(|| ModelFormat::from_path(&argv.model));
    let model = hmmtag::train(&argv.train)?;
    model.save(&argv.model, format)?;

    let tagger = model.tagger();
    if let Some(path) = &argv.tag {
        tag_file(&tagger, path)?;
    }
    let evaluation = evaluate_file(&tagger, &argv.eval)?;
    if argv.report {
        println!("{}", evaluation);
    }
    Ok(evaluation.accuracy())
}

fn main() -> ExitCode {
    let argv = Argv::parse();
    let level = match argv.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    log::info!("argv: {:?}", argv);

    match run(&argv) {
        Ok(accuracy) => {
            println!("{:?}", accuracy);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:?}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
