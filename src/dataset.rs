use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::error::{Error, Result};

/// One line of a tagged corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `word<TAB>tag`
    Token { word: &'a str, tag: &'a str },
    /// Empty or whitespace-only line, closing the current sentence.
    Boundary,
}

/// Parses one line of a `word<TAB>tag` corpus. `line_no` is 1-based and only
/// used for error reporting.
pub fn parse_line(line_no: usize, line: &str) -> Result<Line<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Line::Boundary);
    }
    let mut fields = line.split('\t');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(word), Some(tag), None) => Ok(Line::Token { word, tag }),
        _ => Err(Error::InputFormat { line: line_no, content: line.to_string() }),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl Sentence {
    pub fn push(&mut self, word: &str, tag: &str) {
        self.words.push(word.to_string());
        self.tags.push(tag.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.tags.clear();
    }

    pub fn words(&self) -> Vec<&str> {
        self.words.iter().map(String::as_str).collect()
    }
}

/// Tagged sentences read from a `word<TAB>tag` corpus. Blank lines separate
/// sentences; runs of blank lines never produce empty sentences.
#[derive(Debug, Default)]
pub struct Dataset {
    pub seqs: Vec<Sentence>,
}

impl Dataset {
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut ds = Dataset::default();
        let mut seq = Sentence::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            match parse_line(i + 1, &line)? {
                Line::Token { word, tag } => seq.push(word, tag),
                Line::Boundary => ds.push(std::mem::take(&mut seq)),
            }
        }
        ds.push(seq);
        Ok(ds)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| Error::file(path, e))?;
        Self::read(BufReader::new(f)).map_err(|e| match e {
            Error::Io(source) => Error::file(path, source),
            e => e,
        })
    }

    fn push(&mut self, seq: Sentence) {
        if !seq.is_empty() {
            self.seqs.push(seq);
        }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).sum()
    }
}

impl TryFrom<File> for Dataset {
    type Error = Error;

    fn try_from(value: File) -> Result<Self> {
        Self::read(BufReader::new(value))
    }
}

impl TryFrom<&str> for Dataset {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::read(value.as_bytes())
    }
}
