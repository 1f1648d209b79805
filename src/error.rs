use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a word2vec model from disk.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("could not read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read model data: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid model header: {0}")]
    Header(String),

    #[error("model record {index} is truncated")]
    Truncated { index: usize },

    #[error("model record {index} holds a word that is not valid utf-8")]
    InvalidWord { index: usize },

    #[error("model record {index} has a bad vector: {reason}")]
    InvalidVector { index: usize, reason: String },

    #[error("vocabulary holds {words} words but {rows} vectors were given")]
    ShapeMismatch { words: usize, rows: usize },
}

/// Errors raised while reading the run parameters.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("input should be a path to a json file only, got {0} arguments")]
    Arguments(usize),

    #[error("cannot open json file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read json file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} must be at least 1")]
    NotPositive(&'static str),
}

/// Errors raised while computing or writing the thesaurus.
#[derive(Error, Debug)]
pub enum ThesaurusError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("token: {0} is not in the model vocabulary")]
    UnknownWord(String),

    #[error("could not open output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write thesaurus rows: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not flush thesaurus rows: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not build query thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
