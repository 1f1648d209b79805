use crate::error::ConfigError;
use serde::Deserialize;
use std::{fmt::Display, fs::File, io::BufReader};

pub const DEFAULT_MODEL_FILE: &str = "../resrc/GoogleNews-vectors-negative300.bin";
pub const DEFAULT_OUTPUT_FILE: &str = "../resrc/similarities.csv";
pub const DEFAULT_FLUSH_EVERY: usize = 1001;
pub const DEFAULT_TOP_K: usize = 200;

/// Parameters of one thesaurus run. Every key of the json file is optional,
/// missing keys keep the defaults below.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    pub model_file: String,
    pub output_file: String,
    pub flush_every: usize,
    pub top_k: usize,
    pub binary: bool,
    pub limit: Option<usize>,
    pub num_threads: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            model_file: DEFAULT_MODEL_FILE.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            flush_every: DEFAULT_FLUSH_EVERY,
            top_k: DEFAULT_TOP_K,
            binary: true,
            limit: None,
            num_threads: 1,
        }
    }
}

impl Params {

    /// Value of the words-since-last-flush counter at which the buffer is written out.
    pub fn flush_threshold(&self) -> usize {
        self.flush_every - 1
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.flush_every == 0 {
            return Err(ConfigError::NotPositive("flush_every"));
        }
        if self.top_k == 0 {
            return Err(ConfigError::NotPositive("top_k"));
        }
        if self.num_threads == 0 {
            return Err(ConfigError::NotPositive("num_threads"));
        }
        Ok(self)
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using params: model_file: {}, output_file: {}, flush_every: {}, top_k: {}, binary: {}, limit: {:?}, num_threads: {}",
        self.model_file, self.output_file, self.flush_every, self.top_k, self.binary, self.limit, self.num_threads)
    }
}

pub struct Config {
    params: Params
}

impl Config {

    pub fn get_params(&self) -> Params {
        self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config, ConfigError> {

        // no argument runs with the built-in paths, one argument is a json file of overrides
        let params = match args.len() {
            0 | 1 => Params::default(),
            2 => Config::read_json(&args[1])?,
            n => return Err(ConfigError::Arguments(n - 1)),
        };

        Ok(Self { params: params.validate()? })
    }

    fn read_json(file_path: &str) -> Result<Params, ConfigError> {
        let f = File::open(file_path).map_err(|source| ConfigError::Io {
            path: file_path.to_string(),
            source,
        })?;
        let params = serde_json::from_reader(BufReader::new(f))?;
        Ok(params)
    }

}
