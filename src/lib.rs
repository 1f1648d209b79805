mod run;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod similarity;
pub mod thesaurus;
pub mod writer;

pub use run::Run;
pub use config::{Config, Params};
pub use model::Model;
pub use similarity::Similarity;
pub use thesaurus::{BuildStats, Thesaurus};
