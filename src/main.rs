use std::env;
use std::error::Error;
use thesaurus_builder::{logging, Config, Run};

// loads the word2vec model and writes the nearest neighbour thesaurus.
// optional single argument: a json file overriding the default paths and sizes

fn main() -> Result<(), Box<dyn Error>> {

    logging::init();
    let args: Vec<String> = env::args().collect();
    let params = Config::new(&args)?.get_params();

    Run::run(&params)?;
    Ok(())
}
