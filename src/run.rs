use crate::config::Params;
use crate::error::ThesaurusError;
use crate::model::Model;
use crate::similarity::Similarity;
use crate::thesaurus::{BuildStats, Thesaurus};
use crate::writer::ThesaurusWriter;
use std::time::Instant;
use tracing::{debug, info};

pub struct Run {}

impl Run {

    // runs the whole job -
    // -> load the model
    // -> query the neighbours of every word, flushing rows as we go
    pub fn run(params: &Params) -> Result<BuildStats, ThesaurusError> {

        debug!("{}", params);

        let my_time = Instant::now();
        let model = Model::load(&params.model_file, params.binary, params.limit)?;
        info!("Loaded model in {} seconds", my_time.elapsed().as_secs_f64());
        debug!("vocabulary of {} words, {} dimensions", model.len(), model.dim());

        let my_time = Instant::now();
        let sim = Similarity::new(&model);
        let mut wrt = ThesaurusWriter::create(&params.output_file)?;
        let stats = Thesaurus::build(&sim, params, &mut wrt)?;
        wrt.close()?;
        info!("Computed thesaurus in {} seconds", my_time.elapsed().as_secs_f64());

        Ok(stats)
    }

}


#[cfg(test)]
mod tests {

    use super::Run;
    use crate::config::Params;
    use crate::error::{ModelError, ThesaurusError};
    use crate::logging::tests::Captured;
    use crate::logging::AsctimeFormat;
    use crate::model::tests::write_binary;

    #[test]
    fn writes_thesaurus_for_model_on_disk() {

        let dir = tempfile::tempdir().unwrap();
        let model_file = dir.path().join("vectors.bin");
        let output_file = dir.path().join("similarities.csv");
        let words = ["cat", "dog", "car", "bus"];
        let vecs = vec![
            vec![1.0, 0.5, 0.0],
            vec![0.9, 0.7, 0.1],
            vec![-0.2, 0.1, 1.0],
            vec![-0.1, 0.3, 0.9],
        ];
        write_binary(&model_file, &words, &vecs);

        let params = Params {
            model_file: model_file.display().to_string(),
            output_file: output_file.display().to_string(),
            ..Params::default()
        };
        let stats = Run::run(&params).unwrap();
        assert_eq!(stats.words, 4);
        assert_eq!(stats.lines, 12);

        let first = std::fs::read(&output_file).unwrap();
        let text = String::from_utf8(first.clone()).unwrap();
        assert_eq!(text.lines().count(), 12);
        assert!(text.starts_with("cat\tdog\t"));
        assert!(text.lines().all(|l| l.split('\t').count() == 3));

        // a second run over the same model gives the same bytes
        Run::run(&params).unwrap();
        assert_eq!(std::fs::read(&output_file).unwrap(), first);
    }

    #[test]
    fn console_shows_only_the_two_timing_lines() {

        let dir = tempfile::tempdir().unwrap();
        let model_file = dir.path().join("vectors.bin");
        write_binary(&model_file, &["cat", "dog"], &[vec![1.0, 0.0], vec![0.5, 0.5]]);
        let params = Params {
            model_file: model_file.display().to_string(),
            output_file: dir.path().join("similarities.csv").display().to_string(),
            ..Params::default()
        };

        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(captured.clone())
            .event_format(AsctimeFormat)
            .finish();
        tracing::subscriber::with_default(subscriber, || Run::run(&params).unwrap());

        let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let messages: Vec<&str> = out.lines().map(|l| l.splitn(3, " : ").nth(2).unwrap()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Loaded model in ") && messages[0].ends_with(" seconds"));
        assert!(messages[1].starts_with("Computed thesaurus in ") && messages[1].ends_with(" seconds"));
        assert!(out.lines().all(|l| l.contains(" : INFO : ")));
    }

    #[test]
    fn missing_model_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let params = Params {
            model_file: dir.path().join("nope.bin").display().to_string(),
            output_file: dir.path().join("out.csv").display().to_string(),
            ..Params::default()
        };
        assert!(matches!(Run::run(&params), Err(ThesaurusError::Model(ModelError::Io { .. }))));
        assert!(!dir.path().join("out.csv").exists());
    }
}
