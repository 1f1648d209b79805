use crate::error::ModelError;
use flate2::read::GzDecoder;
use ndarray::{Array2, ArrayView1};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

/// A pretrained word embedding model in vocabulary order.
///
/// Rows of `vectors` follow the order of the records in the model file, which
/// for word2vec dumps is the frequency rank of the words.
#[derive(Debug, Clone)]
pub struct Model {
    words: Vec<String>,
    t2i: HashMap<String, usize>,
    vectors: Array2<f32>,
}

impl Model {

    pub fn from_parts(words: Vec<String>, vectors: Array2<f32>) -> Result<Model, ModelError> {

        if words.len() != vectors.dim().0 {
            return Err(ModelError::ShapeMismatch { words: words.len(), rows: vectors.dim().0 });
        }

        // a repeated word keeps the row of its first record
        let mut t2i: HashMap<String, usize> = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            t2i.entry(word.to_owned()).or_insert(i);
        }

        Ok(Self { words, t2i, vectors })
    }

    /// Loads a word2vec model, either the binary or the text layout.
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn load(file_path: &str, binary: bool, limit: Option<usize>) -> Result<Model, ModelError> {

        let f = File::open(file_path).map_err(|source| ModelError::Io {
            path: Path::new(file_path).to_path_buf(),
            source,
        })?;

        if file_path.ends_with(".gz") {
            Model::read(BufReader::new(GzDecoder::new(f)), binary, limit)
        } else {
            Model::read(BufReader::new(f), binary, limit)
        }
    }

    pub fn read<R: BufRead>(mut reader: R, binary: bool, limit: Option<usize>) -> Result<Model, ModelError> {

        let (header_size, dim) = Model::read_header(&mut reader)?;
        let vocab_size = match limit {
            Some(limit) => header_size.min(limit),
            None => header_size,
        };

        // storage grows with the records actually read, a lying header ends in `Truncated`
        let mut words: Vec<String> = Vec::new();
        let mut data: Vec<f32> = Vec::new();

        let mut row: Vec<f32> = vec![0.0; dim];
        for index in 0..vocab_size {
            let word = if binary {
                Model::read_binary_record(&mut reader, index, &mut row)?
            } else {
                Model::read_text_record(&mut reader, index, &mut row)?
            };
            data.extend_from_slice(&row);
            words.push(word);
        }

        let rows = words.len();
        let vectors = Array2::from_shape_vec((rows, dim), data)
            .map_err(|_| ModelError::ShapeMismatch { words: rows, rows })?;
        Model::from_parts(words, vectors)
    }

    fn read_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize), ModelError> {

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(ModelError::Header("file is empty".to_string()));
        }

        let mut fields = line.split_whitespace();
        let mut next_number = |name: &str| -> Result<usize, ModelError> {
            fields
                .next()
                .ok_or_else(|| ModelError::Header(format!("missing {}", name)))?
                .parse::<usize>()
                .map_err(|e| ModelError::Header(format!("bad {}: {}", name, e)))
        };
        let vocab_size = next_number("vocabulary size")?;
        let dim = next_number("vector size")?;

        if dim == 0 {
            return Err(ModelError::Header("vector size must be positive".to_string()));
        }
        let fits = vocab_size
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()))
            .map_or(false, |bytes| bytes <= isize::MAX as usize);
        if !fits {
            return Err(ModelError::Header(format!("{} x {} vectors do not fit in memory", vocab_size, dim)));
        }
        Ok((vocab_size, dim))
    }

    // binary record: the word up to a space, then `dim` little endian f32
    fn read_binary_record<R: BufRead>(reader: &mut R, index: usize, row: &mut [f32]) -> Result<String, ModelError> {

        let mut word: Vec<u8> = Vec::new();
        reader.read_until(b' ', &mut word)?;
        if word.pop() != Some(b' ') {
            return Err(ModelError::Truncated { index });
        }
        // the newline closing the previous vector ends up in front of the word
        word.retain(|c| *c != b'\n');
        let word = String::from_utf8(word).map_err(|_| ModelError::InvalidWord { index })?;

        let mut bytes = vec![0u8; row.len() * 4];
        match reader.read_exact(&mut bytes) {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(ModelError::Truncated { index }),
            Err(e) => return Err(e.into()),
        }
        for (value, chunk) in row.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        Ok(word)
    }

    // text record: `word v1 v2 ... vdim` on one line
    fn read_text_record<R: BufRead>(reader: &mut R, index: usize, row: &mut [f32]) -> Result<String, ModelError> {

        let mut line: Vec<u8> = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Err(ModelError::Truncated { index });
        }
        let line = String::from_utf8(line).map_err(|_| ModelError::InvalidWord { index })?;

        let parts: Vec<&str> = line.trim_end().split(' ').collect();
        if parts.len() != row.len() + 1 {
            return Err(ModelError::InvalidVector {
                index,
                reason: format!("expected {} values, found {}", row.len(), parts.len().saturating_sub(1)),
            });
        }

        for (value, part) in row.iter_mut().zip(&parts[1..]) {
            *value = part.parse::<f32>().map_err(|e| ModelError::InvalidVector {
                index,
                reason: format!("{:?}: {}", part, e),
            })?;
        }

        Ok(parts[0].to_string())
    }

    pub fn vocab(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.vectors.dim().1
    }

    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.t2i.get(word).copied()
    }

    pub fn vector(&self, word: &str) -> Option<ArrayView1<'_, f32>> {
        self.index_of(word).map(|i| self.vectors.row(i))
    }

}
