use crate::error::ThesaurusError;
use crate::thesaurus::ThesaurusBuffer;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Writes thesaurus rows as `word<TAB>neighbour<TAB>score` lines.
pub struct ThesaurusWriter<W: Write> {
    wrt: csv::Writer<W>,
    lines: usize,
    flushes: usize,
}

impl ThesaurusWriter<BufWriter<File>> {

    /// Creates (or truncates) the output file.
    pub fn create(output_file: &str) -> Result<Self, ThesaurusError> {
        let f = File::create(output_file).map_err(|source| ThesaurusError::Output {
            path: Path::new(output_file).to_path_buf(),
            source,
        })?;
        Ok(ThesaurusWriter::new(BufWriter::new(f)))
    }
}

impl<W: Write> ThesaurusWriter<W> {

    pub fn new(sink: W) -> Self {

        // raw fields, no header, unix line endings
        let wrt = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(sink);

        Self { wrt, lines: 0, flushes: 0 }
    }

    /// Writes every (neighbour, score) pair of every buffered word, in buffer
    /// order. Returns the number of lines written.
    pub fn write_buffer(&mut self, buffer: &ThesaurusBuffer) -> Result<usize, ThesaurusError> {

        let mut written = 0;
        for (word, neighbours) in buffer.entries() {
            for (neighbour, score) in neighbours {
                self.wrt.write_record([word.as_str(), neighbour.as_str(), format_score(*score).as_str()])?;
                written += 1;
            }
        }

        self.lines += written;
        self.flushes += 1;
        debug!("flush {}: {} words, {} lines", self.flushes, buffer.len(), written);
        Ok(written)
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Flushes everything still held and hands back the sink.
    pub fn close(self) -> Result<W, ThesaurusError> {
        let mut sink = self.wrt.into_inner().map_err(|e| e.into_error())?;
        sink.flush()?;
        Ok(sink)
    }

}

/// Renders a score the way python 2 `str(float)` does: `%.12g`, plus `.0`
/// when the result has neither a decimal point nor an exponent.
pub fn format_score(score: f64) -> String {

    if !score.is_finite() {
        return if score.is_nan() {
            "nan".to_string()
        } else if score > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }
    if score == 0.0 {
        return format!("{:.1}", score);
    }

    // the decimal exponent after rounding to 12 significant digits
    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, score);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exponent) => exponent,
        Err(_) => return scientific,
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs());
    }

    let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
    let fixed = format!("{:.*}", decimals, score);
    let fixed = trim_zeros(&fixed);
    if fixed.contains('.') {
        fixed.to_string()
    } else {
        format!("{}.0", fixed)
    }
}

const SIGNIFICANT_DIGITS: usize = 12;

// drops trailing zeros of the fraction, and the point if nothing is left
fn trim_zeros(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
