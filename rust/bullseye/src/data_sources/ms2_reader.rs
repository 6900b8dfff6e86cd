use crate::errors::SpectrumReadingError;
use crate::models::{
    ChargeState,
    ExtendedChargeState,
    MsmsSpectrum,
    Peak,
};
use std::io::BufRead;
use std::str::FromStr;

/// Streaming reader over `.ms2` text files.
///
/// Header (`H`) lines are consumed on construction, spectra are then
/// yielded one at a time.
pub struct Ms2Reader<R: BufRead> {
    reader: R,
    header: Vec<String>,
    current: Option<MsmsSpectrum>,
    line_number: usize,
    buf: String,
    finished: bool,
}

fn malformed(line: usize, content: &str, context: &'static str) -> SpectrumReadingError {
    SpectrumReadingError::MalformedLine {
        line,
        content: content.to_string(),
        context,
    }
}

fn parse_token<T: FromStr>(
    token: Option<&str>,
    line: usize,
    content: &str,
    context: &'static str,
) -> Result<T, SpectrumReadingError> {
    token
        .map(str::trim)
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| malformed(line, content, context))
}

impl<R: BufRead> Ms2Reader<R> {
    pub fn new(reader: R) -> Result<Self, SpectrumReadingError> {
        let mut out = Self {
            reader,
            header: Vec::new(),
            current: None,
            line_number: 0,
            buf: String::new(),
            finished: false,
        };
        // Everything up to the first spectrum is header
        while out.current.is_none() {
            let Some(line) = out.read_line()? else {
                break;
            };
            if let Some(rest) = line.strip_prefix('H') {
                out.header.push(rest.trim_start_matches('\t').to_string());
            } else if line.starts_with('S') {
                out.current = Some(Self::parse_scan_line(&line, out.line_number)?);
            } else {
                return Err(malformed(
                    out.line_number,
                    &line,
                    "expected a header or scan line",
                ));
            }
        }
        Ok(out)
    }

    /// Header lines without the leading `H` tag.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Next non empty line, trailing line breaks removed.
    fn read_line(&mut self) -> Result<Option<String>, SpectrumReadingError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line = self.buf.trim_end_matches(['\r', '\n']);
            if !line.trim().is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    fn parse_scan_line(line: &str, ln: usize) -> Result<MsmsSpectrum, SpectrumReadingError> {
        let mut tokens = line.split_whitespace().skip(1);
        let first: u32 = parse_token(tokens.next(), ln, line, "invalid first scan")?;
        let last: u32 = parse_token(tokens.next(), ln, line, "invalid last scan")?;
        let mz: f64 = parse_token(tokens.next(), ln, line, "invalid precursor m/z")?;
        Ok(MsmsSpectrum::new(first, last, mz))
    }

    fn apply_line(
        spectrum: &mut MsmsSpectrum,
        line: &str,
        ln: usize,
    ) -> Result<(), SpectrumReadingError> {
        match line.as_bytes().first() {
            Some(b'I') => {
                let mut parts = line.splitn(3, '\t').skip(1);
                let key = parts.next().unwrap_or("").trim();
                let value = parts.next().unwrap_or("").trim();
                match key {
                    "RTime" => {
                        spectrum.retention_time =
                            parse_token(Some(value), ln, line, "invalid retention time")?;
                    }
                    "CompensationVoltage" | "CV" => {
                        let cv = parse_token(Some(value), ln, line, "invalid compensation voltage")?;
                        spectrum.compensation_voltage = Some(cv);
                    }
                    "EZ" => {
                        let mut t = value.split_whitespace();
                        spectrum.ez_states.push(ExtendedChargeState {
                            charge: parse_token(t.next(), ln, line, "invalid EZ charge")?,
                            mh: parse_token(t.next(), ln, line, "invalid EZ mass")?,
                            retention_time: parse_token(t.next(), ln, line, "invalid EZ rtime")?,
                            sum_intensity: parse_token(t.next(), ln, line, "invalid EZ area")?,
                        });
                    }
                    _ => spectrum.info.push((key.to_string(), value.to_string())),
                }
            }
            Some(b'Z') => {
                let mut t = line.split_whitespace().skip(1);
                spectrum.charge_states.push(ChargeState {
                    charge: parse_token(t.next(), ln, line, "invalid charge")?,
                    mh: parse_token(t.next(), ln, line, "invalid charge state mass")?,
                });
            }
            Some(b'D') => {
                spectrum
                    .dependent_lines
                    .push(line[1..].trim_start_matches('\t').to_string());
            }
            _ => {
                let mut t = line.split_whitespace();
                spectrum.peaks.push(Peak {
                    mz: parse_token(t.next(), ln, line, "invalid peak m/z")?,
                    intensity: parse_token(t.next(), ln, line, "invalid peak intensity")?,
                });
            }
        }
        Ok(())
    }

    fn next_spectrum(&mut self) -> Result<Option<MsmsSpectrum>, SpectrumReadingError> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(self.current.take());
            };
            let ln = self.line_number;
            if line.starts_with('S') {
                let next = Self::parse_scan_line(&line, ln)?;
                if let Some(done) = self.current.replace(next) {
                    return Ok(Some(done));
                }
                continue;
            }
            let Some(spectrum) = self.current.as_mut() else {
                return Err(malformed(ln, &line, "data before any scan line"));
            };
            Self::apply_line(spectrum, &line, ln)?;
        }
    }
}

impl<R: BufRead> Iterator for Ms2Reader<R> {
    type Item = Result<MsmsSpectrum, SpectrumReadingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_spectrum() {
            Ok(Some(s)) => Some(Ok(s)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
