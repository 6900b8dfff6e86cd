use super::format::SpectrumFormat;
use crate::errors::{
    BullseyeError,
    Result,
};
use crate::models::{
    ChargeState,
    MsmsSpectrum,
};
use mzdata::Param;
use mzdata::io::mgf::MGFWriterType;
use mzdata::mzpeaks::{
    CentroidPeak,
    MZPeakSetType,
};
use mzdata::prelude::{
    ParamDescribed,
    PrecursorSelection,
    SpectrumWriter as MzSpectrumWriter,
};
use mzdata::spectrum::{
    MultiLayerSpectrum,
    Precursor,
    SelectedIon,
    SignalContinuity,
};
use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;

/// Sink for spectra in one container format.
pub trait SpectrumWriter {
    fn write_header(&mut self, header: &[String]) -> std::io::Result<()>;
    fn write_spectrum(&mut self, spectrum: &MsmsSpectrum) -> std::io::Result<()>;
    fn flush(&mut self) -> std::io::Result<()>;
}

pub struct Ms2Writer<W: Write> {
    inner: W,
    mz_precision: usize,
}

impl<W: Write> Ms2Writer<W> {
    pub fn new(inner: W, mz_precision: usize) -> Self {
        Self {
            inner,
            mz_precision,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> SpectrumWriter for Ms2Writer<W> {
    fn write_header(&mut self, header: &[String]) -> std::io::Result<()> {
        for line in header {
            writeln!(self.inner, "H\t{}", line)?;
        }
        Ok(())
    }

    fn write_spectrum(&mut self, s: &MsmsSpectrum) -> std::io::Result<()> {
        let p = self.mz_precision;
        writeln!(
            self.inner,
            "S\t{:06}\t{:06}\t{:.*}",
            s.first_scan, s.last_scan, p, s.precursor_mz
        )?;
        writeln!(self.inner, "I\tRTime\t{:.4}", s.retention_time)?;
        if let Some(cv) = s.compensation_voltage {
            writeln!(self.inner, "I\tCompensationVoltage\t{:.4}", cv)?;
        }
        for (key, value) in &s.info {
            writeln!(self.inner, "I\t{}\t{}", key, value)?;
        }
        for ez in &s.ez_states {
            writeln!(
                self.inner,
                "I\tEZ\t{}\t{:.4}\t{:.4}\t{:.4}",
                ez.charge, ez.mh, ez.retention_time, ez.sum_intensity
            )?;
        }
        for z in &s.charge_states {
            writeln!(self.inner, "Z\t{}\t{:.*}", z.charge, p, z.mh)?;
        }
        for d in &s.dependent_lines {
            writeln!(self.inner, "D\t{}", d)?;
        }
        for peak in &s.peaks {
            writeln!(self.inner, "{:.*} {:.1}", p, peak.mz, peak.intensity)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Writes Mascot generic format through `mzdata`, one block per charge state.
pub struct MgfWriter<W: Write> {
    inner: MGFWriterType<W>,
}

impl<W: Write> MgfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: MGFWriterType::new(inner),
        }
    }

    fn to_block(
        s: &MsmsSpectrum,
        charge: Option<&ChargeState>,
        index: usize,
    ) -> MultiLayerSpectrum {
        let mut block = MultiLayerSpectrum::default();
        let description = &mut block.description;
        description.id = match &s.title {
            Some(t) => t.clone(),
            None => format!(
                "{}.{}.{}",
                s.first_scan,
                s.last_scan,
                charge.map(|c| c.charge).unwrap_or(0)
            ),
        };
        description.index = index;
        description.ms_level = 2;
        description.signal_continuity = SignalContinuity::Centroid;
        if let Some(event) = description.acquisition.first_scan_mut() {
            event.start_time = s.retention_time as f64;
        }

        let mut precursor = Precursor::default();
        *precursor.ion_mut() = SelectedIon {
            mz: charge.map(|c| c.mz()).unwrap_or(s.precursor_mz),
            charge: charge.map(|c| c.charge),
            ..Default::default()
        };
        description.precursor = Some(precursor);

        let scans = if s.first_scan == s.last_scan {
            s.first_scan.to_string()
        } else {
            format!("{}-{}", s.first_scan, s.last_scan)
        };
        description.add_param(Param::new_key_value("SCANS", scans));
        for (key, value) in &s.info {
            description.add_param(Param::new_key_value(key.as_str(), value.as_str()));
        }

        let peaks: Vec<CentroidPeak> = s
            .peaks
            .iter()
            .enumerate()
            .map(|(i, p)| CentroidPeak::new(p.mz, p.intensity, i as u32))
            .collect();
        block.peaks = Some(MZPeakSetType::new(peaks));
        block
    }
}

impl<W: Write> SpectrumWriter for MgfWriter<W> {
    /// MGF files carry no copy of the source header.
    fn write_header(&mut self, _header: &[String]) -> std::io::Result<()> {
        Ok(())
    }

    /// One block per charge state, or a single uncharged block.
    fn write_spectrum(&mut self, s: &MsmsSpectrum) -> std::io::Result<()> {
        if s.charge_states.is_empty() {
            let block = Self::to_block(s, None, 0);
            MzSpectrumWriter::write(&mut self.inner, &block)?;
            return Ok(());
        }
        for (i, z) in s.charge_states.iter().enumerate() {
            let block = Self::to_block(s, Some(z), i);
            MzSpectrumWriter::write(&mut self.inner, &block)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        MzSpectrumWriter::flush(&mut self.inner)
    }
}

/// Buffers spectra and hands them to the underlying writer in batches.
pub struct BatchedSpectrumWriter {
    writer: Box<dyn SpectrumWriter>,
    buffer: Vec<MsmsSpectrum>,
    batch_size: usize,
    path: PathBuf,
    num_written: usize,
}

impl BatchedSpectrumWriter {
    pub fn new(
        writer: Box<dyn SpectrumWriter>,
        batch_size: usize,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            writer,
            buffer: Vec::with_capacity(batch_size + 1),
            batch_size,
            path: path.into(),
            num_written: 0,
        }
    }

    /// Creates the output file, picking the writer from its extension and
    /// writing the header right away.
    pub fn create(
        path: &Path,
        header: &[String],
        batch_size: usize,
        mz_precision: usize,
    ) -> Result<Self> {
        let format = SpectrumFormat::from_path(path);
        if !format.is_writable() {
            return Err(BullseyeError::UnsupportedOutputFormat {
                path: path.to_path_buf(),
                format,
            });
        }
        let file = BufWriter::new(File::create(path).map_err(BullseyeError::io(path))?);
        let mut writer: Box<dyn SpectrumWriter> = match format {
            SpectrumFormat::Mgf => Box::new(MgfWriter::new(file)),
            _ => Box::new(Ms2Writer::new(file, mz_precision)),
        };
        writer
            .write_header(header)
            .map_err(BullseyeError::io(path))?;
        Ok(Self::new(writer, batch_size, path))
    }

    pub fn push(&mut self, spectrum: MsmsSpectrum) -> Result<()> {
        self.buffer.push(spectrum);
        if self.buffer.len() > self.batch_size {
            self.write_batch()?;
        }
        Ok(())
    }

    fn write_batch(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        debug!(
            "Writing {} spectra to {}",
            self.buffer.len(),
            self.path.display()
        );
        let n = self.buffer.len();
        for s in self.buffer.drain(..) {
            if let Err(source) = self.writer.write_spectrum(&s) {
                return Err(BullseyeError::Io {
                    source,
                    path: self.path.clone(),
                });
            }
        }
        self.num_written += n;
        Ok(())
    }

    /// Writes what is left and flushes, returning the number of spectra written.
    pub fn finish(mut self) -> Result<usize> {
        self.write_batch()?;
        self.writer.flush().map_err(BullseyeError::io(&self.path))?;
        Ok(self.num_written)
    }

    pub fn num_buffered(&self) -> usize {
        self.buffer.len()
    }
}
