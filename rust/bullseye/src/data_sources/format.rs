use serde::Serialize;
use std::path::Path;

/// Spectrum container formats recognized from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpectrumFormat {
    Ms1,
    Ms2,
    Bms1,
    Bms2,
    Cms1,
    Cms2,
    Zs,
    Uzs,
    Mgf,
    MzXml,
    MzMl,
    Raw,
    Unknown,
}

impl SpectrumFormat {
    /// Format implied by the extension (after the last `.`), case insensitive.
    ///
    /// ```
    /// use bullseye::data_sources::SpectrumFormat;
    ///
    /// assert_eq!(SpectrumFormat::from_path("run.01.MS2"), SpectrumFormat::Ms2);
    /// assert_eq!(SpectrumFormat::from_path("run.mzXML"), SpectrumFormat::MzXml);
    /// assert_eq!(SpectrumFormat::from_path("run"), SpectrumFormat::Unknown);
    /// ```
    pub fn from_path<T: AsRef<Path>>(path: T) -> Self {
        let Some(ext) = path.as_ref().extension().and_then(|e| e.to_str()) else {
            return Self::Unknown;
        };
        const KNOWN: [(&str, SpectrumFormat); 12] = [
            ("ms1", SpectrumFormat::Ms1),
            ("ms2", SpectrumFormat::Ms2),
            ("bms1", SpectrumFormat::Bms1),
            ("bms2", SpectrumFormat::Bms2),
            ("cms1", SpectrumFormat::Cms1),
            ("cms2", SpectrumFormat::Cms2),
            ("zs", SpectrumFormat::Zs),
            ("uzs", SpectrumFormat::Uzs),
            ("mgf", SpectrumFormat::Mgf),
            ("mzxml", SpectrumFormat::MzXml),
            ("mzml", SpectrumFormat::MzMl),
            ("raw", SpectrumFormat::Raw),
        ];
        KNOWN
            .iter()
            .find(|(name, _)| ext.eq_ignore_ascii_case(name))
            .map(|(_, fmt)| *fmt)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Ms2 | Self::Mgf | Self::MzMl)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Ms2 | Self::Mgf)
    }
}
