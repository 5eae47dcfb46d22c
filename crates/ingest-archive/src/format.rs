use std::fmt;
use std::io::Read;

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    Tar(TarCompress),
    Rar,
}

/// Compression codec for tar archives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TarCompress {
    None,
    Gzip,
}

/// Recognized suffixes. They are mutually exclusive, so order does not matter.
const SUFFIXES: &[(&str, ArchiveFormat)] = &[
    (".zip", ArchiveFormat::Zip),
    (".tar", ArchiveFormat::Tar(TarCompress::None)),
    (".tar.gz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".tgz", ArchiveFormat::Tar(TarCompress::Gzip)),
    (".rar", ArchiveFormat::Rar),
];

impl ArchiveFormat {
    /// Classify a file name by its (case-insensitive) suffix.
    ///
    /// Returns `None` for anything that is not a supported archive.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix))
            .map(|&(_, format)| format)
    }
}

/// Whether `name` would be expanded rather than stored as-is.
pub fn is_archive_name(name: &str) -> bool {
    ArchiveFormat::from_name(name).is_some()
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::Tar(TarCompress::None) => f.write_str("tar"),
            Self::Tar(TarCompress::Gzip) => f.write_str("tar.gz"),
            Self::Rar => f.write_str("rar"),
        }
    }
}

impl TarCompress {
    /// Create a decoder for this compression codec.
    pub fn decoder<R: Read>(self, reader: R) -> Result<Decoder<R>, Error> {
        match self {
            Self::None => Ok(Decoder::Passthrough(reader)),
            Self::Gzip => Ok(Decoder::Gzip(Box::new(flate2::read::GzDecoder::new(
                reader,
            )))),
        }
    }
}

/// Decoder wrapper for tar decompression.
#[derive(Debug)]
pub enum Decoder<R> {
    Passthrough(R),
    Gzip(Box<flate2::read::GzDecoder<R>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Passthrough(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn classify_supported_suffixes() {
        assert_eq!(ArchiveFormat::from_name("a.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(
            ArchiveFormat::from_name("a.tar"),
            Some(ArchiveFormat::Tar(TarCompress::None))
        );
        assert_eq!(
            ArchiveFormat::from_name("a.tar.gz"),
            Some(ArchiveFormat::Tar(TarCompress::Gzip))
        );
        assert_eq!(
            ArchiveFormat::from_name("a.tgz"),
            Some(ArchiveFormat::Tar(TarCompress::Gzip))
        );
        assert_eq!(ArchiveFormat::from_name("a.rar"), Some(ArchiveFormat::Rar));
    }

    #[test]
    fn classify_ignores_case() {
        assert_eq!(ArchiveFormat::from_name("BACKUP.ZIP"), Some(ArchiveFormat::Zip));
        assert_eq!(
            ArchiveFormat::from_name("Site.Tar.Gz"),
            Some(ArchiveFormat::Tar(TarCompress::Gzip))
        );
    }

    #[test]
    fn classify_rejects_everything_else() {
        for name in ["notes.txt", "a.gz", "a.7z", "zip", "a.zip.bak", "tar.gz.txt", ""] {
            assert_eq!(ArchiveFormat::from_name(name), None, "{name}");
        }
    }

    #[test]
    fn gz_alone_is_not_a_tar() {
        assert!(!is_archive_name("dump.sql.gz"));
        assert!(is_archive_name("dump.tar.gz"));
    }

    #[test]
    fn display_names() {
        assert_eq!(ArchiveFormat::Zip.to_string(), "zip");
        assert_eq!(ArchiveFormat::Tar(TarCompress::Gzip).to_string(), "tar.gz");
    }

    #[test]
    fn compression_none_decoder() {
        let decoder = TarCompress::None.decoder(Cursor::new(b"hello")).unwrap();
        assert!(matches!(decoder, Decoder::Passthrough(_)));
    }

    #[test]
    fn compression_gzip_decoder() {
        let decoder = TarCompress::Gzip.decoder(Cursor::new(vec![0x1f, 0x8b])).unwrap();
        assert!(matches!(decoder, Decoder::Gzip(_)));
    }
}
