use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use flate2::read::GzDecoder;
use log::{debug, trace};
use tar::Archive;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported archive format for {0}")]
    UnsupportedFormat(String),
    #[error("Failed to read zip archive {path}: {source}")]
    Zip {
        path: String,
        source: zip::result::ZipError,
    },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// Unpacks archives into a directory.
pub trait ArchiveExtractor {
    /// Extracts every entry of `archive` under `destination`, keeping the
    /// archive's own layout.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Zip,
    TarGz,
    Tar,
}

const ZIP_EXTENSIONS: [&str; 7] = ["jar", "war", "ear", "aar", "zip", "nar", "rar"];

impl ArchiveFormat {
    fn from_file_name(name: &str) -> Option<ArchiveFormat> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            return Some(ArchiveFormat::TarGz);
        }
        let extension = name.rsplit_once('.').map(|(_, ext)| ext)?;
        if ZIP_EXTENSIONS.contains(&extension) {
            Some(ArchiveFormat::Zip)
        } else if extension == "tar" {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }

    fn sniff(path: &Path) -> Result<Option<ArchiveFormat>, std::io::Error> {
        let mut magic = [0u8; 4];
        let mut file = File::open(path)?;
        let read = file.read(&mut magic)?;
        Ok(match &magic[..read] {
            [b'P', b'K', 3, 4] => Some(ArchiveFormat::Zip),
            [0x1f, 0x8b, ..] => Some(ArchiveFormat::TarGz),
            _ => None,
        })
    }
}

/// Handles the zip family (jar, war, ear, ...), tar and gzipped tar.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultArchiveExtractor;

impl DefaultArchiveExtractor {
    fn extract_zip(&self, archive: &Path, destination: &Path) -> Result<(), ExtractError> {
        let to_error = |source| ExtractError::Zip {
            path: archive.display().to_string(),
            source,
        };
        let mut zip = zip::ZipArchive::new(BufReader::new(File::open(archive)?)).map_err(to_error)?;

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(to_error)?;
            let out_path = match entry.enclosed_name() {
                Some(path) => destination.join(path),
                None => {
                    debug!("Skipping unsafe zip entry {}", entry.name());
                    continue;
                }
            };

            if entry.is_dir() {
                std::fs::create_dir_all(&out_path)?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            trace!("Extracting {}", out_path.display());
            let mut out = File::create(&out_path)?;
            std::io::copy(&mut entry, &mut out)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))?;
            }
        }
        Ok(())
    }

    fn extract_tar<R: Read>(&self, reader: R, destination: &Path) -> Result<(), ExtractError> {
        let mut archive = Archive::new(reader);
        archive.set_preserve_permissions(true);
        archive.unpack(destination)?;
        Ok(())
    }
}

impl ArchiveExtractor for DefaultArchiveExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<(), ExtractError> {
        let file_name = archive
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let format = match ArchiveFormat::from_file_name(&file_name) {
            Some(format) => format,
            None => ArchiveFormat::sniff(archive)?
                .ok_or_else(|| ExtractError::UnsupportedFormat(archive.display().to_string()))?,
        };

        debug!(
            "Extracting {} ({:?}) into {}",
            archive.display(),
            format,
            destination.display()
        );
        std::fs::create_dir_all(destination)?;
        match format {
            ArchiveFormat::Zip => self.extract_zip(archive, destination),
            ArchiveFormat::TarGz => self.extract_tar(
                GzDecoder::new(BufReader::new(File::open(archive)?)),
                destination,
            ),
            ArchiveFormat::Tar => self.extract_tar(BufReader::new(File::open(archive)?), destination),
        }
    }
}
