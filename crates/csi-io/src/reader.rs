use std::{
    fs::File,
    io::{Cursor, Read},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use csi_core::CsiError;
use polars::io::mmap::MmapBytesReader;
use polars::prelude::*;
#[cfg(feature = "ipc")]
use polars::prelude::IpcReader;
#[cfg(feature = "parquet")]
use polars::prelude::ParquetReader;
use tracing::{debug, info};
use ::zip::ZipArchive;

/// Rows scanned when inferring CSV column types. Cost and capacity columns
/// are sparse in early rows, so the polars default of 100 is too few.
const CSV_INFER_ROWS: usize = 10_000;

/// On-disk table encodings understood by [`read_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
    Ipc,
    /// Archive wrapping one table in any of the other formats.
    Zip,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        Self::from_extension(&extension).ok_or_else(|| {
            anyhow!(
                "unsupported file extension '{}' for {}; use .csv, .parquet, .arrow, .ipc, .feather or .zip",
                extension,
                path.display()
            )
        })
    }

    fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "csv" => Some(TableFormat::Csv),
            "parquet" => Some(TableFormat::Parquet),
            "arrow" | "ipc" | "feather" => Some(TableFormat::Ipc),
            "zip" => Some(TableFormat::Zip),
            _ => None,
        }
    }
}

/// Read the installation table from `path`, choosing the decoder by extension.
///
/// A `.zip` input is searched for the first entry whose own extension is a
/// supported table format; that entry is decoded in memory.
pub fn read_frame(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    let file = File::open(path)
        .map_err(CsiError::from)
        .with_context(|| format!("opening {}", path.display()))?;

    let df = match format {
        TableFormat::Zip => read_zipped(file, path)?,
        other => read_table(file, other)
            .with_context(|| format!("reading {}", path.display()))?,
    };
    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

fn read_zipped(file: File, path: &Path) -> Result<DataFrame> {
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("opening zip archive {}", path.display()))?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let inner = Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .and_then(|ext| TableFormat::from_extension(&ext));
        match inner {
            Some(TableFormat::Zip) | None => {
                debug!("Skipping archive entry {}", name);
                continue;
            }
            Some(format) => {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut bytes)
                    .with_context(|| format!("extracting {name} from {}", path.display()))?;
                debug!("Decoding archive entry {} as {:?}", name, format);
                return read_table(Cursor::new(bytes), format)
                    .with_context(|| format!("reading {name} from {}", path.display()));
            }
        }
    }
    Err(CsiError::Parse(format!(
        "zip archive {} holds no .csv, .parquet or Arrow IPC table",
        path.display()
    ))
    .into())
}

fn read_table<R: MmapBytesReader>(reader: R, format: TableFormat) -> Result<DataFrame> {
    match format {
        TableFormat::Csv => CsvReader::new(reader)
            .has_header(true)
            .infer_schema(Some(CSV_INFER_ROWS))
            .finish()
            .context("reading CSV table"),
        #[cfg(feature = "parquet")]
        TableFormat::Parquet => ParquetReader::new(reader)
            .finish()
            .context("reading Parquet table"),
        #[cfg(not(feature = "parquet"))]
        TableFormat::Parquet => Err(anyhow!(
            "parquet support is disabled; rebuild with the 'parquet' feature"
        )),
        #[cfg(feature = "ipc")]
        TableFormat::Ipc => IpcReader::new(reader)
            .finish()
            .context("reading Arrow IPC table"),
        #[cfg(not(feature = "ipc"))]
        TableFormat::Ipc => Err(anyhow!(
            "Arrow IPC support is disabled; rebuild with the 'ipc' feature"
        )),
        TableFormat::Zip => Err(anyhow!("nested zip archives are not supported")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Write};
    use tempfile::tempdir;
    use ::zip::{write::FileOptions, CompressionMethod, ZipWriter};

    const SAMPLE: &str = "sector,app_status,nameplate\n\
        Residential,Completed,5.2\n\
        Commercial,Completed,120.0\n\
        Residential,Cancelled,\n";

    #[test]
    fn reads_csv_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        fs::write(&path, SAMPLE).unwrap();

        let df = read_frame(&path).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("nameplate").unwrap().null_count(), 1);
    }

    #[test]
    fn reads_first_table_inside_zip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ca_csi_2020.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("README.txt", options).unwrap();
        writer.write_all(b"not a table").unwrap();
        writer.start_file("data/ca_csi_2020.csv", options).unwrap();
        writer.write_all(SAMPLE.as_bytes()).unwrap();
        writer.finish().unwrap();

        let df = read_frame(&path).unwrap();
        assert_eq!(df.height(), 3);
        assert!(df.column("sector").is_ok());
    }

    #[test]
    fn zip_without_table_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("notes.md", FileOptions::default())
            .unwrap();
        writer.write_all(b"# nothing here").unwrap();
        writer.finish().unwrap();

        let err = read_frame(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CsiError>(),
            Some(CsiError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_frame(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CsiError>(),
            Some(CsiError::Io(_))
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = read_frame("ca_csi_2020.pkl").unwrap_err();
        assert!(err.to_string().contains("unsupported file extension 'pkl'"));
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(
            TableFormat::from_path(Path::new("A.PARQUET")).unwrap(),
            TableFormat::Parquet
        );
        assert_eq!(
            TableFormat::from_path(Path::new("a.feather")).unwrap(),
            TableFormat::Ipc
        );
        assert!(TableFormat::from_path(Path::new("noext")).is_err());
    }

    #[cfg(feature = "parquet")]
    #[test]
    fn reads_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.parquet");
        let mut df = df![
            "nameplate" => &[Some(4.0f64), None, Some(9.5)],
            "sector" => &["Residential", "Residential", "Commercial"],
        ]
        .unwrap();
        let mut file = File::create(&path).unwrap();
        ParquetWriter::new(&mut file).finish(&mut df).unwrap();

        let back = read_frame(&path).unwrap();
        assert_eq!(back.height(), 3);
        assert_eq!(back.column("nameplate").unwrap().null_count(), 1);
    }
}
