use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use stackview_core::Dataset;

use crate::error::DatasetError;

// ── Dataset Reader ────────────────────────────────────────────────────

pub struct DatasetReader<R: Read> {
    reader: R,
}

impl<R: Read> DatasetReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Parse the JSON array of layer records.
    pub fn read(&mut self) -> Result<Dataset, DatasetError> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text)?;
        let dataset = Dataset::from_json(&text)?;
        log::info!("Read dataset with {} layers", dataset.layer_count());
        Ok(dataset)
    }
}

// ── Dataset Writer ────────────────────────────────────────────────────

pub struct DatasetWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> DatasetWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn write(&mut self, dataset: &Dataset) -> Result<(), DatasetError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, dataset)?;
        } else {
            serde_json::to_writer(&mut self.writer, dataset)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let path = path.as_ref();
    log::info!("Loading dataset from {}", path.display());
    let file = File::open(path)?;
    DatasetReader::new(BufReader::new(file)).read()
}

pub fn save_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<(), DatasetError> {
    let path = path.as_ref();
    log::info!("Saving {} layers to {}", dataset.layer_count(), path.display());
    let file = File::create(path)?;
    DatasetWriter::new(BufWriter::new(file))
        .pretty(true)
        .write(dataset)
}
