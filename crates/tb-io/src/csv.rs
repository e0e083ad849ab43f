//! CSV ingestion and serialization
//!
//! Reads are schema-driven: each cell goes through `ValueKind::parse`, so
//! empty or unparsable text lands as NA instead of failing the load. Files
//! ending in `.gz` are gunzipped transparently in both directions.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tb_core::table::{Frame, FrameConfig, TableError, Value};

use crate::meta::Schema;
use crate::IoResult;

/// Open a file for reading, gunzipping transparently by extension
pub fn open(path: impl AsRef<Path>) -> IoResult<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if path.extension() == Some(std::ffi::OsStr::new("gz")) {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

fn create(path: impl AsRef<Path>) -> IoResult<Box<dyn Write>> {
    let path = path.as_ref();
    let file = File::create(path)?;
    if path.extension() == Some(std::ffi::OsStr::new("gz")) {
        Ok(Box::new(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(Box::new(file))
    }
}

/// Read headered CSV into a frame.
///
/// The header row must contain every schema field; extra CSV columns are
/// ignored and column order may differ from the schema's.
pub fn read_csv<R: Read>(reader: R, schema: &Schema, config: FrameConfig) -> IoResult<Frame> {
    let mut csv_reader = ::csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut source_columns = Vec::with_capacity(schema.len());
    for field in &schema.fields {
        let position = headers
            .iter()
            .position(|h| h == field.name)
            .ok_or_else(|| TableError::ColumnNotFound(field.name.clone()))?;
        source_columns.push(position);
    }

    let mut frame = schema.make_frame(config)?;
    for record in csv_reader.records() {
        let record = record?;
        let values: Vec<Value> = schema
            .fields
            .iter()
            .zip(source_columns.iter())
            .map(|(field, &position)| field.kind.parse(record.get(position).unwrap_or("")))
            .collect();
        frame.append_row(values)?;
    }
    Ok(frame)
}

/// Read a CSV (or `.csv.gz`) file into a frame
pub fn read_csv_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    config: FrameConfig,
) -> IoResult<Frame> {
    read_csv(open(path)?, schema, config)
}

/// Write a frame as headered CSV; NA cells become empty fields
pub fn write_csv<W: Write>(writer: W, frame: &Frame) -> IoResult<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    csv_writer.write_record(frame.header().names())?;

    for row in frame.rows() {
        let record: Vec<String> = row
            .values()?
            .into_iter()
            .map(|value| match value {
                Value::Na => String::new(),
                other => other.to_string(),
            })
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a frame to a CSV (or `.csv.gz`) file
pub fn write_csv_path(path: impl AsRef<Path>, frame: &Frame) -> IoResult<()> {
    write_csv(create(path)?, frame)
}
