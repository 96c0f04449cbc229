use std::io::{Read, Write};
use std::path::Path;

use nalgebra::DMatrix;
use thiserror::Error;

use crate::errors::NystromError;
use crate::growth::{check_square, ResultSeries};

#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row} has {found} entries, expected {expected}")]
    Ragged { row: usize, found: usize, expected: usize },

    #[error("Cannot parse entry ({row}, {col}) `{value}` as a number")]
    BadValue { row: usize, col: usize, value: String },

    #[error("Array has shape {0:?}, expected a 2-D matrix")]
    NotMatrix(Vec<u64>),

    #[error("Archive has no array named `{0}`")]
    MissingArray(String),

    #[error("Archive holds several arrays ({0:?}); name the one to load")]
    AmbiguousArchive(Vec<String>),

    #[error(transparent)]
    Kernel(#[from] NystromError),
}

/// Reads a dense square kernel from headerless delimited text, one matrix row per line.
pub fn read_kernel<R: Read>(reader: R, delimiter: u8) -> Result<DMatrix<f64>, IoError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut data: Vec<f64> = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let expected = *ncols.get_or_insert(record.len());
        if record.len() != expected {
            return Err(IoError::Ragged { row, found: record.len(), expected });
        }
        for (col, field) in record.iter().enumerate() {
            let value = field.parse::<f64>().map_err(|_| IoError::BadValue {
                row,
                col,
                value: field.to_string(),
            })?;
            data.push(value);
        }
        nrows += 1;
    }

    let kernel = DMatrix::from_row_slice(nrows, ncols.unwrap_or(0), &data);
    check_square(&kernel)?;
    log::info!("Loaded {}x{} kernel", kernel.nrows(), kernel.ncols());
    Ok(kernel)
}

/// Reads a square `f64` kernel stored as a `.npy` array, in C or Fortran order.
pub fn read_npy<R: Read>(reader: R) -> Result<DMatrix<f64>, IoError> {
    npy_to_matrix(npyz::NpyFile::new(reader)?)
}

fn npy_to_matrix<R: Read>(npy: npyz::NpyFile<R>) -> Result<DMatrix<f64>, IoError> {
    let shape = npy.shape().to_vec();
    if shape.len() != 2 {
        return Err(IoError::NotMatrix(shape));
    }
    let (nrows, ncols) = (shape[0] as usize, shape[1] as usize);
    let order = npy.order();
    let data: Vec<f64> = npy.into_vec()?;
    let kernel = match order {
        npyz::Order::C => DMatrix::from_row_slice(nrows, ncols, &data),
        npyz::Order::Fortran => DMatrix::from_column_slice(nrows, ncols, &data),
    };
    check_square(&kernel)?;
    log::info!("Loaded {}x{} kernel", kernel.nrows(), kernel.ncols());
    Ok(kernel)
}

/// Reads the array `key` from a `.npz` archive; without a key the archive must hold exactly one array.
pub fn read_npz<P: AsRef<Path>>(path: P, key: Option<&str>) -> Result<DMatrix<f64>, IoError> {
    let mut archive = npyz::npz::NpzArchive::open(path)?;
    let name = match key {
        Some(key) => key.to_string(),
        None => {
            let names: Vec<String> = archive.array_names().map(|n| n.to_string()).collect();
            match names.as_slice() {
                [only] => only.clone(),
                _ => return Err(IoError::AmbiguousArchive(names)),
            }
        }
    };
    let npy = archive.by_name(&name)?.ok_or_else(|| IoError::MissingArray(name.clone()))?;
    npy_to_matrix(npy)
}

/**
Loads a kernel, choosing the format from the file extension.

`.npy` is a dense array, `.npz` an archive of named arrays (`key` picks one), anything
else is headerless delimited text split on `delimiter`.
 */
pub fn read_kernel_file<P: AsRef<Path>>(path: P, key: Option<&str>, delimiter: u8) -> Result<DMatrix<f64>, IoError> {
    let path = path.as_ref();
    let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("npy") => read_npy(std::io::BufReader::new(std::fs::File::open(path)?)),
        Some("npz") => read_npz(path, key),
        _ => {
            if let Some(key) = key {
                log::warn!("Ignoring array name `{}` for a text kernel file", key);
            }
            read_kernel(std::io::BufReader::new(std::fs::File::open(path)?), delimiter)
        }
    }
}

/// Writes `n_picked,n_evaled,rmse` with one row per record.
pub fn write_series<W: Write>(writer: W, series: &ResultSeries) -> Result<(), IoError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in &series.rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_series_file<P: AsRef<Path>>(path: P, series: &ResultSeries) -> Result<(), IoError> {
    let file = std::fs::File::create(path)?;
    write_series(file, series)
}
