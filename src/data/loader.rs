use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::model::Curve;

// ---------------------------------------------------------------------------
// Column naming for tabular formats
// ---------------------------------------------------------------------------

/// Names of the two numeric columns read from tabular files
/// (Parquet, CSV, JSON). Plain-text files are positional and ignore this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub wavelength: String,
    pub value: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            wavelength: "Wavelength".to_string(),
            value: "Flux".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn new(wavelength: &str, value: &str) -> Self {
        Self {
            wavelength: wavelength.to_string(),
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a curve from a file with the default column names.
pub fn load_curve(path: &Path) -> Result<Curve> {
    load_curve_with(path, &ColumnNames::default())
}

/// Load a curve from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – two named numeric columns (scalar or list typed)
/// * `.csv`     – header row, two named numeric columns
/// * `.json`    – `{ "Wavelength": [...], "Flux": [...] }`
/// * anything else – whitespace-separated text, wavelength then value
///
/// Samples may come in any wavelength order; the curve is sorted.
pub fn load_curve_with(path: &Path, columns: &ColumnNames) -> Result<Curve> {
    match load_samples(path, columns)? {
        Samples::Curve(curve) => Ok(curve),
        Samples::FluxOnly(_) => bail!(
            "{}: file must contain two columns (wavelength, value)",
            path.display()
        ),
    }
}

/// What a spectrum file holds: a full curve, or flux alone when a plain-text
/// file has a single column. The wavelength grid of the latter is supplied
/// later by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Curve(Curve),
    FluxOnly(Vec<f64>),
}

/// Load a spectrum file, accepting single-column text files as flux only.
pub fn load_samples(path: &Path, columns: &ColumnNames) -> Result<Samples> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (first, second) = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, columns),
        "json" => load_json(path, columns),
        "csv" => load_csv(path, columns),
        _ => load_ascii(path),
    }
    .with_context(|| format!("loading curve from {}", path.display()))?;

    let Some(value) = second else {
        log::debug!("Loaded {} flux-only samples from {}", first.len(), path.display());
        return Ok(Samples::FluxOnly(first));
    };
    log::debug!("Loaded {} samples from {}", first.len(), path.display());
    Ok(Samples::Curve(Curve::from_unsorted(first, value)?))
}

// ---------------------------------------------------------------------------
// Plain-text loader / writer
// ---------------------------------------------------------------------------

/// Whitespace-separated columns, one sample per line.  The first column is
/// wavelength, the second the value; further columns are ignored but every
/// row must have the same count.  A single column is read as values alone.
/// Blank lines and `#` comments are skipped.
fn load_ascii(path: &Path) -> Result<(Vec<f64>, Option<Vec<f64>>)> {
    let text = std::fs::read_to_string(path).context("reading text file")?;
    parse_table(&text)
}

/// Parse the two-column text format.
pub fn parse_columns(text: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    match parse_table(text)? {
        (wavelength, Some(value)) => Ok((wavelength, value)),
        (_, None) => bail!("file must contain two columns (wavelength, value)"),
    }
}

/// Parse one- or two-column text: the first column, and the second if present.
fn parse_table(text: &str) -> Result<(Vec<f64>, Option<Vec<f64>>)> {
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut width: Option<usize> = None;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let fields = line
            .split_whitespace()
            .enumerate()
            .map(|(j, tok)| {
                tok.parse::<f64>().with_context(|| {
                    format!("line {}, column {j}: '{tok}' is not a number", line_no + 1)
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        match width {
            None => width = Some(fields.len()),
            Some(w) if w != fields.len() => bail!(
                "line {}: expected {w} columns, found {}",
                line_no + 1,
                fields.len()
            ),
            Some(_) => {}
        }
        first.push(fields[0]);
        if let Some(&v) = fields.get(1) {
            second.push(v);
        }
    }

    if width == Some(1) {
        return Ok((first, None));
    }
    Ok((first, Some(second)))
}

/// Write a curve as two whitespace-separated columns.
pub fn save_ascii(path: &Path, curve: &Curve) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut out = std::io::BufWriter::new(file);
    for (w, v) in curve.wavelength().iter().zip(curve.value()) {
        writeln!(out, "{w:.18e} {v:.18e}").context("writing curve sample")?;
    }
    out.flush().context("flushing curve file")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// { "Wavelength": [3000.0, 3010.0, ...], "Flux": [1.2e-9, 1.3e-9, ...] }
/// ```
fn load_json(path: &Path, columns: &ColumnNames) -> Result<(Vec<f64>, Option<Vec<f64>>)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let obj = root.as_object().context("Expected top-level JSON object")?;

    let wavelength = json_array_to_f64(obj.get(&columns.wavelength), &columns.wavelength)?;
    let value = json_array_to_f64(obj.get(&columns.value), &columns.value)?;
    Ok((wavelength, Some(value)))
}

fn json_array_to_f64(val: Option<&JsonValue>, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| v.as_f64().with_context(|| format!("{col}[{j}]: not a number")))
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one sample per row.
/// Columns other than the two named ones are ignored.
fn load_csv(path: &Path, columns: &ColumnNames) -> Result<(Vec<f64>, Option<Vec<f64>>)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let w_idx = headers
        .iter()
        .position(|h| *h == columns.wavelength)
        .with_context(|| format!("CSV missing '{}' column", columns.wavelength))?;
    let v_idx = headers
        .iter()
        .position(|h| *h == columns.value)
        .with_context(|| format!("CSV missing '{}' column", columns.value))?;

    let mut wavelength = Vec::new();
    let mut value = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        wavelength.push(parse_csv_field(record.get(w_idx), row_no, &columns.wavelength)?);
        value.push(parse_csv_field(record.get(v_idx), row_no, &columns.value)?);
    }

    Ok((wavelength, Some(value)))
}

fn parse_csv_field(field: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = field.unwrap_or("").trim();
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one curve.
///
/// Either layout is accepted for each of the two named columns:
/// - `Float64` / `Float32`: one sample per row
/// - `List<Float>` / `LargeList<Float>`: whole arrays per row, concatenated
fn load_parquet(path: &Path, columns: &ColumnNames) -> Result<(Vec<f64>, Option<Vec<f64>>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut wavelength = Vec::new();
    let mut value = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let w_idx = schema.index_of(&columns.wavelength).map_err(|_| {
            anyhow::anyhow!("Parquet file missing '{}' column", columns.wavelength)
        })?;
        let v_idx = schema
            .index_of(&columns.value)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{}' column", columns.value))?;

        extract_f64_column(batch.column(w_idx), &mut wavelength)
            .with_context(|| format!("reading '{}'", columns.wavelength))?;
        extract_f64_column(batch.column(v_idx), &mut value)
            .with_context(|| format!("reading '{}'", columns.value))?;
    }

    Ok((wavelength, Some(value)))
}

// -- Parquet / Arrow helpers --

/// Append every value of a numeric or list-of-numeric column to `out`.
fn extract_f64_column(col: &Arc<dyn Array>, out: &mut Vec<f64>) -> Result<()> {
    match col.data_type() {
        DataType::Float64 | DataType::Float32 => extract_f64_values(col.as_ref(), out),
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            for row in 0..list_arr.len() {
                if list_arr.is_null(row) {
                    bail!("null value in list column at row {row}");
                }
                extract_f64_values(list_arr.value(row).as_ref(), out)?;
            }
            Ok(())
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            for row in 0..list_arr.len() {
                if list_arr.is_null(row) {
                    bail!("null value in list column at row {row}");
                }
                extract_f64_values(list_arr.value(row).as_ref(), out)?;
            }
            Ok(())
        }
        other => bail!("Expected Float64, Float32 or a list of them, got {other:?}"),
    }
}

/// The inner array can be Float64 or Float32; nulls become NaN.
fn extract_f64_values(values: &dyn Array, out: &mut Vec<f64>) -> Result<()> {
    if let Some(f64_arr) = values.as_any().downcast_ref::<Float64Array>() {
        out.extend(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)));
    } else if let Some(f32_arr) = values.as_any().downcast_ref::<Float32Array>() {
        out.extend(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64));
    } else {
        bail!(
            "column type is {:?}, expected Float64 or Float32",
            values.data_type()
        );
    }
    Ok(())
}
