//! Write a small self-contained data set: an approximate Bessell / Gaia filter
//! library and a blackbody stand-in for the Vega reference standard.
//!
//! ```text
//! generate_sample [OUT_DIR]      (default: sample_data)
//!   OUT_DIR/filters/Bessell/{U,B,V,R,I}.dat
//!   OUT_DIR/filters/Gaia/G.dat
//!   OUT_DIR/vega_blackbody.parquet
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use synphot::data::loader::save_ascii;
use synphot::Curve;

/// hc/k in Å·K.
const HC_OVER_K: f64 = 1.438777e8;

/// Effective temperature of the blackbody reference (K).
const VEGA_TEMPERATURE: f64 = 9550.0;

/// Vega flux density at 5556 Å (erg cm⁻² s⁻¹ Å⁻¹).
const VEGA_FLUX_5556: f64 = 3.44e-9;

/// (system, name, centre Å, FWHM Å)
const FILTERS: [(&str, &str, f64, f64); 6] = [
    ("Bessell", "U", 3600.0, 650.0),
    ("Bessell", "B", 4380.0, 980.0),
    ("Bessell", "V", 5450.0, 850.0),
    ("Bessell", "R", 6410.0, 1500.0),
    ("Bessell", "I", 7980.0, 1500.0),
    ("Gaia", "G", 6730.0, 4400.0),
];

fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Gaussian response truncated at ±1.5 FWHM and pinned to zero at both ends.
fn response_curve(centre: f64, fwhm: f64, step: f64) -> Result<Curve> {
    let sigma = fwhm / (2.0 * (2.0 * 2f64.ln()).sqrt());
    let half_width = 1.5 * fwhm;
    let n = (2.0 * half_width / step).round() as usize;

    let wavelength: Vec<f64> = (0..=n)
        .map(|i| centre - half_width + step * i as f64)
        .collect();
    let mut response: Vec<f64> = wavelength.iter().map(|&w| gaussian(w, centre, sigma)).collect();
    response[0] = 0.0;
    response[n] = 0.0;

    Ok(Curve::new(wavelength, response)?)
}

/// Planck shape per unit wavelength, arbitrary normalisation.
fn planck_shape(wavelength: f64, temperature: f64) -> f64 {
    wavelength.powi(-5) / ((HC_OVER_K / (wavelength * temperature)).exp() - 1.0)
}

fn write_reference(path: &Path) -> Result<usize> {
    // Stay inside the 1000 Å – 33333 Å range of the extinction law.
    let wavelength: Vec<f64> = (0..=4800).map(|i| 1000.0 + 5.0 * i as f64).collect();
    let scale = VEGA_FLUX_5556 / planck_shape(5556.0, VEGA_TEMPERATURE);
    let flux: Vec<f64> = wavelength
        .iter()
        .map(|&w| scale * planck_shape(w, VEGA_TEMPERATURE))
        .collect();
    let n = wavelength.len();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Wavelength", DataType::Float64, false),
        Field::new("Flux", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(wavelength)),
            Arc::new(Float64Array::from(flux)),
        ],
    )
    .context("building reference record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing reference batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(n)
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));

    for (system, name, centre, fwhm) in FILTERS {
        let dir = out_dir.join("filters").join(system);
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(format!("{name}.dat"));
        save_ascii(&path, &response_curve(centre, fwhm, 25.0)?)?;
        log::info!("Wrote {system} {name} to {}", path.display());
    }

    let reference = out_dir.join("vega_blackbody.parquet");
    let n = write_reference(&reference)?;

    println!(
        "Wrote {} filters and a {n}-sample reference spectrum to {}",
        FILTERS.len(),
        out_dir.display()
    );
    Ok(())
}
