use anyhow::{bail, Context, Result};
use nalgebra::DVector;
use polars::prelude::*;
use std::path::Path;

/// Read a header-ed CSV with one column per coordinate into a point swarm.
///
/// Integer columns are cast to `Float64`; null cells are an error.
pub fn read_points<P: AsRef<Path>>(path: P) -> Result<Vec<DVector<f64>>> {
    let path = path.as_ref();
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .select([all().cast(DataType::Float64)])
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    let (rows, cols) = df.shape();
    if cols == 0 {
        bail!("{} has no coordinate columns", path.display());
    }
    tracing::info!(rows, cols, input = %path.display(), "read points");

    let mut coords = vec![vec![0.0; cols]; rows];
    for (c, column) in df.get_columns().iter().enumerate() {
        let values = column
            .f64()
            .with_context(|| format!("column {c} of {} is not numeric", path.display()))?;
        for (r, v) in values.into_iter().enumerate() {
            let Some(v) = v else {
                bail!("{}: empty cell at row {r}, column {c}", path.display());
            };
            coords[r][c] = v;
        }
    }
    Ok(coords.into_iter().map(DVector::from_vec).collect())
}
