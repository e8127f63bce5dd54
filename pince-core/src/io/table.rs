// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::constant::RESULT_COLUMN_NAMES;
use crate::error::PinceError;
use crate::gr::IouRecord;

fn create_file<P: AsRef<Path>>(path: &P) -> Result<File, PinceError> {
    File::create(path).map_err(|_| {
        PinceError::OtherError(format!(
            "Failed to create table file: {}",
            path.as_ref().display()
        ))
    })
}

/// Write a table to a CSV file
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `path` - Path to the output file
/// * `header` - Whether the output file should contain a header
pub fn write_table_csv<P: AsRef<Path>>(
    df: &mut DataFrame,
    path: P,
    header: bool,
) -> Result<(), PinceError> {
    let mut output = create_file(&path)?;

    CsvWriter::new(&mut output)
        .include_header(header)
        .finish(df)
        .map_err(|_| PinceError::OtherError("Failed to write CSV file.".to_string()))
}

/// Write a table to a tab-separated file
pub fn write_table_tsv<P: AsRef<Path>>(
    df: &mut DataFrame,
    path: P,
    header: bool,
) -> Result<(), PinceError> {
    let mut output = create_file(&path)?;

    CsvWriter::new(&mut output)
        .include_header(header)
        .with_separator(b'\t')
        .finish(df)
        .map_err(|_| PinceError::OtherError("Failed to write TSV file.".to_string()))
}

/// Write a table to a parquet file
pub fn write_table_pq<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<(), PinceError> {
    let mut output = create_file(&path)?;

    ParquetWriter::new(&mut output)
        .finish(df)
        .map(|_| ())
        .map_err(|_| PinceError::OtherError("Failed to write parquet file.".to_string()))
}

/// Write a DataFrame to disk with the format given by the file extension
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `path` - Output path ending in csv, tsv, txt, parquet, or pq
///
/// # Examples
///
/// ```no_run
/// use polars::prelude::*;
/// use pince_core::io::write_table;
///
/// let column = vec![Column::new("iou".into(), [0.52, 0.31, 0.0])];
/// let mut df: DataFrame = DataFrame::new(column).unwrap();
///
/// write_table(&mut df, "results.csv").unwrap()
/// ```
pub fn write_table<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<(), PinceError> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    match extension.as_deref() {
        Some("csv") => write_table_csv(df, path, true),
        Some("tsv") | Some("txt") => write_table_tsv(df, path, true),
        Some("parquet") | Some("pq") => write_table_pq(df, path),
        _ => Err(PinceError::OtherError(
            "Provided table path has an invalid extension. Must be one of: csv, tsv, txt, parquet, or pq.".to_string()
        )),
    }
}

/// Collect per-image evaluation records into a DataFrame
///
/// # Examples
///
/// ```
/// use pince_core::gr::IouRecord;
/// use pince_core::io::results_table;
///
/// let records = vec![IouRecord {
///     image: "pcd0100".to_string(),
///     correct: true,
///     iou: 0.61,
///     candidates: 1,
///     quality: 0.93,
/// }];
///
/// let df = results_table(&records).unwrap();
/// assert_eq!(df.shape(), (1, 5));
/// ```
pub fn results_table(records: &[IouRecord]) -> Result<DataFrame, PinceError> {
    let [image, correct, iou, candidates, quality] = RESULT_COLUMN_NAMES;

    let columns = vec![
        Column::new(
            image.into(),
            records.iter().map(|r| r.image.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            correct.into(),
            records.iter().map(|r| r.correct).collect::<Vec<bool>>(),
        ),
        Column::new(
            iou.into(),
            records.iter().map(|r| r.iou).collect::<Vec<f32>>(),
        ),
        Column::new(
            candidates.into(),
            records
                .iter()
                .map(|r| r.candidates as u32)
                .collect::<Vec<u32>>(),
        ),
        Column::new(
            quality.into(),
            records.iter().map(|r| r.quality).collect::<Vec<f32>>(),
        ),
    ];

    DataFrame::new(columns).map_err(|err| PinceError::OtherError(err.to_string()))
}

/// Write per-image evaluation records to a table
pub fn write_results<P: AsRef<Path>>(records: &[IouRecord], path: P) -> Result<(), PinceError> {
    let mut df = results_table(records)?;
    write_table(&mut df, path)
}

#[cfg(test)]
mod test {
    use super::*;

    fn records() -> Vec<IouRecord> {
        vec![
            IouRecord {
                image: "a".to_string(),
                correct: true,
                iou: 0.7,
                candidates: 2,
                quality: 0.9,
            },
            IouRecord {
                image: "b".to_string(),
                correct: false,
                iou: 0.1,
                candidates: 1,
                quality: 0.4,
            },
        ]
    }

    #[test]
    fn test_results_table_columns() {
        let df = results_table(&records()).unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, RESULT_COLUMN_NAMES.to_vec());
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_write_results_csv() {
        const OUTPUT: &str = "TEST_RESULTS_WRITE.csv";

        write_results(&records(), OUTPUT).unwrap();

        let contents = std::fs::read_to_string(OUTPUT).unwrap();
        assert!(contents.starts_with("image,correct,iou,candidates,quality"));
        assert_eq!(contents.lines().count(), 3);

        std::fs::remove_file(OUTPUT).unwrap();
    }

    #[test]
    fn test_invalid_extension() {
        assert!(write_results(&records(), "TEST_RESULTS_WRITE.xlsx").is_err());
    }
}
