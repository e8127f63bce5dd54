// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use clap::Args;
use kdam::TqdmParallelIterator;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use pince_core::constant::{self, DEFAULT_IOU_THRESHOLD, JACQUARD_RESOLUTION};
use pince_core::error::PinceError;
use pince_core::gr::{ExtractConfig, IouRecord, IouTally, MatchConfig, extract_grasps_with};
use pince_core::io;
use pince_core::ut;
use pince_data::ValidationSplit;
use pince_data::data::{GraspDataset, GraspDatasets};

use super::{ExtractArgs, lock, set_threads};

#[derive(Debug, Args)]
#[command(about = "Compute IoU grasp success of predicted heat maps against a labelled dataset.")]
pub struct EvaluateIouArgs {
    #[arg(
        short = 'd',
        long,
        help = "Dataset name (cornell, jacquard, or fsim).",
        required = true
    )]
    pub dataset: Option<String>,

    #[arg(short = 'p', long, help = "Path to dataset.", required = true)]
    pub dataset_path: Option<String>,

    #[arg(
        short = 'i',
        long,
        help = "Directory of predicted heat maps (.npz) named by image identifier.",
        required = true
    )]
    pub predictions: Option<String>,

    #[arg(long, help = "Input image size of the network.", default_value_t = 420)]
    pub input_size: usize,

    #[arg(
        long,
        help = "Fraction of data used for training (remainder is evaluated).",
        default_value_t = 0.8
    )]
    pub split: f32,

    #[arg(long, help = "Shuffle the dataset before splitting.")]
    pub ds_shuffle: bool,

    #[arg(
        long,
        help = "Shift the start point of the dataset to use a different train/validation split.",
        default_value_t = 0.0
    )]
    pub ds_rotate: f32,

    #[arg(long, help = "Random seed used to shuffle the dataset.", default_value_t = 123)]
    pub random_seed: u64,

    #[arg(long, help = "Number of ranked grasps tested against ground truth (default: all).")]
    pub test_grasps: Option<usize>,

    #[arg(
        long,
        help = "IoU threshold for a grasp to match ground truth.",
        default_value_t = DEFAULT_IOU_THRESHOLD
    )]
    pub iou_threshold: f32,

    #[arg(
        long,
        help = "Maximum angle difference in degrees for a grasp to match ground truth.",
        default_value_t = 30.0
    )]
    pub angle_tolerance: f32,

    #[command(flatten)]
    pub extract: ExtractArgs,

    #[arg(long, help = "Write the best grasp per image in Jacquard submission format.")]
    pub jacquard_output: Option<String>,

    #[arg(
        short = 'o',
        long,
        help = "Per-image results table (.csv, .txt, .tsv, .pq)."
    )]
    pub output: Option<String>,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("[pince::evaluate::iou] ERROR: {}", message);
    std::process::exit(1);
}

pub fn evaluate_iou(args: &EvaluateIouArgs) {
    set_threads(args.threads, "evaluate::iou");

    let (Some(dataset_name), Some(dataset_path), Some(predictions)) = (
        args.dataset.as_deref(),
        args.dataset_path.as_deref(),
        args.predictions.as_deref(),
    ) else {
        fail("--dataset, --dataset-path, and --predictions must be specified.");
    };

    let kind = GraspDatasets::select(dataset_name).unwrap_or_else(|err| fail(err));

    if args.jacquard_output.is_some() && kind != GraspDatasets::Jacquard {
        fail("--jacquard-output can only be used with the --dataset jacquard option.");
    }

    let extract = args.extract.config().unwrap_or_else(|err| fail(err));

    let config = MatchConfig::new(
        args.iou_threshold,
        args.angle_tolerance.to_radians(),
        args.test_grasps,
    )
    .unwrap_or_else(|err| fail(err));

    let output = args.output.as_ref().map(PathBuf::from);

    if let Some(output) = &output {
        check_table_path(output).unwrap_or_else(|err| fail(err));
    }

    ut::track::progress_log(
        &format!("Loading {} dataset...", kind.name()),
        args.verbose,
    );

    let dataset = GraspDataset::open(kind, dataset_path, args.input_size, args.ds_rotate)
        .unwrap_or_else(|err| fail(err));

    let split = ValidationSplit::new(
        dataset.len(),
        args.split,
        args.ds_shuffle.then_some(args.random_seed),
    )
    .unwrap_or_else(|err| fail(err));

    ut::track::progress_log(
        &format!(
            "Validation size: {}",
            ut::track::thousands_format(split.validation().len())
        ),
        args.verbose,
    );

    let substring = args.extract.prediction_substring.as_deref();

    let files = ut::path::collect_file_paths(
        predictions,
        constant::SUPPORTED_MAP_FORMATS.as_slice(),
        substring,
    )
    .unwrap_or_else(|err| fail(err));

    let ids = dataset.ids().unwrap_or_else(|err| fail(err));

    let matched: HashMap<usize, PathBuf> = ut::path::pair_files_by_stem(&ids, &files, substring)
        .into_iter()
        .collect();

    let mut missing: Vec<String> = Vec::new();
    let mut pairs: Vec<(usize, PathBuf)> = Vec::with_capacity(split.validation().len());

    for &idx in split.validation() {
        match matched.get(&idx) {
            Some(path) => pairs.push((idx, path.clone())),
            None => missing.push(format!("{}\tNo prediction file found.", ids[idx])),
        }
    }

    if pairs.is_empty() {
        fail("No prediction files matched the validation images. Please check your path and/or substring identifier.");
    }

    if !missing.is_empty() {
        ut::track::progress_log(
            &format!(
                "{} validation images have no prediction and are skipped.",
                ut::track::thousands_format(missing.len())
            ),
            args.verbose,
        );
    }

    let scale = JACQUARD_RESOLUTION / args.input_size as f32;
    let write_jacquard = args.jacquard_output.is_some();

    let pb = ut::track::progress_bar(pairs.len(), "Evaluating", args.verbose);

    let results: Mutex<Vec<(usize, IouRecord, Vec<String>)>> =
        Mutex::new(Vec::with_capacity(pairs.len()));
    let failure: Mutex<Vec<String>> = Mutex::new(missing);

    let start = Instant::now();

    (0..pairs.len())
        .into_par_iter()
        .tqdm_with_bar(pb)
        .for_each(|order| {
            let (idx, path) = &pairs[order];
            let run = evaluate_image(
                &dataset,
                *idx,
                path,
                args.extract.n_grasps,
                args.extract.width_scale,
                &extract,
                &config,
                write_jacquard.then_some(scale),
            );

            match run {
                Ok((record, jacquard)) => lock(&results)
                    .unwrap_or_else(|err| fail(err))
                    .push((order, record, jacquard)),
                Err(err) => lock(&failure)
                    .unwrap_or_else(|err| fail(err))
                    .push(format!("{}\t{}", ids[*idx], err)),
            }
        });

    let elapsed = start.elapsed();

    let mut results = results.into_inner().unwrap_or_else(|err| fail(err));
    let failure = failure.into_inner().unwrap_or_else(|err| fail(err));

    results.sort_by_key(|(order, _, _)| *order);

    if args.verbose {
        println!();
    }

    let tally = results
        .iter()
        .fold(IouTally::default(), |mut tally, (_, record, _)| {
            tally.record(record.correct);
            tally
        });

    if tally.total() == 0 {
        fail(format!(
            "Every image failed to evaluate. First error: {}",
            failure.first().map(String::as_str).unwrap_or("unknown")
        ));
    }

    ut::track::progress_log(
        &format!(
            "Average evaluation time per image: {:.3}ms",
            elapsed.as_secs_f64() * 1000.0 / tally.total() as f64
        ),
        args.verbose,
    );

    ut::track::progress_log(
        &format!(
            "IOU Results: {}/{} = {:.6}",
            tally.correct,
            tally.total(),
            tally.accuracy()
        ),
        true,
    );

    if let Some(jacquard_output) = &args.jacquard_output {
        let lines: Vec<String> = results
            .iter()
            .flat_map(|(_, _, lines)| lines.iter().cloned())
            .collect();

        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        std::fs::write(jacquard_output, contents)
            .unwrap_or_else(|err| fail(format!("Failed to write Jacquard output. {}", err)));

        ut::track::progress_log(
            &format!("Jacquard output saved to {}", jacquard_output),
            args.verbose,
        );
    }

    if let Some(output) = &output {
        let records: Vec<IouRecord> = results.into_iter().map(|(_, record, _)| record).collect();

        io::write_results(&records, output).unwrap_or_else(|err| fail(err));

        if !failure.is_empty() {
            let errors = errors_path(output);
            std::fs::write(&errors, failure.join("\n"))
                .unwrap_or_else(|err| fail(format!("Failed to write errors. {}", err)));

            ut::track::progress_log(
                &format!(
                    "{} images could not be evaluated. See {}",
                    ut::track::thousands_format(failure.len()),
                    errors.display()
                ),
                args.verbose,
            );
        }
    } else if !failure.is_empty() {
        for line in &failure {
            eprintln!("[pince::evaluate::iou] WARNING: {}", line);
        }
    }
}

/// Evaluate one image, returning its record and any Jacquard submission lines
#[allow(clippy::too_many_arguments)]
fn evaluate_image(
    dataset: &GraspDataset,
    idx: usize,
    path: &Path,
    n_grasps: usize,
    width_scale: f32,
    extract: &ExtractConfig,
    config: &MatchConfig,
    jacquard_scale: Option<f32>,
) -> Result<(IouRecord, Vec<String>), PinceError> {
    let prediction = io::read_prediction_npz(path, width_scale)?;
    let ground_truth = dataset.ground_truth(idx, prediction.rotation, prediction.zoom)?;
    let candidates = extract_grasps_with(&prediction.maps, n_grasps, extract)?;

    let record = IouRecord::new(&dataset.id(idx)?, &candidates, &ground_truth, config);

    let mut jacquard = Vec::new();

    if let Some(scale) = jacquard_scale {
        if let Some(best) = candidates.best() {
            jacquard.push(dataset.jacquard_name(idx)?);
            jacquard.push(best.to_jacquard(scale));
        }
    }

    Ok((record, jacquard))
}

fn check_table_path(output: &Path) -> Result<(), String> {
    let extension = output
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    if !extension.is_some_and(|ext| constant::SUPPORTED_TABLE_FORMATS.contains(&ext.as_str())) {
        return Err(format!(
            "Invalid output extension. Must be one of: {:?}.",
            constant::SUPPORTED_TABLE_FORMATS
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(
                "Invalid file path. Parent directory of output file path does not exist."
                    .to_string(),
            );
        }
    }

    Ok(())
}

fn errors_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "results".to_string());

    output.with_file_name(format!("{}_errors.tsv", stem))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_check_table_path() {
        assert!(check_table_path(Path::new("results.csv")).is_ok());
        assert!(check_table_path(Path::new("results.PQ")).is_ok());
        assert!(check_table_path(Path::new("results.xlsx")).is_err());
        assert!(check_table_path(Path::new("results")).is_err());
        assert!(check_table_path(Path::new("does_not_exist/results.csv")).is_err());
    }

    #[test]
    fn test_errors_path() {
        assert_eq!(
            errors_path(Path::new("out/results.csv")),
            PathBuf::from("out/results_errors.tsv")
        );
    }
}
