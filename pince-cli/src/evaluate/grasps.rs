// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::path::Path;
use std::sync::Mutex;

use clap::Args;
use kdam::TqdmParallelIterator;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use pince_core::constant;
use pince_core::error::PinceError;
use pince_core::gr::{ExtractConfig, HeatMaps, extract_grasps_with};
use pince_core::ut;

use super::{ExtractArgs, lock, set_threads};

#[derive(Debug, Args)]
#[command(about = "Extract ranked grasp rectangles from predicted heat maps.")]
pub struct EvaluateGraspsArgs {
    #[arg(
        short = 'i',
        long,
        help = "Directory of predicted heat maps (.npz).",
        required = true
    )]
    pub predictions: Option<String>,

    #[arg(short = 'o', long, help = "Output directory.", required = true)]
    pub output: Option<String>,

    #[command(flatten)]
    pub extract: ExtractArgs,

    #[arg(
        short = 'a',
        long,
        help = "Format to save extracted grasps (e.g. json).",
        default_value = "json"
    )]
    pub array_format: Option<String>,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("[pince::evaluate::grasps] ERROR: {}", message);
    std::process::exit(1);
}

pub fn evaluate_grasps(args: &EvaluateGraspsArgs) {
    set_threads(args.threads, "evaluate::grasps");

    let extract = args.extract.config().unwrap_or_else(|err| {
        eprintln!("[pince::evaluate::grasps] ERROR: {}", err);
        std::process::exit(1);
    });

    let array_format = args.array_format.to_owned().unwrap_or("json".to_string());

    if !constant::SUPPORTED_ARRAY_FORMATS.contains(&array_format.as_str()) {
        eprintln!(
            "[pince::evaluate::grasps] ERROR: Invalid array_format {}. Must be one of: {:?}.",
            array_format,
            constant::SUPPORTED_ARRAY_FORMATS
        );
        std::process::exit(1);
    }

    let (Some(predictions), Some(output)) = (&args.predictions, &args.output) else {
        eprintln!("[pince::evaluate::grasps] ERROR: Both --predictions/-i and --output/-o must be specified.");
        std::process::exit(1);
    };

    let files = ut::path::collect_file_paths(
        predictions,
        constant::SUPPORTED_MAP_FORMATS.as_slice(),
        args.extract.prediction_substring.as_deref(),
    )
    .unwrap_or_else(|err| {
        eprintln!("{}", err);
        std::process::exit(1);
    });

    if files.is_empty() {
        eprintln!(
            "[pince::evaluate::grasps] ERROR: No prediction files were detected. Please check your path and/or substring identifier."
        );
        std::process::exit(1);
    }

    ut::track::progress_log(
        &format!(
            "Detected {} prediction files.",
            ut::track::thousands_format(files.len())
        ),
        args.verbose,
    );

    let output = ut::path::ensure_directory(output).unwrap_or_else(|err| fail(err));

    ut::track::progress_log(
        &format!("Saving grasps to {}", output.display()),
        args.verbose,
    );

    let pb = ut::track::progress_bar(files.len(), "Extracting", args.verbose);

    let grasps: Mutex<usize> = Mutex::new(0);
    let success: Mutex<Vec<String>> = Mutex::new(vec![]);
    let failure: Mutex<Vec<String>> = Mutex::new(Vec::with_capacity(files.len()));

    (0..files.len())
        .into_par_iter()
        .tqdm_with_bar(pb)
        .for_each(|idx| {
            let id = prediction_id(&files[idx], args.extract.prediction_substring.as_deref());

            let run = extract_file(
                &files[idx],
                &output.join(format!("{}.{}", id, array_format)),
                args.extract.n_grasps,
                args.extract.width_scale,
                &extract,
            );

            match run {
                Ok(n) => {
                    *lock(&grasps).unwrap_or_else(|err| fail(err)) += n;
                    lock(&success)
                        .unwrap_or_else(|err| fail(err))
                        .push(format!("{}\t{}", id, n));
                }
                Err(err) => lock(&failure)
                    .unwrap_or_else(|err| fail(err))
                    .push(format!("{}\t{}", id, err)),
            }
        });

    let grasps = grasps.into_inner().unwrap_or_else(|err| fail(err));
    let mut success = success.into_inner().unwrap_or_else(|err| fail(err));
    let mut failure = failure.into_inner().unwrap_or_else(|err| fail(err));

    success.sort();
    failure.sort();

    if args.verbose {
        println!();
    }

    ut::track::progress_log(
        &format!(
            "Complete. {} grasps extracted across {} images.",
            ut::track::thousands_format(grasps),
            ut::track::thousands_format(success.len())
        ),
        args.verbose,
    );

    if !success.is_empty() {
        std::fs::write(output.join("grasp_counts.tsv"), success.join("\n")).unwrap_or_else(|_| {
            eprintln!("[pince::evaluate::grasps] ERROR: Failed to write grasp counts.");
            std::process::exit(1);
        });
    }

    if !failure.is_empty() {
        std::fs::write(output.join("grasp_errors.tsv"), failure.join("\n")).unwrap_or_else(|_| {
            eprintln!("[pince::evaluate::grasps] ERROR: Failed to write grasp errors.");
            std::process::exit(1);
        });
    }
}

fn prediction_id(path: &Path, substring: Option<&str>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    match substring {
        Some(substring) if !substring.is_empty() => stem.replace(substring, ""),
        _ => stem,
    }
}

fn extract_file(
    input: &Path,
    output: &Path,
    n_grasps: usize,
    width_scale: f32,
    config: &ExtractConfig,
) -> Result<usize, PinceError> {
    let maps = HeatMaps::open(input, width_scale)?;
    let candidates = extract_grasps_with(&maps, n_grasps, config)?;
    candidates.save(output)?;

    Ok(candidates.len())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prediction_id() {
        let path = Path::new("predictions/pcd0100_pred.npz");
        assert_eq!(prediction_id(path, Some("_pred")), "pcd0100");
        assert_eq!(prediction_id(path, None), "pcd0100_pred");
    }
}
