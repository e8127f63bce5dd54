// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::sync::{Mutex, MutexGuard};

use clap::{Args, Subcommand};

use pince_core::constant::DEFAULT_WIDTH_SCALE;
use pince_core::gr::ExtractConfig;

mod grasps;
mod iou;

use grasps::{EvaluateGraspsArgs, evaluate_grasps};
use iou::{EvaluateIouArgs, evaluate_iou};

#[derive(Debug, Args)]
#[command(about = "Evaluate grasp heat maps predicted by a network.")]
#[command(args_conflicts_with_subcommands = true)]
#[command(arg_required_else_help = true)]
#[command(flatten_help = true)]
pub struct EvaluateArgs {
    #[command(subcommand)]
    command: Option<EvaluateCommands>,
}

#[derive(Debug, Subcommand)]
enum EvaluateCommands {
    Iou(EvaluateIouArgs),
    Grasps(EvaluateGraspsArgs),
}

pub fn evaluate(args: &EvaluateArgs) {
    match &args.command {
        Some(EvaluateCommands::Iou(iou)) => evaluate_iou(iou),
        Some(EvaluateCommands::Grasps(grasps)) => evaluate_grasps(grasps),
        None => {}
    }
}

/// Options shared by every command that extracts grasps from heat maps
#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[arg(
        short = 'n',
        long,
        help = "Number of grasps to extract per image.",
        default_value_t = 1
    )]
    pub n_grasps: usize,

    #[arg(
        long,
        help = "Minimum quality of an extracted grasp.",
        default_value_t = 0.2
    )]
    pub min_quality: f32,

    #[arg(
        long,
        help = "Minimum distance in pixels between extracted grasps.",
        default_value_t = 20
    )]
    pub min_distance: usize,

    #[arg(long, help = "Gaussian sigma used to smooth quality maps before extraction.")]
    pub smoothing: Option<f32>,

    #[arg(
        long,
        help = "Pixels per unit of raw network width output.",
        default_value_t = DEFAULT_WIDTH_SCALE
    )]
    pub width_scale: f32,

    #[arg(long, help = "Substring removed from prediction file names (e.g. _pred).")]
    pub prediction_substring: Option<String>,
}

impl ExtractArgs {
    /// Validate arguments and convert them to an extraction configuration
    pub fn config(&self) -> Result<ExtractConfig, String> {
        if self.n_grasps < 1 {
            return Err("n_grasps must be a positive integer.".to_string());
        }

        if !(0.0..1.0).contains(&self.min_quality) {
            return Err("min_quality must lie in [0, 1).".to_string());
        }

        if self.smoothing.is_some_and(|s| !(s > 0.0 && s.is_finite())) {
            return Err("smoothing must be a positive number if provided.".to_string());
        }

        if !(self.width_scale > 0.0 && self.width_scale.is_finite()) {
            return Err("width_scale must be a positive number.".to_string());
        }

        Ok(ExtractConfig {
            min_quality: self.min_quality,
            min_distance: self.min_distance,
            smoothing: self.smoothing,
        })
    }
}

/// Build the global thread pool if a thread count was provided
pub(crate) fn set_threads(threads: Option<usize>, context: &str) {
    if let Some(threads) = threads {
        if threads < 1 {
            eprintln!(
                "[pince::{}] ERROR: Threads must be set to a positive integer if provided.",
                context
            );
            std::process::exit(1);
        }

        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .unwrap_or_else(|err| {
                eprintln!("[pince::{}] ERROR: {}", context, err);
                std::process::exit(1);
            });
    }
}

/// Lock state shared between workers, failing if a worker panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex
        .lock()
        .map_err(|_| "A worker panicked while recording results.".to_string())
}
