// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use clap::Args;
use colored::Colorize;

use pince_core::ut::track::{progress_log, thousands_format};
use pince_data::data::{GraspDataset, GraspDatasets};

#[derive(Debug, Args)]
#[command(about = "List supported grasp datasets or summarize a dataset on disk.")]
pub struct DatasetsArgs {
    #[arg(
        short,
        long,
        help = "Dataset name. Run `pince datasets --list` to see all available datasets."
    )]
    pub name: Option<String>,

    #[arg(short = 'd', long, help = "Path to dataset.")]
    pub dataset_path: Option<String>,

    #[arg(long, help = "Input image size of the network.", default_value_t = 420)]
    pub input_size: usize,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,

    #[arg(long, help = "List all supported grasp datasets.")]
    pub list: bool,
}

pub fn datasets(args: &DatasetsArgs) {
    if args.list {
        print_datasets();
        return;
    }

    let (Some(name), Some(dataset_path)) = (&args.name, &args.dataset_path) else {
        eprintln!("[pince::datasets] ERROR: Both --name/-n and --dataset-path/-d must be specified.");
        std::process::exit(1);
    };

    let kind = GraspDatasets::select(name).unwrap_or_else(|err| {
        eprintln!("{}", err);
        std::process::exit(1);
    });

    progress_log(
        &format!("Scanning {} annotations in {}", kind.name(), dataset_path),
        args.verbose,
    );

    let dataset =
        GraspDataset::open(kind, dataset_path, args.input_size, 0.0).unwrap_or_else(|err| {
            eprintln!("{}", err);
            std::process::exit(1);
        });

    let grasps = dataset.count_grasps().unwrap_or_else(|err| {
        eprintln!("{}", err);
        std::process::exit(1);
    });

    progress_log(
        &format!(
            "Detected {} images with {} annotated grasps.",
            thousands_format(dataset.len()),
            thousands_format(grasps)
        ),
        true,
    );
}

fn print_datasets() {
    println!("{:^86}", "\n");
    println!("| {:-^86} |", "");
    println!("| {:^86} |", "pince".truecolor(214, 96, 77).bold());
    println!("| {:^86} |", "Supported grasp datasets");
    println!("| {:-^86} |", "");
    println!(
        "| {:^10} | {:^22} | {:^11} | {:^34} |",
        "dataset".bold(),
        "author".bold(),
        "frame".bold(),
        "annotations".bold()
    );
    println!("| {:-^10} | {:-^22} | {:-^11} | {:-^34} |", "", "", "", "");

    for dataset in GraspDatasets::iter() {
        let (width, height) = dataset.frame();
        println!(
            "| {:^10} | {:^22} | {:^11} | {:^34} |",
            dataset.name(),
            dataset.data_authors(),
            format!("{}x{}", width, height),
            format!("*{}", dataset.annotation_suffix()),
        );
    }

    println!("| {:-^10} | {:-^22} | {:-^11} | {:-^34} |", "", "", "", "");
    println!("{:^86}", "\n");

    for dataset in GraspDatasets::iter() {
        println!("{}: {}", dataset.name().bold(), dataset.description());
    }
}
