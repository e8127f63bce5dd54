// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

use pince_core::gr::{GroundTruth, HeatMaps, Prediction};
use pince_core::io::write_prediction_npz;

const TEST_CORNELL: &str = "../data/tests/cornell";
const TEST_JACQUARD: &str = "../data/tests/jacquard";
const JACQUARD_ID: &str = "0_1a9fa4c269cfcc1b738e43095496b061";

/// Write heat maps with a single grasp peak
fn write_single_peak(path: &Path, size: usize, row: usize, col: usize, width: f32) {
    let mut quality = vec![0.0; size * size];
    quality[row * size + col] = 0.9;

    let maps = HeatMaps::new(
        size,
        size,
        quality,
        vec![0.0; size * size],
        vec![width; size * size],
    )
    .unwrap();

    let prediction = Prediction {
        maps,
        rotation: 0.0,
        zoom: 1.0,
    };

    write_prediction_npz(path, &prediction).unwrap();
}

#[test]
fn test_datasets_list() {
    Command::cargo_bin("pince")
        .unwrap()
        .args(["datasets", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cornell"))
        .stdout(predicate::str::contains("jacquard"));
}

#[test]
fn test_datasets_summary() {
    Command::cargo_bin("pince")
        .unwrap()
        .args(["datasets", "-n", "cornell", "-d", TEST_CORNELL, "--input-size", "300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Detected 1 images with 2 annotated grasps."));
}

#[test]
fn test_unknown_dataset() {
    Command::cargo_bin("pince")
        .unwrap()
        .args(["datasets", "-n", "graspnet", "-d", TEST_CORNELL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_jacquard_output_requires_jacquard() {
    Command::cargo_bin("pince")
        .unwrap()
        .args([
            "evaluate",
            "iou",
            "-d",
            "cornell",
            "-p",
            TEST_CORNELL,
            "-i",
            ".",
            "--jacquard-output",
            "TEST_CLI_UNUSED.txt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--jacquard-output can only be used with the --dataset jacquard option.",
        ));

    assert!(!Path::new("TEST_CLI_UNUSED.txt").exists());
}

#[test]
fn test_evaluate_iou_cornell() {
    let predictions = Path::new("TEST_CLI_CORNELL_PREDICTIONS");
    std::fs::create_dir_all(predictions).unwrap();

    // The second annotation lands at (170, 128) in a 300 pixel crop
    write_single_peak(&predictions.join("pcd0100.npz"), 300, 128, 170, 20.0);

    let results = predictions.join("results.csv");

    Command::cargo_bin("pince")
        .unwrap()
        .args(["evaluate", "iou", "-d", "cornell", "-p", TEST_CORNELL])
        .args(["-i", predictions.to_str().unwrap()])
        .args(["--input-size", "300", "--split", "0.0"])
        .args(["-o", results.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("IOU Results: 1/1 = 1.000000"));

    let table = std::fs::read_to_string(&results).unwrap();
    assert!(table.starts_with("image,correct,iou,candidates,quality"));
    assert!(table.contains("pcd0100,true"));

    std::fs::remove_dir_all(predictions).unwrap();
}

#[test]
fn test_evaluate_iou_miss() {
    let predictions = Path::new("TEST_CLI_CORNELL_MISS");
    std::fs::create_dir_all(predictions).unwrap();

    write_single_peak(&predictions.join("pcd0100.npz"), 300, 20, 20, 20.0);

    Command::cargo_bin("pince")
        .unwrap()
        .args(["evaluate", "iou", "-d", "cornell", "-p", TEST_CORNELL])
        .args(["-i", predictions.to_str().unwrap()])
        .args(["--input-size", "300", "--split", "0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IOU Results: 0/1 = 0.000000"));

    std::fs::remove_dir_all(predictions).unwrap();
}

#[test]
fn test_evaluate_iou_jacquard_output() {
    let predictions = Path::new("TEST_CLI_JACQUARD_PREDICTIONS");
    std::fs::create_dir_all(predictions).unwrap();

    // The first annotation is centered in a 512 pixel input
    write_single_peak(
        &predictions.join(format!("{}.npz", JACQUARD_ID)),
        512,
        256,
        256,
        16.0,
    );

    let output = predictions.join("jacquard_output.txt");

    Command::cargo_bin("pince")
        .unwrap()
        .args(["evaluate", "iou", "-d", "jacquard", "-p", TEST_JACQUARD])
        .args(["-i", predictions.to_str().unwrap()])
        .args(["--input-size", "512", "--split", "0.0"])
        .args(["--jacquard-output", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("IOU Results: 1/1 = 1.000000"));

    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines, vec![JACQUARD_ID, "512.00;512.00;0.00;64.00;32.00"]);

    std::fs::remove_dir_all(predictions).unwrap();
}

#[test]
fn test_evaluate_grasps() {
    let predictions = Path::new("TEST_CLI_GRASP_PREDICTIONS");
    let output = Path::new("TEST_CLI_GRASP_OUTPUT");
    std::fs::create_dir_all(predictions).unwrap();

    write_single_peak(&predictions.join("scene_a_pred.npz"), 64, 30, 40, 12.0);
    write_single_peak(&predictions.join("scene_b_pred.npz"), 64, 10, 50, 8.0);

    Command::cargo_bin("pince")
        .unwrap()
        .args(["evaluate", "grasps"])
        .args(["-i", predictions.to_str().unwrap()])
        .args(["-o", output.to_str().unwrap()])
        .args(["--prediction-substring", "_pred", "--min-distance", "5"])
        .assert()
        .success();

    let grasps = GroundTruth::open(output.join("scene_a.json")).unwrap();
    assert_eq!(grasps.len(), 1);
    assert_eq!(grasps.as_rectangles()[0].center(), [40., 30.]);
    assert_eq!(grasps.as_rectangles()[0].length(), 24.);

    assert!(output.join("scene_b.json").exists());
    assert!(output.join("grasp_counts.tsv").exists());

    std::fs::remove_dir_all(predictions).unwrap();
    std::fs::remove_dir_all(output).unwrap();
}

#[test]
fn test_evaluate_grasps_reuses_output() {
    let predictions = Path::new("TEST_CLI_GRASP_RERUN_PREDICTIONS");
    let output = Path::new("TEST_CLI_GRASP_RERUN_OUTPUT");
    std::fs::create_dir_all(predictions).unwrap();

    write_single_peak(&predictions.join("scene_c.npz"), 64, 20, 20, 10.0);

    for _ in 0..2 {
        Command::cargo_bin("pince")
            .unwrap()
            .args(["evaluate", "grasps"])
            .args(["-i", predictions.to_str().unwrap()])
            .args(["-o", output.to_str().unwrap()])
            .args(["--min-distance", "5"])
            .assert()
            .success();
    }

    assert!(output.join("scene_c.json").exists());
    assert!(!Path::new("TEST_CLI_GRASP_RERUN_OUTPUT_0").exists());

    let counts = std::fs::read_to_string(output.join("grasp_counts.tsv")).unwrap();
    assert_eq!(counts.trim(), "scene_c\t1");

    std::fs::remove_dir_all(predictions).unwrap();
    std::fs::remove_dir_all(output).unwrap();
}
