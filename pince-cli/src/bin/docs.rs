// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use clap::{Parser, Subcommand};

use pince_cli::{datasets, evaluate};

#[derive(Parser)]
#[command(name = "pince", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Evaluate(evaluate::EvaluateArgs),
    Datasets(datasets::DatasetsArgs),
}

fn main() {
    clap_markdown::print_help_markdown::<Cli>();
}
