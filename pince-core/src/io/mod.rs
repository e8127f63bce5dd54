// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

mod npy;
mod table;

pub use npy::read_prediction_npz;
pub use npy::write_prediction_npz;

pub use table::write_table;
pub use table::write_table_csv;
pub use table::write_table_pq;
pub use table::write_table_tsv;
pub use table::{results_table, write_results};
