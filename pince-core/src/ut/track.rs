// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use colored::*;
use kdam::{Bar, tqdm};

/// A basic progress bar for tracking evaluated images
pub fn progress_bar(n: usize, desc: &str, verbose: bool) -> Bar {
    if !verbose {
        return tqdm!(disable = true);
    }

    tqdm!(
        total = n,
        force_refresh = false,
        desc = progress_timestamp(desc),
        bar_format =
            "{desc suffix=' '}[{percentage:.0}%] ({rate:.1}/s, eta: {remaining human=true})"
    )
}

/// Prefix a message with a standardized timestamp and the pince tag
pub fn progress_timestamp(desc: &str) -> String {
    let time = chrono::Local::now();
    let time = format!(
        "{} | {}",
        time.format("%Y-%m-%d"),
        time.format("%H:%M:%S")
    );

    format!(
        "{} {} {} {} {} {}",
        "[".bold(),
        time,
        "|".bold(),
        "pince".truecolor(214, 96, 77).bold(),
        "]".bold(),
        desc,
    )
}

/// Print timestamped statements to console
pub fn progress_log(desc: &str, verbose: bool) {
    if !verbose {
        return;
    }

    println!("{}", progress_timestamp(desc));
}

/// Format numbers to readable thousands format
///
/// # Examples
///
/// ```
/// use pince_core::ut::track::thousands_format;
///
/// assert_eq!(thousands_format(885), "885");
/// assert_eq!(thousands_format(54321), "54,321");
/// assert_eq!(thousands_format(1234567), "1,234,567");
/// ```
pub fn thousands_format<T>(number: T) -> String
where
    T: std::fmt::Display,
{
    let number = number.to_string();

    if number.len() <= 4 {
        return number;
    }

    number
        .as_bytes()
        .rchunks(3)
        .rev()
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect::<Vec<&str>>()
        .join(",")
}
