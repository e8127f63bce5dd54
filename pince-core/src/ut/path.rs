// Copyright (c) 2025-2026, Tom Ouellette
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::PinceError;

/// Ensures an output directory exists, creating it and its parents if missing
///
/// Existing files inside the directory are overwritten by later writes. A
/// path that exists but is not a directory is an error.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use pince_core::ut::path::ensure_directory;
///
/// let base = Path::new("TEST_ENSURE_DIRECTORY/nested");
///
/// assert_eq!(ensure_directory(base).unwrap(), base);
/// assert_eq!(ensure_directory(base).unwrap(), base);
///
/// std::fs::remove_dir_all("TEST_ENSURE_DIRECTORY").unwrap();
/// ```
pub fn ensure_directory<P: AsRef<Path>>(directory: P) -> Result<PathBuf, PinceError> {
    let directory = directory.as_ref();

    if directory.exists() && !directory.is_dir() {
        return Err(PinceError::DirError(format!(
            "Output path exists and is not a directory: {}",
            directory.display()
        )));
    }

    std::fs::create_dir_all(directory).map_err(|err| PinceError::DirError(err.to_string()))?;

    Ok(directory.to_path_buf())
}

/// Collect file paths from a directory with an optional substring filter
///
/// Paths are returned in sorted order.
///
/// # Arguments
///
/// * `directory` - Path to directory containing files
/// * `valid_ext` - Only include files with one of these extensions
/// * `substring` - Only include files whose name contains this substring
///
/// # Examples
///
/// ```no_run
/// use pince_core::ut::path::collect_file_paths;
/// use pince_core::constant::SUPPORTED_MAP_FORMATS;
/// let files = collect_file_paths("predictions/", SUPPORTED_MAP_FORMATS.as_slice(), None);
/// ```
pub fn collect_file_paths<P: AsRef<Path>>(
    directory: P,
    valid_ext: &[&str],
    substring: Option<&str>,
) -> Result<Vec<PathBuf>, PinceError> {
    let directory = directory.as_ref();

    let mut files: Vec<PathBuf> = std::fs::read_dir(directory)
        .map_err(|_| PinceError::DirError(directory.display().to_string()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| valid_ext.contains(&ext.to_lowercase().as_str()))
        })
        .collect();

    if let Some(substring) = substring {
        files.retain(|f| file_name(f).contains(substring));
    }

    files.sort();

    Ok(files)
}

/// Recursively collect files whose name ends with a suffix
///
/// Paths are returned in sorted order so that repeated runs see the same
/// file ordering.
///
/// # Arguments
///
/// * `directory` - Root directory to search
/// * `suffix` - Required ending of the file name (e.g. `cpos.txt`)
pub fn collect_files_recursive<P: AsRef<Path>>(
    directory: P,
    suffix: &str,
) -> Result<Vec<PathBuf>, PinceError> {
    fn visit(directory: &Path, suffix: &str, files: &mut Vec<PathBuf>) -> Result<(), PinceError> {
        let entries = std::fs::read_dir(directory)
            .map_err(|_| PinceError::DirError(directory.display().to_string()))?;

        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();

            if path.is_dir() {
                visit(&path, suffix, files)?;
            } else if file_name(&path).ends_with(suffix) {
                files.push(path);
            }
        }

        Ok(())
    }

    let mut files = Vec::new();
    visit(directory.as_ref(), suffix, &mut files)?;
    files.sort();

    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Pair identifiers with files whose stem matches after removing a substring
///
/// Returns the index of each matched identifier with its file. Identifiers
/// without a file are left out.
///
/// # Arguments
///
/// * `ids` - Identifiers to match (e.g. dataset image names)
/// * `files` - Candidate files
/// * `substring` - Optionally remove a substring from file stems before matching
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use pince_core::ut::path::pair_files_by_stem;
///
/// let ids = vec!["pcd0100".to_string(), "pcd0101".to_string(), "pcd0102".to_string()];
/// let files = vec![
///     PathBuf::from("predictions/pcd0100_pred.npz"),
///     PathBuf::from("predictions/pcd0102_pred.npz"),
/// ];
///
/// let pairs = pair_files_by_stem(&ids, &files, Some("_pred"));
/// assert_eq!(pairs.len(), 2);
/// assert_eq!(pairs[1].0, 2);
///
/// let pairs = pair_files_by_stem(&ids, &files, None);
/// assert!(pairs.is_empty());
/// ```
pub fn pair_files_by_stem(
    ids: &[String],
    files: &[PathBuf],
    substring: Option<&str>,
) -> Vec<(usize, PathBuf)> {
    let substring = substring.unwrap_or_default();

    let file_map: HashMap<String, &PathBuf> = files
        .iter()
        .filter_map(|file| {
            file.file_stem().map(|stem| {
                let name = if substring.is_empty() {
                    stem.to_string_lossy().to_string()
                } else {
                    stem.to_string_lossy().replace(substring, "")
                };
                (name, file)
            })
        })
        .collect();

    ids.par_iter()
        .enumerate()
        .filter_map(|(idx, id)| file_map.get(id).map(|file| (idx, (*file).clone())))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ensure_directory_reuses_existing() {
        const OUTPUT: &str = "TEST_ENSURE_DIRECTORY_EXISTING";

        std::fs::create_dir_all(OUTPUT).unwrap();
        std::fs::write(Path::new(OUTPUT).join("grasps.json"), "{}").unwrap();

        assert_eq!(ensure_directory(OUTPUT).unwrap(), Path::new(OUTPUT));
        assert!(Path::new(OUTPUT).join("grasps.json").exists());
        assert!(!Path::new("TEST_ENSURE_DIRECTORY_EXISTING_0").exists());

        std::fs::remove_dir_all(OUTPUT).unwrap();
    }

    #[test]
    fn test_ensure_directory_rejects_file() {
        const OUTPUT: &str = "TEST_ENSURE_DIRECTORY_FILE.txt";

        std::fs::write(OUTPUT, "").unwrap();
        assert!(matches!(
            ensure_directory(OUTPUT),
            Err(PinceError::DirError(_))
        ));

        std::fs::remove_file(OUTPUT).unwrap();
    }

    #[test]
    fn test_collect_files_recursive() {
        let files = collect_files_recursive("../data/tests/cornell", "cpos.txt").unwrap();
        assert_eq!(files.len(), 1);
        assert!(file_name(&files[0]).starts_with("pcd0100"));

        assert!(collect_files_recursive("does_not_exist/", "cpos.txt").is_err());
    }

    #[test]
    fn test_collect_file_paths_extension() {
        let files = collect_file_paths("../data/tests", &["json"], None).unwrap();
        assert!(files.iter().all(|f| f.extension().unwrap() == "json"));
        assert!(!files.is_empty());

        let files = collect_file_paths("../data/tests", &["json"], Some("does_not_match")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_pair_files_preserves_order() {
        let ids: Vec<String> = (0..50).map(|i| format!("id_{}", i)).collect();
        let files: Vec<PathBuf> = (0..50)
            .rev()
            .map(|i| PathBuf::from(format!("dir/id_{}.npz", i)))
            .collect();

        let pairs = pair_files_by_stem(&ids, &files, None);
        assert_eq!(pairs.len(), 50);
        assert!(pairs.iter().enumerate().all(|(i, (idx, _))| i == *idx));
    }
}
