// SPDX-FileCopyrightText: 2026 patient_redactor developers
// SPDX-License-Identifier: BSD-3-Clause

//! Output path derivation.
//!
//! The redacted document is written next to where the tool is run: the input
//! file name prefixed with `redacted_`, in the current working directory.

use std::path::{Path, PathBuf};

/// Build the output path for `input_path`: `redacted_<file name>` in the
/// current working directory.
pub fn redacted_output_path(input_path: &Path) -> PathBuf {
    let file_name = input_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_path.to_string_lossy().into_owned());

    PathBuf::from(format!("redacted_{}", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_output_path_plain_name() {
        let out = redacted_output_path(Path::new("report.pdf"));
        assert_eq!(out, PathBuf::from("redacted_report.pdf"));
    }

    #[test]
    fn test_redacted_output_path_drops_parent() {
        // Output always lands in the current working directory.
        let out = redacted_output_path(Path::new("some/dir/report.pdf"));
        assert_eq!(out, PathBuf::from("redacted_report.pdf"));
    }

    #[test]
    fn test_redacted_output_path_unicode_filename() {
        let out = redacted_output_path(Path::new("wyniki_badań.pdf"));
        assert_eq!(out, PathBuf::from("redacted_wyniki_badań.pdf"));
    }
}
