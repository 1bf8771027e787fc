//! Path checks shared by the pipeline entry points

use std::path::Path;

use crate::error::{AppError, Result};

/// Reject empty paths and directories given as output destinations
pub(crate) fn validate_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(AppError::InvalidInput("output path is empty".to_string()));
    }
    if path.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "output path {} is a directory",
            path.display()
        )));
    }
    Ok(())
}

/// Reject output sets that would overwrite the input or each other
pub(crate) fn validate_distinct(input: &Path, outputs: &[&Path]) -> Result<()> {
    for (i, output) in outputs.iter().enumerate() {
        if *output == input {
            return Err(AppError::InvalidInput(format!(
                "output {} would overwrite the input image",
                output.display()
            )));
        }
        if outputs[..i].contains(output) {
            return Err(AppError::InvalidInput(format!(
                "output {} is given twice",
                output.display()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path(Path::new("")).is_err());
        assert!(validate_output_path(Path::new("photo.jpg")).is_ok());

        let dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(dir.path()).is_err());
    }

    #[test]
    fn test_validate_distinct() {
        let input = Path::new("in.jpg");
        assert!(validate_distinct(input, &[Path::new("a.jpg"), Path::new("b.jpg")]).is_ok());
        assert!(validate_distinct(input, &[Path::new("in.jpg")]).is_err());
        assert!(validate_distinct(input, &[Path::new("a.jpg"), Path::new("a.jpg")]).is_err());
    }
}
