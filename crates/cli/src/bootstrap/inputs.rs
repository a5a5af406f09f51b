use anyhow::Context;
use std::path::Path;

/// Reads a list file: one entry per line, blank lines and `#` comments skipped.
pub fn read_list(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read list file {}", path.display()))?;
    Ok(parse_list(&content))
}

pub fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_skips_blanks_and_comments() {
        let content = "# resolvers\n8.8.8.8\n\n  1.1.1.1  \n#9.9.9.9\n";
        assert_eq!(parse_list(content), vec!["8.8.8.8", "1.1.1.1"]);
    }

    #[test]
    fn test_read_list_reports_missing_file() {
        let err = read_list(Path::new("/nonexistent/names.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/names.txt"));
    }
}
