//! JSON problem loader
//!
//! A problem file holds one object:
//!
//! ```json
//! { "id": "reverse-3", "initial": [["a", "b", "c"]], "goal": [["c", "b", "a"]] }
//! ```

use super::{BlocksProblem, LoadError, LoadResult};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Parse a problem from a JSON string
pub fn parse_problem(contents: &str) -> LoadResult<BlocksProblem> {
    serde_json::from_str(contents).map_err(|e| LoadError::ParseError(e.to_string()))
}

/// Load a single problem from a JSON file
pub fn load_problem<P: AsRef<Path>>(path: P) -> LoadResult<BlocksProblem> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    parse_problem(&contents)
}

/// Load every `.json` problem in a directory
///
/// Files that fail to parse are logged and skipped. Results are sorted by ID.
pub fn load_problems<P: AsRef<Path>>(dir: P) -> LoadResult<Vec<BlocksProblem>> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(LoadError::FileNotFound(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut problems = Vec::new();

    for entry in fs::read_dir(dir)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", dir.display(), e)))?
    {
        let entry = entry.map_err(|e| LoadError::FileNotFound(e.to_string()))?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            match load_problem(&path) {
                Ok(problem) => problems.push(problem),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping problem file"),
            }
        }
    }

    problems.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(problems)
}
