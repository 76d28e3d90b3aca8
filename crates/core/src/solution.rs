//! Minimal reader for Visual Studio solution files.
//!
//! Only the `Project(...) = ...` lines matter to the build: they give each
//! project's name and location.

use std::path::{Path, PathBuf};

use crate::types::{KilnError, KilnResult};

/// Project type GUID of solution folders, which are not real projects.
const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionProject {
    pub name: String,
    /// Path of the project file, relative to the solution directory.
    pub path: PathBuf,
}

impl SolutionProject {
    /// Directory holding the project file.
    pub fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn is_test_project(&self) -> bool {
        self.name.ends_with(".Tests")
    }

    /// Projects under a `Tests` directory are never published.
    pub fn is_publishable(&self) -> bool {
        !self.path.components().any(|c| c.as_os_str() == "Tests")
    }
}

/// Parse solution text, skipping solution folders and the `excluded` project.
pub fn parse_solution(content: &str, excluded: &str) -> KilnResult<Vec<SolutionProject>> {
    let mut projects = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if !line.starts_with("Project(") {
            continue;
        }

        let (type_part, rest) = line.split_once('=').ok_or_else(|| {
            KilnError::Solution(format!("Malformed project entry on line {}", index + 1))
        })?;

        let fields = quoted_fields(rest);
        if fields.len() < 2 {
            return Err(KilnError::Solution(format!(
                "Project entry on line {} is missing its name or path",
                index + 1
            )));
        }

        if type_part.to_uppercase().contains(SOLUTION_FOLDER_TYPE) {
            continue;
        }

        let name = fields[0].to_string();
        if name == excluded {
            continue;
        }

        projects.push(SolutionProject {
            name,
            path: PathBuf::from(fields[1].replace('\\', "/")),
        });
    }

    Ok(projects)
}

/// Load and parse the solution file at `path`.
pub fn load_solution(path: &Path, excluded: &str) -> KilnResult<Vec<SolutionProject>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        KilnError::Solution(format!("Failed to read solution {}: {}", path.display(), e))
    })?;
    parse_solution(&content, excluded)
}

fn quoted_fields(text: &str) -> Vec<&str> {
    text.split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, field)| field)
        .collect()
}
