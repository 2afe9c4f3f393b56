//! @ai:module:intent Classify process definitions by whether their annotations parse
//! @ai:module:layer application
//! @ai:module:public_api check_file, check_path, CheckStatus, CheckReport
//! @ai:module:depends_on config, output, error
//! @ai:module:stateless true

use crate::config::ProcessFile;
use crate::error::Result;
use crate::output::AnnotationReport;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Outcome of checking one definition file
#[derive(Debug, Clone, PartialEq)]
pub enum CheckStatus {
    Ok,
    /// Some section holds malformed option text
    Malformed(String),
    /// The file could not be read, parsed as TOML or turned into a process
    Unreadable(String),
}

/// @ai:intent Per-file outcomes of a check run, in walk order
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub files: Vec<(PathBuf, CheckStatus)>,
}

impl CheckReport {
    pub fn ok(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Ok))
    }

    pub fn malformed(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Malformed(_)))
    }

    pub fn unreadable(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Unreadable(_)))
    }

    /// @ai:intent Process exit code for this run
    /// @ai:post 1 on any malformed annotation, else 2 on any unreadable file, else 0
    pub fn exit_code(&self) -> u8 {
        if self.malformed() > 0 {
            1
        } else if self.unreadable() > 0 {
            2
        } else {
            0
        }
    }

    fn count(&self, pred: impl Fn(&CheckStatus) -> bool) -> usize {
        self.files.iter().filter(|(_, status)| pred(status)).count()
    }
}

/// @ai:intent Load a definition and parse every section of its annotation
/// @ai:effects fs:read
pub fn check_file(path: &Path) -> CheckStatus {
    match load_and_parse(path) {
        Ok(()) => CheckStatus::Ok,
        Err(e) if e.is_format() => CheckStatus::Malformed(e.to_string()),
        Err(e) => CheckStatus::Unreadable(e.to_string()),
    }
}

fn load_and_parse(path: &Path) -> Result<()> {
    let process = ProcessFile::load(path)?.into_proc()?;
    let process = process.borrow();
    if let Some(annotation) = process.annotation() {
        AnnotationReport::build(&path.to_string_lossy(), annotation, None)?;
    }
    Ok(())
}

/// @ai:intent Check one definition file, or every `.toml` file under a directory
/// @ai:effects fs:read
pub fn check_path(path: &Path) -> CheckReport {
    let files: Vec<PathBuf> = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "toml"))
            .map(|e| e.path().to_path_buf())
            .collect()
    };

    let files = files
        .into_iter()
        .map(|file| {
            let status = check_file(&file);
            tracing::debug!(file = %file.display(), ?status, "checked definition");
            (file, status)
        })
        .collect();

    CheckReport { files }
}
