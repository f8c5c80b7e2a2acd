//! Migration discovery
//!
//! Scans the resource root for versioned SQL scripts and produces the
//! ordered execution list.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::definitions::MigrationFile;
use crate::error::{MigrateError, MigrateResult};

/// Filename pattern: case-sensitive `V`, numeric version, double underscore
static FILENAME_VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^V(\d+)__.+$").expect("filename pattern is valid"));

/// Produce the ordered execution list for a resource root
///
/// Walks the root recursively and keeps entries whose extension equals
/// `sql` case-insensitively; everything else is silently ignored. Every
/// kept filename must match `V<version>__<description>`. The list is sorted
/// ascending by version, so execution order is independent of filesystem
/// traversal order. Two files with the same version are rejected; their
/// relative order would otherwise be traversal-dependent.
pub fn make_execution_list(resource_path: &Path) -> MigrateResult<Vec<MigrationFile>> {
    if !resource_path.exists() {
        return Err(MigrateError::NotFound {
            path: resource_path.to_path_buf(),
        });
    }
    if !resource_path.is_dir() {
        return Err(MigrateError::InvalidConfig(format!(
            "Resource path should be a directory: {}",
            resource_path.display()
        )));
    }

    let mut paths = Vec::new();
    collect_sql_files(resource_path, &mut paths)?;

    let mut migrations = paths
        .into_iter()
        .map(parse_migration_path)
        .collect::<MigrateResult<Vec<_>>>()?;

    migrations.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)));

    for pair in migrations.windows(2) {
        if pair[0].version == pair[1].version {
            return Err(MigrateError::DuplicateVersion {
                version: pair[0].version,
                first: pair[0].name.clone(),
                second: pair[1].name.clone(),
            });
        }
    }

    Ok(migrations)
}

fn collect_sql_files(dir: &Path, paths: &mut Vec<PathBuf>) -> MigrateResult<()> {
    let entries = fs::read_dir(dir).map_err(|source| MigrateError::IoFailure {
        name: dir.display().to_string(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| MigrateError::IoFailure {
            name: dir.display().to_string(),
            source,
        })?;

        let path = entry.path();
        if path.is_dir() {
            collect_sql_files(&path, paths)?;
        } else if has_sql_extension(&path) {
            paths.push(path);
        }
    }

    Ok(())
}

fn has_sql_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("sql"))
}

/// Extract the version and normalized name from a script path
fn parse_migration_path(path: PathBuf) -> MigrateResult<MigrationFile> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| MigrateError::InvalidMigrationName {
            name: path.display().to_string(),
        })?;

    let captures = FILENAME_VERSION_PATTERN.captures(filename).ok_or_else(|| {
        MigrateError::InvalidMigrationName {
            name: filename.to_string(),
        }
    })?;

    let version = captures[1]
        .parse::<u64>()
        .map_err(|_| MigrateError::InvalidMigrationName {
            name: filename.to_string(),
        })?;

    Ok(MigrationFile {
        version,
        name: filename.to_lowercase(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "SELECT 1;").unwrap();
    }

    #[test]
    fn orders_by_numeric_version_not_filename() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "V10__tenth.sql");
        touch(dir.path(), "V2__second.sql");
        touch(dir.path(), "V1__first.sql");

        let list = make_execution_list(dir.path()).unwrap();

        let versions: Vec<u64> = list.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2, 10]);
    }

    #[test]
    fn names_are_lowercased_basenames() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "V1__Create_Users.SQL");

        let list = make_execution_list(dir.path()).unwrap();

        assert_eq!(list[0].name, "v1__create_users.sql");
    }

    #[test]
    fn walks_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(dir.path(), "V2__outer.sql");
        touch(&dir.path().join("nested"), "V1__inner.sql");

        let list = make_execution_list(dir.path()).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "v1__inner.sql");
    }

    #[test]
    fn ignores_non_sql_entries() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "V1__init.sql");
        fs::write(dir.path().join("README.txt"), "notes").unwrap();
        fs::write(dir.path().join("V2__draft.sql.bak"), "draft").unwrap();

        let list = make_execution_list(dir.path()).unwrap();

        assert_eq!(list.len(), 1);
    }

    #[test]
    fn rejects_filename_without_version_prefix() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "init.sql");

        let err = make_execution_list(dir.path()).unwrap_err();
        match err {
            MigrateError::InvalidMigrationName { name } => assert_eq!(name, "init.sql"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn version_prefix_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "v1__lowercase_v.sql");

        assert!(matches!(
            make_execution_list(dir.path()),
            Err(MigrateError::InvalidMigrationName { .. })
        ));
    }

    #[test]
    fn rejects_single_underscore_separator() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "V1_missing_underscore.sql");

        assert!(matches!(
            make_execution_list(dir.path()),
            Err(MigrateError::InvalidMigrationName { .. })
        ));
    }

    #[test]
    fn rejects_version_overflow() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "V99999999999999999999999999__huge.sql");

        assert!(matches!(
            make_execution_list(dir.path()),
            Err(MigrateError::InvalidMigrationName { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_versions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "V3__one.sql");
        touch(dir.path(), "V3__other.sql");

        let err = make_execution_list(dir.path()).unwrap_err();
        match err {
            MigrateError::DuplicateVersion {
                version,
                first,
                second,
            } => {
                assert_eq!(version, 3);
                assert_eq!(first, "v3__one.sql");
                assert_eq!(second, "v3__other.sql");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");

        assert!(matches!(
            make_execution_list(&missing),
            Err(MigrateError::NotFound { .. })
        ));
    }

    #[test]
    fn file_root_is_invalid_config() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("migrations");
        fs::write(&file, "").unwrap();

        assert!(matches!(
            make_execution_list(&file),
            Err(MigrateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_root_yields_empty_list() {
        let dir = TempDir::new().unwrap();

        let list = make_execution_list(dir.path()).unwrap();

        assert!(list.is_empty());
    }
}
