use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Extension of the analyzer's tabular output.
const OUTPUT_EXTENSION: &str = "csv";

/// Find the analyzer's output artifact next to the exchange artifact.
///
/// Candidates are the `.csv` files (any case) in the exchange artifact's
/// directory, the exchange artifact excluded. The most recently modified
/// wins; equal timestamps fall back to the smaller file name.
/// Anything else writing CSV files into that directory can be picked up.
pub fn locate_output(exchange: &Path) -> Result<Option<PathBuf>> {
    let Some(dir) = exchange.parent() else {
        return Ok(None);
    };
    let exchange_name = exchange.file_name();

    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || path.file_name() == exchange_name {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(OUTPUT_EXTENSION));
        if !is_csv {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read mtime: {}", path.display()))?;
        candidates.push((modified, path));
    }

    candidates.sort_by(|(ta, pa), (tb, pb)| {
        tb.cmp(ta)
            .then_with(|| pa.file_name().cmp(&pb.file_name()))
    });

    debug!(
        dir = %dir.display(),
        candidates = candidates.len(),
        "located output candidates"
    );
    Ok(candidates.into_iter().next().map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn set_file_modified_time(path: &Path, secs: u64) {
        let ts = libc::timespec {
            tv_sec: secs as libc::time_t,
            tv_nsec: 0,
        };
        let times = [ts, ts];
        let c_path = std::ffi::CString::new(path.to_str().unwrap()).unwrap();
        let ret = unsafe { libc::utimensat(libc::AT_FDCWD, c_path.as_ptr(), times.as_ptr(), 0) };
        assert_eq!(ret, 0, "utimensat failed: {}", std::io::Error::last_os_error());
    }

    #[test]
    fn test_no_candidates_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let exchange = dir.path().join("input.csv");
        fs::write(&exchange, "a,b\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(locate_output(&exchange).unwrap(), None);
    }

    #[test]
    fn test_picks_most_recent() {
        let dir = tempfile::TempDir::new().unwrap();
        let exchange = dir.path().join("input.csv");
        fs::write(&exchange, "a,b\n").unwrap();
        let old = dir.path().join("Output_old.csv");
        let new = dir.path().join("Output_new.CSV");
        fs::write(&old, "").unwrap();
        fs::write(&new, "").unwrap();
        set_file_modified_time(&old, 1_600_000_000);
        set_file_modified_time(&new, 1_700_000_000);
        // The exchange file itself is newest but never a candidate
        set_file_modified_time(&exchange, 1_800_000_000);

        assert_eq!(locate_output(&exchange).unwrap(), Some(new));
    }

    #[test]
    fn test_tie_breaks_by_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let exchange = dir.path().join("input.csv");
        fs::write(&exchange, "").unwrap();
        for name in ["c.csv", "a.csv", "b.csv"] {
            let path = dir.path().join(name);
            fs::write(&path, "").unwrap();
            set_file_modified_time(&path, 1_700_000_000);
        }

        for _ in 0..3 {
            assert_eq!(
                locate_output(&exchange).unwrap(),
                Some(dir.path().join("a.csv"))
            );
        }
    }

    #[test]
    fn test_ignores_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let exchange = dir.path().join("input.csv");
        fs::write(&exchange, "").unwrap();
        fs::create_dir(dir.path().join("archive.csv")).unwrap();

        assert_eq!(locate_output(&exchange).unwrap(), None);
    }

    #[test]
    fn test_mtime_is_used_not_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let exchange = dir.path().join("input.csv");
        fs::write(&exchange, "").unwrap();
        let a = dir.path().join("a.csv");
        let z = dir.path().join("z.csv");
        fs::write(&a, "").unwrap();
        fs::write(&z, "").unwrap();
        set_file_modified_time(&z, 1_600_000_000);
        set_file_modified_time(&a, 1_600_000_100);

        let found = locate_output(&exchange).unwrap().unwrap();
        assert_eq!(found, a);
        let mtime = fs::metadata(&found).unwrap().modified().unwrap();
        assert_eq!(mtime, UNIX_EPOCH + Duration::from_secs(1_600_000_100));
    }
}
