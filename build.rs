//! Stamps the commit and build time into `tally --version`.
//!
//! Each stamp can be pinned through its own env var. `SOURCE_DATE_EPOCH` is
//! honored for reproducible builds. Anything that cannot be determined is
//! reported as "unknown".

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const GIT_HASH_VAR: &str = "TALLY_BUILD_GIT_HASH";
const TIMESTAMP_VAR: &str = "TALLY_BUILD_TIMESTAMP";

fn main() {
    watch_git_head(Path::new(".git"));
    for var in [GIT_HASH_VAR, TIMESTAMP_VAR, "SOURCE_DATE_EPOCH"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let commit = pinned(GIT_HASH_VAR).or_else(current_commit);
    let built = pinned(TIMESTAMP_VAR).or_else(build_time);

    stamp(GIT_HASH_VAR, commit);
    stamp(TIMESTAMP_VAR, built);
}

fn stamp(var: &str, value: Option<String>) {
    let value = value.unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env={var}={value}");
}

fn pinned(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Rebuild when HEAD moves, including commits on the checked-out branch.
fn watch_git_head(git_dir: &Path) {
    let head = git_dir.join("HEAD");
    println!("cargo:rerun-if-changed={}", head.display());
    if let Some(branch) = fs::read_to_string(&head)
        .ok()
        .and_then(|text| text.trim().strip_prefix("ref: ").map(str::to_string))
    {
        println!("cargo:rerun-if-changed={}", git_dir.join(branch).display());
    }
}

fn current_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn build_time() -> Option<String> {
    let secs = match pinned("SOURCE_DATE_EPOCH") {
        Some(epoch) => epoch.parse::<u64>().ok()?,
        None => SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs(),
    };
    Some(format_utc(secs))
}

/// `YYYY-MM-DDTHH:MM:SSZ` from seconds since the Unix epoch.
fn format_utc(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
