//! `YYYY/MM/DD` date helpers.

use regex::Regex;
use std::sync::LazyLock;

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{2})/(\d{2})").expect("valid regex"));

/// Year of a `YYYY/MM/DD`-prefixed date string, or `None` if malformed.
pub fn year_from_date(date: &str) -> Option<i32> {
    let caps = DATE_PREFIX.captures(date)?;
    caps[1].parse().ok()
}

/// Year and 1-based month of a `YYYY/MM/DD`-prefixed date string.
pub fn year_month_from_date(date: &str) -> Option<(i32, u32)> {
    let caps = DATE_PREFIX.captures(date)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}
