//! `SRID=4326;POINT(lng lat)` literals.
//!
//! The map clients exchange geometry as extended well-known-text point
//! literals; the parser accepts plain `POINT(...)` as well.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Point;

static POINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)POINT\((-?\d+\.?\d*)\s+(-?\d+\.?\d*)\)").unwrap());

/// Format a point as an EWKT literal.
pub fn to_ewkt(point: Point) -> String {
    format!("SRID=4326;POINT({} {})", point.lng, point.lat)
}

/// Parse a point literal; `None` for anything malformed or out of range.
pub fn parse_point(text: &str) -> Option<Point> {
    let caps = POINT_RE.captures(text)?;
    let lng: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lat: f64 = caps.get(2)?.as_str().parse().ok()?;

    Point::new(lng, lat).ok()
}
