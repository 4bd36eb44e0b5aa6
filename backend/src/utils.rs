use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

pub const MIN_RESULTS: usize = 1;
pub const MAX_RESULTS: usize = 10;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

lazy_static! {
    static ref VIDEO_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();
}

pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}

/// YouTube video ids are always 11 url-safe base64 characters.
pub fn is_valid_video_id(video_id: &str) -> bool {
    VIDEO_ID_RE.is_match(video_id)
}

pub fn clamp_limit(limit: i64) -> usize {
    limit.clamp(MIN_RESULTS as i64, MAX_RESULTS as i64) as usize
}

/// Limit from a query-string value. Missing or non-numeric means one result.
pub fn limit_from_str(raw: Option<&str>) -> usize {
    let parsed = raw.and_then(|s| {
        let s = s.trim();
        s.parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
    });

    match parsed {
        Some(n) => clamp_limit(n),
        None => MIN_RESULTS,
    }
}

/// Limit from a JSON body value. Numbers and numeric strings are accepted.
pub fn limit_from_json(raw: Option<&Value>) -> usize {
    match raw {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(clamp_limit)
            .unwrap_or(MIN_RESULTS),
        Some(Value::String(s)) => limit_from_str(Some(s)),
        _ => MIN_RESULTS,
    }
}
