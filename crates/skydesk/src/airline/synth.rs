//! Random building blocks for the synthetic airline data the tools hand back

use chrono::{Duration, NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

pub const AIRLINES: &[(&str, &str)] = &[
    ("AA", "American Airlines"),
    ("UA", "United Airlines"),
    ("DL", "Delta Air Lines"),
    ("AS", "Alaska Airlines"),
    ("B6", "JetBlue"),
    ("WN", "Southwest Airlines"),
];

pub const AIRCRAFT: &[&str] = &[
    "Boeing 737-800",
    "Boeing 787-9",
    "Airbus A320neo",
    "Airbus A321",
    "Embraer E175",
];

pub const FLIGHT_STATUSES: &[&str] = &["On Time", "Delayed", "Boarding", "Departed", "Landed"];

pub const CABINS: &[&str] = &["economy", "premium_economy", "business", "first"];

/// One element of a non-empty table
pub fn pick<T: Copy>(items: &[T]) -> T {
    items[rand::thread_rng().gen_range(0..items.len())]
}

/// Up to `count` distinct elements of a table, in random order
pub fn sample<T: Copy>(items: &[T], count: usize) -> Vec<T> {
    items
        .choose_multiple(&mut rand::thread_rng(), count)
        .copied()
        .collect()
}

pub fn between(low: u32, high: u32) -> u32 {
    rand::thread_rng().gen_range(low..=high)
}

pub fn chance(probability: f64) -> bool {
    rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
}

/// A price in whole cents, rendered as a two-decimal amount
pub fn price(low: u32, high: u32) -> f64 {
    let cents = rand::thread_rng().gen_range(low * 100..=high * 100);
    cents as f64 / 100.0
}

pub fn flight_number() -> String {
    let (code, _) = pick(AIRLINES);
    format!("{}{}", code, between(100, 2999))
}

pub fn airline_name(flight_number: &str) -> &'static str {
    AIRLINES
        .iter()
        .find(|(code, _)| flight_number.to_uppercase().starts_with(code))
        .map(|(_, name)| *name)
        .unwrap_or("Skydesk Air")
}

pub fn confirmation_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .filter(|c| !c.is_ascii_lowercase())
        .take(6)
        .collect()
}

pub fn reference(prefix: &str) -> String {
    format!("{}-{}", prefix, between(100_000, 999_999))
}

pub fn clock_time() -> String {
    format!("{:02}:{:02}", between(5, 22), pick(&[0, 5, 15, 20, 30, 35, 45, 50]))
}

pub fn gate() -> String {
    format!("{}{}", pick(&['A', 'B', 'C', 'D', 'E']), between(1, 40))
}

pub fn duration(min_minutes: u32, max_minutes: u32) -> String {
    let minutes = between(min_minutes, max_minutes);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

pub fn seat() -> String {
    format!("{}{}", between(6, 38), pick(&['A', 'B', 'C', 'D', 'E', 'F']))
}

/// The given date if it parses as YYYY-MM-DD, otherwise a date in the next few weeks
pub fn travel_date(date: Option<&str>) -> String {
    date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| (Utc::now() + Duration::days(between(3, 30) as i64)).date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

pub fn timestamp_in(minutes: i64) -> String {
    (Utc::now() + Duration::minutes(minutes)).to_rfc3339()
}
