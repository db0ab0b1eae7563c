use std::error::Error;
use std::fmt;

/// InputValueError is used if some user supplied option does not fulfill the posed requirements,
/// e.g., a coordinate pair that is not of the form `lat,lng`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueError {
    pub input: String,
}

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value: {:?}", self.input)
    }
}

impl Error for InputValueError {}

/// format_race_time converts a duration in milliseconds into the `MM:SS.CC` race clock format.
/// Minutes are not bounded and are padded to at least two digits.
pub fn format_race_time(ms: u64) -> String {
    let min = ms / 60_000;
    let sec = (ms % 60_000) / 1000;
    let centi = (ms % 1000) / 10;
    format!("{:02}:{:02}.{:02}", min, sec, centi)
}

/// parse_coordinate_pair parses a `lat,lng` string (whitespace around both parts is allowed).
pub fn parse_coordinate_pair(s: &str) -> Result<(f64, f64), InputValueError> {
    let err = || InputValueError {
        input: s.to_owned(),
    };

    let mut parts = s.split(',');
    let lat = parts
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(err)?;
    let lng = parts
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(err)?;

    if parts.next().is_some() || !lat.is_finite() || !lng.is_finite() {
        return Err(err());
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(err());
    }

    Ok((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_race_time(0), "00:00.00");
    }

    #[test]
    fn formats_minutes_and_centiseconds() {
        assert_eq!(format_race_time(61_005), "01:01.00");
        assert_eq!(format_race_time(500), "00:00.50");
        assert_eq!(format_race_time(59_999), "00:59.99");
    }

    #[test]
    fn minutes_are_unbounded() {
        // 125 minutes, 7.5 seconds
        assert_eq!(format_race_time(125 * 60_000 + 7_500), "125:07.50");
    }

    #[test]
    fn parses_coordinate_pairs() {
        assert_eq!(parse_coordinate_pair("55.944,-3.188"), Ok((55.944, -3.188)));
        assert_eq!(parse_coordinate_pair(" 1.5 , 2 "), Ok((1.5, 2.0)));
    }

    #[test]
    fn rejects_malformed_coordinate_pairs() {
        assert!(parse_coordinate_pair("55.944").is_err());
        assert!(parse_coordinate_pair("a,b").is_err());
        assert!(parse_coordinate_pair("1,2,3").is_err());
        assert!(parse_coordinate_pair("91,0").is_err());
    }
}
