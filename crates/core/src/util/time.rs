//! Clock-string conversion. Internal computation always uses raw seconds;
//! `MM:SS` rendering happens only at the serialization boundary.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid MM:SS string: {0}")]
pub struct ParseTimeError(String);

/// Render a second offset as `MM:SS`, rounding to the nearest whole second.
pub fn seconds_to_mmss(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse an `MM:SS` string back into seconds.
pub fn parse_mmss(mmss: &str) -> Result<f64, ParseTimeError> {
    let err = || ParseTimeError(mmss.to_owned());
    let (minutes, seconds) = mmss.split_once(':').ok_or_else(err)?;
    let minutes: u64 = minutes.parse().map_err(|_| err())?;
    let seconds: u64 = seconds.parse().map_err(|_| err())?;
    if seconds >= 60 {
        return Err(err());
    }
    Ok((minutes * 60 + seconds) as f64)
}
