//! Target Python version.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// `py38` style, as used by black and ruff.
    pub fn short_representation(&self) -> String {
        format!("py{}{}", self.major, self.minor)
    }

    /// `3.8` style, as used by mypy.
    pub fn version(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self::new(3, 8)
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_representation())
    }
}

impl FromStr for PythonVersion {
    type Err = ConfigError;

    /// Accepts `py38`, `py310` and `3.8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::invalid(format!("invalid python version: {}", s));
        let lower = s.trim().to_ascii_lowercase();

        if let Some(digits) = lower.strip_prefix("py") {
            if digits.len() < 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let (major, minor) = digits.split_at(1);
            return Ok(Self::new(
                major.parse().map_err(|_| invalid())?,
                minor.parse().map_err(|_| invalid())?,
            ));
        }

        let (major, minor) = lower.split_once('.').ok_or_else(invalid)?;
        Ok(Self::new(
            major.parse().map_err(|_| invalid())?,
            minor.parse().map_err(|_| invalid())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::short("py38", PythonVersion::new(3, 8))]
    #[case::two_digit_minor("py310", PythonVersion::new(3, 10))]
    #[case::upper("PY37", PythonVersion::new(3, 7))]
    #[case::dotted("3.11", PythonVersion::new(3, 11))]
    fn test_parse(#[case] input: &str, #[case] expected: PythonVersion) {
        assert_eq!(input.parse::<PythonVersion>().unwrap(), expected);
    }

    #[rstest]
    #[case("py3")]
    #[case("python3.8")]
    #[case("38")]
    #[case("pyxy")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_representations() {
        let version = PythonVersion::new(3, 10);
        assert_eq!(version.short_representation(), "py310");
        assert_eq!(version.version(), "3.10");
    }
}
