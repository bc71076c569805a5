//! `proptest` configuration shared by every property suite.
//!
//! `PROGTEST_CASES` overrides the per-suite case count and `NNS_PBT_FORK`
//! runs cases in forked subprocesses. Malformed overrides are logged and
//! ignored.

use std::{env, fmt::Display, str::FromStr};

use proptest::test_runner::Config;

/// Environment variable overriding the number of cases per property.
pub const CASES_ENV: &str = "PROGTEST_CASES";
/// Environment variable enabling forked case execution.
pub const FORK_ENV: &str = "NNS_PBT_FORK";

/// Builds the runner configuration for a suite that defaults to
/// `default_cases` cases.
///
/// # Examples
///
/// ```
/// let config = nns_test_support::property_config(48);
/// assert!(config.cases > 0);
/// ```
#[must_use]
pub fn property_config(default_cases: u32) -> Config {
    assemble(
        default_cases,
        env_override::<CaseCount>(CASES_ENV).map(|count| count.0),
        env_override::<Switch>(FORK_ENV).map(|switch| switch.0),
    )
}

fn assemble(default_cases: u32, cases: Option<u32>, fork: Option<bool>) -> Config {
    Config {
        cases: cases.unwrap_or(default_cases),
        fork: fork.unwrap_or(false),
        ..Config::default()
    }
}

fn env_override<T>(key: &'static str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).ok()?;
    raw.parse::<T>()
        .inspect_err(|reason| {
            tracing::warn!(env = key, raw = %raw, %reason, "ignoring malformed property-test override");
        })
        .ok()
}

/// Strictly positive case count.
#[derive(Debug, PartialEq, Eq)]
struct CaseCount(u32);

impl FromStr for CaseCount {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().parse::<u32>() {
            Ok(0) => Err("case count must be positive".to_owned()),
            Ok(count) => Ok(Self(count)),
            Err(error) => Err(error.to_string()),
        }
    }
}

/// On/off flag accepting the usual shell spellings.
#[derive(Debug, PartialEq, Eq)]
struct Switch(bool);

impl FromStr for Switch {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Self(true)),
            "0" | "false" | "no" | "off" => Ok(Self(false)),
            other => Err(format!("`{other}` is not an on/off value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Some(1))]
    #[case(" 250 ", Some(250))]
    #[case("0", None)]
    #[case("-1", None)]
    #[case("many", None)]
    fn case_counts_must_be_positive(#[case] raw: &str, #[case] expected: Option<u32>) {
        assert_eq!(raw.parse::<CaseCount>().ok().map(|count| count.0), expected);
    }

    #[rstest]
    #[case("TRUE", Some(true))]
    #[case("on", Some(true))]
    #[case("0", Some(false))]
    #[case("no", Some(false))]
    #[case("sometimes", None)]
    #[case("", None)]
    fn switches_accept_shell_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(raw.parse::<Switch>().ok().map(|switch| switch.0), expected);
    }

    #[rstest]
    #[case(None, None, 64, false)]
    #[case(Some(5), None, 5, false)]
    #[case(None, Some(true), 64, true)]
    fn overrides_replace_defaults(
        #[case] cases: Option<u32>,
        #[case] fork: Option<bool>,
        #[case] expected_cases: u32,
        #[case] expected_fork: bool,
    ) {
        let config = assemble(64, cases, fork);
        assert_eq!(config.cases, expected_cases);
        assert_eq!(config.fork, expected_fork);
    }
}
