use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FlagErr;

static SHORT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^-[a-zA-Z0-9]$").expect("short option pattern compiles"));

static LONG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^--[a-zA-Z0-9][a-zA-Z0-9_.-]*[a-zA-Z0-9]$").expect("long option pattern compiles")
});

pub struct Util;

impl Util {
    /// Split a token on its first `=` into the candidate long name and the
    /// inline value, if any.
    pub fn split_long(token: &str) -> (&str, Option<&str>) {
        match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        }
    }

    /// The display form of a flag: `-d (--debug)`, or whichever form exists.
    pub fn display_name(short: &str, long: &str) -> String {
        match (short.is_empty(), long.is_empty()) {
            (false, false) => format!("{} ({})", short, long),
            (false, true) => short.to_owned(),
            _ => long.to_owned(),
        }
    }
}

pub struct NameValidator;

impl NameValidator {
    /// An empty name means "no short form" and is always accepted.
    pub fn validate_short(short: &str) -> Result<(), FlagErr> {
        if short.is_empty() || SHORT_PATTERN.is_match(short) {
            Ok(())
        } else {
            Err(FlagErr::InvalidShort(short.to_owned()))
        }
    }

    /// An empty name means "no long form" and is always accepted.
    pub fn validate_long(long: &str) -> Result<(), FlagErr> {
        if long.is_empty() || LONG_PATTERN.is_match(long) {
            Ok(())
        } else {
            Err(FlagErr::InvalidLong(long.to_owned()))
        }
    }
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use crate::util::{NameValidator, Util};

    #[test]
    fn test_split_long() {
        assert_eq!(("--limit", Some("5")), Util::split_long("--limit=5"));
        assert_eq!(("--name", Some("a=b")), Util::split_long("--name=a=b"));
        assert_eq!(("--name", Some("")), Util::split_long("--name="));
        assert_eq!(("--debug", None), Util::split_long("--debug"));
        assert_eq!(("", Some("x")), Util::split_long("=x"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!("-d (--debug)", Util::display_name("-d", "--debug"));
        assert_eq!("-d", Util::display_name("-d", ""));
        assert_eq!("--input", Util::display_name("", "--input"));
    }

    #[test_case("" ; "empty")]
    #[test_case("-a" ; "lower")]
    #[test_case("-Z" ; "upper")]
    #[test_case("-7" ; "digit")]
    fn test_valid_short(short: &str) {
        assert!(NameValidator::validate_short(short).is_ok());
    }

    #[test_case("a" ; "no dash")]
    #[test_case("-" ; "dash only")]
    #[test_case("--a" ; "double dash")]
    #[test_case("-ab" ; "two chars")]
    #[test_case("-_" ; "underscore")]
    #[test_case("-é" ; "non ascii")]
    fn test_invalid_short(short: &str) {
        assert!(NameValidator::validate_short(short).is_err());
    }

    #[test_case("" ; "empty")]
    #[test_case("--ab" ; "two chars")]
    #[test_case("--debug" ; "word")]
    #[test_case("--log-file" ; "dash")]
    #[test_case("--log_file.v2" ; "underscore and dot")]
    #[test_case("--9lives" ; "leading digit")]
    fn test_valid_long(long: &str) {
        assert!(NameValidator::validate_long(long).is_ok());
    }

    #[test_case("--a" ; "one char")]
    #[test_case("-debug" ; "single dash")]
    #[test_case("debug" ; "no dash")]
    #[test_case("--debug-" ; "trailing dash")]
    #[test_case("---debug" ; "leading dash")]
    #[test_case("--de bug" ; "space")]
    #[test_case("--debug=1" ; "equals")]
    fn test_invalid_long(long: &str) {
        assert!(NameValidator::validate_long(long).is_err());
    }
}
