use thiserror::Error;

/// Error raised while declaring or composing flags.
///
/// None of these reach parse time: the offending flag or child set is not
/// added and the [`FlagSet`](crate::FlagSet) keeps its previous contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagErr {
    /// The short form is not `-<letter|digit>`.
    #[error("short option '{0}' must be \"-<letter|digit>\"")]
    InvalidShort(String),

    /// The long form is not `--<word>`.
    #[error("long option '{0}' must be \"--<word>\" that starts and ends with a letter or digit and allows '_', '-' and '.' in the middle")]
    InvalidLong(String),

    #[error("flag without short or long option")]
    MissingName,

    #[error("flag {0} without value")]
    MissingValue(String),

    #[error("flag {0} without documentation")]
    MissingDoc(String),

    #[error("duplicate short option {0}")]
    DuplicateShort(String),

    #[error("duplicate long option {0}")]
    DuplicateLong(String),

    /// A child set was attached to a flag that was not declared as a group.
    #[error("flag {0} is not a group")]
    NotAGroup(String),

    #[error("cannot add unnamed child set to group {0}")]
    UnnamedChild(String),

    #[error("group {group} already has a child named \"{child}\"")]
    DuplicateChild { group: String, child: String },

    /// The child set contains the group flag itself, directly or nested.
    #[error("group {group} cannot contain its own set \"{child}\"")]
    CyclicGroup { group: String, child: String },
}

/// Error raised while parsing tokens against a [`FlagSet`](crate::FlagSet).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErr {
    /// An integer flag received a value that is not a base-10 integer.
    #[error("expecting {flag} <integer>, got \"{value}\"")]
    InvalidInt { flag: String, value: String },

    /// The flag's validator rejected the value.
    #[error("invalid value \"{value}\" for {flag}: {reason}")]
    Rejected {
        flag: String,
        value: String,
        reason: String,
    },

    /// Tokens left over after [`FlagSet::parse`](crate::FlagSet::parse).
    #[error("unknown options: [{}]", .0.join(" "))]
    UnknownOptions(Vec<String>),
}

pub type FlagResult<T> = Result<T, FlagErr>;

pub type ParseResult<T> = Result<T, ParseErr>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unknown_options_lists_every_token() {
        let err = ParseErr::UnknownOptions(vec!["-x".to_string(), "--unknown".to_string()]);
        assert_eq!("unknown options: [-x --unknown]", err.to_string());
    }

    #[test]
    fn test_invalid_int_names_both_forms() {
        let err = ParseErr::InvalidInt {
            flag: "-l (--limit)".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!("expecting -l (--limit) <integer>, got \"abc\"", err.to_string());
    }
}
