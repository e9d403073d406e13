//! # The flagset Library
//!
//! The flagset library provides a registry for command line flags and a
//! parser that fills it in place.
//!
//! Flags are declared on a [`FlagSet`]. Each declaration returns a
//! [`FlagRef`] handle that keeps observing the flag's value after parsing.
//! Supported flags:
//!
//! - boolean flags, for example `-d` or `--debug=false`
//! - integer flags, for example `-l 5` or `--limit=5`
//! - string flags, for example `-o out.txt` or `--output=out.txt`
//! - select flags, string flags restricted to a fixed list of values
//! - group flags, whose value picks one of several named child sets
//!
//! A short flag is written `-<letter|digit>` and takes the next token as its
//! value. A long flag is written `--<word>` and takes its value after `=`.
//! There is no clustering (`-abc`), no positional arguments and no repeated
//! flags.
//!
//! # Examples
//!
//! A simple example.
//!
//! ```
//! use flagset::FlagSet;
//!
//! let mut set = FlagSet::new("example", "An example tool");
//! let debug = set.bool("-d", "--debug", false, "Run in debug mode").unwrap();
//! let error = set.bool("-e", "--error", false, "Error stack dump").unwrap();
//! let input = set.string("", "--input", "", "Input filename").unwrap();
//! let limit = set.int("-l", "--limit", 2, "Limit nr of records").unwrap();
//!
//! set.parse(&["--input=/tmp/in", "-e", "-d", "false"]).unwrap();
//!
//! assert_eq!(Some(false), debug.as_bool());
//! assert_eq!(Some(true), error.as_bool());
//! assert_eq!(Some("/tmp/in".to_string()), input.as_string());
//! assert_eq!(Some(2), limit.as_int());
//! ```
//!
//! Staged parsing with a group flag. Each set only takes what it knows and
//! hands the rest to the next one.
//!
//! ```
//! use flagset::FlagSet;
//!
//! let mut logging = FlagSet::new("logging", "Control log output");
//! let debug = logging.bool("-d", "--debug", false, "Run in DEBUG mode").unwrap();
//!
//! let mut add = FlagSet::new("add", "Add user");
//! let name = add.string("-n", "--name", "", "Name to add").unwrap();
//!
//! let mut main = FlagSet::new("main", "User admin");
//! let oper = main.group("-o", "--oper", "Select operation").unwrap();
//! oper.add_child(add).unwrap();
//!
//! let rest = logging.parse_known(&["-d", "--oper=add", "-n", "bob"]).unwrap();
//! let rest = main.parse_known(&rest).unwrap();
//! oper.selected_child_mut().unwrap().parse(&rest).unwrap();
//!
//! assert_eq!(Some(true), debug.as_bool());
//! assert_eq!(Some("add".to_string()), oper.as_string());
//! assert_eq!(Some("bob".to_string()), name.as_string());
//! ```
//!
//! The library never prints or exits. Errors are returned as [`FlagErr`]
//! when declaring and [`ParseErr`] when parsing, and diagnostics go through
//! `tracing`.

pub use error::{FlagErr, FlagResult, ParseErr, ParseResult};
pub use option::{Flag, FlagBuilder, FlagRef, Validator, Value};
pub use set::FlagSet;

mod error;
mod option;
mod parser;
mod set;
mod util;
