use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{ParseErr, ParseResult};
use crate::option::{Flag, Value};
use crate::set::FlagSet;
use crate::util::Util;

impl FlagSet {
    /// Parse `tokens`, returning the ones that match no flag in this set.
    ///
    /// Unknown tokens are collected in their original order rather than
    /// rejected, so the remainder can be fed to another set (staged parsing).
    ///
    /// A short flag takes the next token as its value. A boolean short flag
    /// only consumes the next token when it is literally `true` or `false`,
    /// so `-d somefile` sets `-d` and leaves `somefile` in the remainder.
    /// A long flag takes its value after the first `=`, if any.
    ///
    /// # Error
    ///
    /// Returns [`ParseErr`] on the first malformed value. Tokens before it
    /// have already been applied and tokens after it are not looked at.
    pub fn parse_known<T: AsRef<str>>(&mut self, tokens: &[T]) -> ParseResult<Vec<String>> {
        let mut unknown = Vec::new();
        let mut pos = 0;
        while pos < tokens.len() {
            pos += self.handle_token(tokens, pos, &mut unknown)?;
        }
        Ok(unknown)
    }

    /// Parse `tokens` and fail if any of them matches no flag.
    ///
    /// Also see [`Self::parse_known`]
    pub fn parse<T: AsRef<str>>(&mut self, tokens: &[T]) -> ParseResult<()> {
        let unknown = self.parse_known(tokens)?;
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ParseErr::UnknownOptions(unknown))
        }
    }

    /// Parse the process arguments, skipping the program name.
    ///
    /// # Panics
    ///
    /// Panics if any argument is not valid unicode, as [`env::args`] does.
    ///
    /// Also see [`Self::parse`]
    pub fn parse_env(&mut self) -> ParseResult<()> {
        let args: Vec<String> = env::args().skip(1).collect();
        self.parse(&args)
    }

    /// Parse the process arguments, skipping the program name, and return
    /// the unknown ones.
    ///
    /// # Panics
    ///
    /// Panics if any argument is not valid unicode, as [`env::args`] does.
    ///
    /// Also see [`Self::parse_known`]
    pub fn parse_known_env(&mut self) -> ParseResult<Vec<String>> {
        let args: Vec<String> = env::args().skip(1).collect();
        self.parse_known(&args)
    }

    /// Handle the token at `pos` and return how many tokens were consumed.
    fn handle_token<T: AsRef<str>>(
        &self,
        tokens: &[T],
        pos: usize,
        unknown: &mut Vec<String>,
    ) -> ParseResult<usize> {
        let token = tokens[pos].as_ref();

        if let Some(flag) = self.short.get(token) {
            // -s [value]
            let lookahead = tokens.get(pos + 1).map(|t| t.as_ref());
            let used = Self::handle_option(flag, lookahead.unwrap_or(""))?;
            return Ok(if used && lookahead.is_some() { 2 } else { 1 });
        }

        // --long or --long=value
        let (name, value) = Util::split_long(token);
        if let Some(flag) = self.long.get(name) {
            Self::handle_option(flag, value.unwrap_or(""))?;
            return Ok(1);
        }

        self.handle_unknown_token(token, unknown);
        Ok(1)
    }

    /// Store `raw` into `flag` and report whether `raw` was taken as the
    /// flag's value. Booleans decline anything but `true`/`false`.
    fn handle_option(flag: &Rc<RefCell<Flag>>, raw: &str) -> ParseResult<bool> {
        let mut flag = flag.borrow_mut();

        let (value, used) = match &flag.value {
            Value::Bool(_) => match raw {
                "true" => (Value::Bool(true), true),
                "false" => (Value::Bool(false), true),
                _ => (Value::Bool(true), false),
            },
            Value::Int(_) => match raw.parse::<i64>() {
                Ok(i) => (Value::Int(i), true),
                Err(_) => {
                    return Err(ParseErr::InvalidInt {
                        flag: flag.display_name(),
                        value: raw.to_owned(),
                    })
                }
            },
            Value::Str(_) => {
                if let Err(reason) = flag.validate(raw) {
                    debug!(flag = %flag, value = raw, reason = %reason, "value rejected");
                    return Err(ParseErr::Rejected {
                        flag: flag.display_name(),
                        value: raw.to_owned(),
                        reason,
                    });
                }
                (Value::Str(raw.to_owned()), true)
            }
        };

        trace!(flag = %flag, value = %value, "matched flag");
        flag.value = value;
        flag.specified = true;
        Ok(used)
    }

    fn handle_unknown_token(&self, token: &str, unknown: &mut Vec<String>) {
        debug!(set = %self.name(), token, "unrecognized token");
        unknown.push(token.to_owned());
    }
}
