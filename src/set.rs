use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use tracing::trace;

use crate::error::{FlagErr, FlagResult};
use crate::option::{Flag, FlagRef, Value};

/// The `FlagSet` is an ordered collection of [`Flag`]s, the unit of
/// declaration and parsing.
///
/// Declaration order is kept for display. Lookups go through the short and
/// long name maps, which share storage with the ordered list.
///
/// # Examples
///
/// ```
/// use flagset::FlagSet;
///
/// let mut set = FlagSet::new("logging", "Control log output");
/// let debug = set.bool("-d", "--debug", false, "Run in DEBUG mode").unwrap();
/// let logfile = set.string("", "--logfile", "", "Output log to this file").unwrap();
///
/// let rest = set.parse_known(&["-d", "--logfile=/tmp/s", "-o", "del"]).unwrap();
/// assert_eq!(Some(true), debug.as_bool());
/// assert_eq!(Some("/tmp/s".to_string()), logfile.as_string());
/// assert_eq!(vec!["-o", "del"], rest);
/// ```
///
/// A `FlagSet` is not thread safe; declaring or parsing from several threads
/// must be serialized by the caller.
#[derive(Debug)]
pub struct FlagSet {
    name: String,
    doc: String,
    pub(crate) flags: Vec<Rc<RefCell<Flag>>>,
    pub(crate) short: HashMap<String, Rc<RefCell<Flag>>>,
    pub(crate) long: HashMap<String, Rc<RefCell<Flag>>>,
}

impl FlagSet {
    /// Create a new empty `FlagSet`.
    ///
    /// The `name` identifies the set when it is attached as a child of a
    /// group flag.
    pub fn new(name: &str, doc: &str) -> FlagSet {
        FlagSet {
            name: name.to_owned(),
            doc: doc.to_owned(),
            flags: Vec::new(),
            short: HashMap::new(),
            long: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Declare a boolean flag.
    ///
    /// Also see [`Self::int`], [`Self::string`], [`Self::select`], [`Self::group`]
    pub fn bool(&mut self, short: &str, long: &str, init: bool, doc: &str) -> FlagResult<FlagRef> {
        self.declare(short, long, Value::Bool(init), doc)
    }

    /// Declare an integer flag.
    pub fn int(&mut self, short: &str, long: &str, init: i64, doc: &str) -> FlagResult<FlagRef> {
        self.declare(short, long, Value::Int(init), doc)
    }

    /// Declare an unconstrained string flag.
    pub fn string(&mut self, short: &str, long: &str, init: &str, doc: &str) -> FlagResult<FlagRef> {
        self.declare(short, long, Value::Str(init.to_owned()), doc)
    }

    /// Declare a string flag that only accepts one of `allowed`.
    pub fn select(
        &mut self,
        short: &str,
        long: &str,
        init: &str,
        allowed: &[&str],
        doc: &str,
    ) -> FlagResult<FlagRef> {
        let flag = Flag::builder()
            .short(short)
            .long(long)
            .value(init)
            .select(allowed)
            .doc(doc)
            .build()?;
        self.add(flag)
    }

    /// Declare a group flag selecting among child sets attached later with
    /// [`FlagRef::add_child`].
    pub fn group(&mut self, short: &str, long: &str, doc: &str) -> FlagResult<FlagRef> {
        let flag = Flag::builder().short(short).long(long).group().doc(doc).build()?;
        self.add(flag)
    }

    fn declare(&mut self, short: &str, long: &str, value: Value, doc: &str) -> FlagResult<FlagRef> {
        let flag = Flag::builder().short(short).long(long).value(value).doc(doc).build()?;
        self.add(flag)
    }

    /// Add a [`Flag`] to the set and return its handle.
    ///
    /// # Error
    ///
    /// Returns an error and leaves the set untouched if the flag's short or
    /// long name is already taken.
    pub fn add(&mut self, flag: Flag) -> FlagResult<FlagRef> {
        self.check(&flag)?;
        Ok(self.insert(flag))
    }

    /// Name collisions only: names, value and doc were already checked by
    /// [`FlagBuilder::build`](crate::FlagBuilder::build).
    fn check(&self, flag: &Flag) -> FlagResult<()> {
        if !flag.short.is_empty() && self.short.contains_key(&flag.short) {
            return Err(FlagErr::DuplicateShort(flag.short.clone()));
        }
        if !flag.long.is_empty() && self.long.contains_key(&flag.long) {
            return Err(FlagErr::DuplicateLong(flag.long.clone()));
        }
        Ok(())
    }

    fn insert(&mut self, mut flag: Flag) -> FlagRef {
        flag.index = self.flags.len();
        trace!(set = %self.name, flag = %flag, index = flag.index, "declared flag");

        let flag = Rc::new(RefCell::new(flag));
        self.flags.push(Rc::clone(&flag));

        let borrowed = flag.borrow();
        if !borrowed.short.is_empty() {
            self.short.insert(borrowed.short.clone(), Rc::clone(&flag));
        }
        if !borrowed.long.is_empty() {
            self.long.insert(borrowed.long.clone(), Rc::clone(&flag));
        }
        drop(borrowed);

        FlagRef(flag)
    }

    /// Copy every flag of `other` into this set.
    ///
    /// The copies are independent: parsing one set never changes the other.
    /// Every flag is checked before any is added, so on error this set is
    /// left exactly as it was.
    pub fn merge(&mut self, other: &FlagSet) -> FlagResult<()> {
        for flag in &other.flags {
            self.check(&flag.borrow())?;
        }
        for flag in &other.flags {
            let copy = flag.borrow().clone();
            self.insert(copy);
        }
        Ok(())
    }

    /// Look up a flag by short name first, then by long name.
    pub fn flag(&self, name: &str) -> Option<FlagRef> {
        self.short
            .get(name)
            .or_else(|| self.long.get(name))
            .map(|flag| FlagRef(Rc::clone(flag)))
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.short.contains_key(name) || self.long.contains_key(name)
    }

    /// Handles to every flag in declaration order.
    pub fn flags(&self) -> Vec<FlagRef> {
        self.flags.iter().map(|flag| FlagRef(Rc::clone(flag))).collect()
    }

    /// Check whether `target` is owned by this set or by any set nested in
    /// one of its groups.
    pub(crate) fn contains_flag(&self, target: &Rc<RefCell<Flag>>) -> bool {
        self.flags.iter().any(|flag| {
            Rc::ptr_eq(flag, target)
                || flag
                    .borrow()
                    .children
                    .as_ref()
                    .is_some_and(|children| children.values().any(|child| child.contains_flag(target)))
        })
    }
}

impl Clone for FlagSet {
    /// Deep copy: the clone owns its own flags.
    fn clone(&self) -> Self {
        let mut set = FlagSet::new(&self.name, &self.doc);
        for flag in &self.flags {
            let copy = flag.borrow().clone();
            set.insert(copy);
        }
        set
    }
}

impl Display for FlagSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let body = self
            .flags
            .iter()
            .map(|flag| {
                let flag = flag.borrow();
                format!("{}={}", flag.get_key(), flag.get_value())
            })
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{}{{{}}}", self.name, body)
    }
}
