use std::cell::{Ref, RefCell, RefMut};
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::FlagErr;
use crate::set::FlagSet;
use crate::util::{NameValidator, Util};

/// The current value of a [`Flag`].
///
/// The variant is chosen when the flag is declared and parsing never changes
/// it, only the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => Display::fmt(b, f),
            Value::Int(i) => Display::fmt(i, f),
            Value::Str(s) => Display::fmt(s, f),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Judges a candidate string value before it is stored in a string flag.
///
/// A rejection carries the reason, which ends up in
/// [`ParseErr::Rejected`](crate::ParseErr::Rejected).
#[derive(Clone)]
pub enum Validator {
    /// Accept only one of the listed values.
    OneOf(Vec<String>),

    /// Accept only the name of a child set attached to the group flag.
    Group,

    Custom(Rc<dyn Fn(&str) -> Result<(), String>>),
}

impl Validator {
    /// Wrap a closure as a validator.
    pub fn custom<F>(f: F) -> Validator
    where
        F: Fn(&str) -> Result<(), String> + 'static,
    {
        Validator::Custom(Rc::new(f))
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Validator::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Validator::Group => f.write_str("Group"),
            Validator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn one_of<'a>(value: &str, expected: impl Iterator<Item = &'a str>) -> Result<(), String> {
    let expected: Vec<&str> = expected.collect();
    if expected.is_empty() {
        return Err("no expected values registered".to_string());
    }
    if expected.contains(&value) {
        Ok(())
    } else {
        Err(format!("expected one of [{}]", expected.join(", ")))
    }
}

/// A single declared flag.
///
/// Flags are created through [`FlagBuilder`] and owned by a [`FlagSet`].
/// Callers read them back through the [`FlagRef`] handle returned at
/// declaration time.
#[derive(Clone, Debug)]
pub struct Flag {
    pub(crate) index: usize,
    pub(crate) short: String,
    pub(crate) long: String,
    pub(crate) value: Value,
    pub(crate) specified: bool,
    pub(crate) doc: String,
    pub(crate) validator: Option<Validator>,
    pub(crate) children: Option<IndexMap<String, FlagSet>>,
}

/// A builder struct for [`Flag`].
///
/// # Examples
///
/// ```
/// use flagset::{Flag, FlagSet, Value};
///
/// let mut set = FlagSet::new("tool", "A tool");
/// let level = set.add(Flag::builder()
///     .short("-v")
///     .long("--level")
///     .value(Value::Int(1))
///     .doc("verbosity level")
///     .build()
///     .unwrap())
///     .unwrap();
/// assert_eq!(Some(1), level.as_int());
/// ```
#[derive(Default)]
pub struct FlagBuilder {
    short: String,
    long: String,
    value: Option<Value>,
    doc: String,
    validator: Option<Validator>,
    group: bool,
}

impl FlagBuilder {
    /// Build a [`Flag`] with configured values.
    ///
    /// # Error
    ///
    /// Returns an error if:
    /// - the short or long name is malformed.
    /// - neither a short nor a long name is given.
    /// - no value is given.
    /// - the documentation is blank.
    pub fn build(self) -> Result<Flag, FlagErr> {
        NameValidator::validate_short(&self.short)?;
        NameValidator::validate_long(&self.long)?;
        if self.short.is_empty() && self.long.is_empty() {
            return Err(FlagErr::MissingName);
        }
        let name = Util::display_name(&self.short, &self.long);
        let value = self.value.ok_or_else(|| FlagErr::MissingValue(name.clone()))?;
        if self.doc.is_empty() {
            return Err(FlagErr::MissingDoc(name));
        }
        Ok(Flag {
            index: 0,
            short: self.short,
            long: self.long,
            value,
            specified: false,
            doc: self.doc,
            validator: self.validator,
            children: if self.group { Some(IndexMap::new()) } else { None },
        })
    }

    /// Set the short name, `-<letter|digit>`.
    pub fn short(mut self, short: &str) -> Self {
        self.short = short.to_owned();
        self
    }

    /// Set the long name, `--<word>`.
    pub fn long(mut self, long: &str) -> Self {
        self.long = long.to_owned();
        self
    }

    /// Set the initial value, which also fixes the flag's type.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_owned();
        self
    }

    /// Restrict a string flag to one of `allowed`.
    pub fn select(mut self, allowed: &[&str]) -> Self {
        self.validator = Some(Validator::OneOf(allowed.iter().map(|v| v.to_string()).collect()));
        self
    }

    /// Turn the flag into a group selector: its value is the name of the
    /// selected child set, initially empty.
    pub fn group(mut self) -> Self {
        self.value = Some(Value::Str(String::new()));
        self.validator = Some(Validator::Group);
        self.group = true;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

impl Flag {
    /// Create a [`FlagBuilder`] to config the flag.
    pub fn builder() -> FlagBuilder {
        FlagBuilder::default()
    }

    pub fn get_index(&self) -> usize {
        self.index
    }

    /// The short name, empty when the flag has none.
    pub fn get_short(&self) -> &str {
        &self.short
    }

    /// The long name, empty when the flag has none.
    pub fn get_long(&self) -> &str {
        &self.long
    }

    /// The short name if there is one, otherwise the long name.
    pub fn get_key(&self) -> &str {
        if self.short.is_empty() {
            &self.long
        } else {
            &self.short
        }
    }

    pub fn get_value(&self) -> &Value {
        &self.value
    }

    pub fn get_doc(&self) -> &str {
        &self.doc
    }

    pub fn get_validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Names of the attached child sets, in the order they were added.
    pub fn get_child_names(&self) -> Vec<&str> {
        match &self.children {
            Some(children) => children.keys().map(|k| k.as_str()).collect(),
            None => Vec::new(),
        }
    }

    pub fn get_child(&self, name: &str) -> Option<&FlagSet> {
        self.children.as_ref()?.get(name)
    }

    /// Check whether the last parse supplied this flag.
    pub fn is_specified(&self) -> bool {
        self.specified
    }

    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    /// `-d (--debug)`, or whichever name exists.
    pub fn display_name(&self) -> String {
        Util::display_name(&self.short, &self.long)
    }

    /// Run the attached validator against a candidate value.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match &self.validator {
            None => Ok(()),
            Some(Validator::OneOf(allowed)) => one_of(value, allowed.iter().map(|v| v.as_str())),
            Some(Validator::Group) => one_of(value, self.get_child_names().into_iter()),
            Some(Validator::Custom(f)) => f(value),
        }
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Handle to a [`Flag`] stored in a [`FlagSet`].
///
/// The handle and the set share the same storage, so values written by
/// [`FlagSet::parse_known`] are visible here without any copying. Later
/// declarations on the set never invalidate a handle.
///
/// Handles are not thread safe. Holding a [`Ref`] or [`RefMut`] obtained
/// from a handle while parsing the owning set panics.
#[derive(Clone, Debug)]
pub struct FlagRef(pub(crate) Rc<RefCell<Flag>>);

impl FlagRef {
    pub fn borrow(&self) -> Ref<'_, Flag> {
        self.0.borrow()
    }

    /// A copy of the current value.
    pub fn value(&self) -> Value {
        self.0.borrow().value.clone()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.0.borrow().value.as_bool()
    }

    pub fn as_int(&self) -> Option<i64> {
        self.0.borrow().value.as_int()
    }

    pub fn as_string(&self) -> Option<String> {
        self.0.borrow().value.as_str().map(|s| s.to_owned())
    }

    /// Borrow the string value in place. The returned [`Ref`] must be
    /// dropped before the owning set is parsed again.
    pub fn as_str(&self) -> Option<Ref<'_, str>> {
        Ref::filter_map(self.0.borrow(), |flag| flag.value.as_str()).ok()
    }

    pub fn short(&self) -> String {
        self.0.borrow().short.clone()
    }

    pub fn long(&self) -> String {
        self.0.borrow().long.clone()
    }

    pub fn doc(&self) -> String {
        self.0.borrow().doc.clone()
    }

    /// Position in the owning set's declaration order.
    pub fn index(&self) -> usize {
        self.0.borrow().index
    }

    pub fn is_specified(&self) -> bool {
        self.0.borrow().specified
    }

    pub fn is_group(&self) -> bool {
        self.0.borrow().is_group()
    }

    /// Attach a named child set to a group flag.
    ///
    /// # Error
    ///
    /// Returns an error if the flag is not a group, the child set has no
    /// name, a child with the same name is already attached, or the child
    /// set (or any set nested in it) contains this very flag.
    pub fn add_child(&self, child: FlagSet) -> Result<(), FlagErr> {
        let group = self.0.borrow().display_name();
        if !self.is_group() {
            return Err(FlagErr::NotAGroup(group));
        }
        if child.name().is_empty() {
            return Err(FlagErr::UnnamedChild(group));
        }
        if child.contains_flag(&self.0) {
            return Err(FlagErr::CyclicGroup { group, child: child.name().to_owned() });
        }

        let mut flag = self.0.borrow_mut();
        let children = match flag.children.as_mut() {
            Some(children) => children,
            None => return Err(FlagErr::NotAGroup(group)),
        };
        if children.contains_key(child.name()) {
            return Err(FlagErr::DuplicateChild { group, child: child.name().to_owned() });
        }
        children.insert(child.name().to_owned(), child);
        Ok(())
    }

    pub fn child_names(&self) -> Vec<String> {
        self.0.borrow().get_child_names().into_iter().map(|n| n.to_owned()).collect()
    }

    pub fn child(&self, name: &str) -> Option<Ref<'_, FlagSet>> {
        Ref::filter_map(self.0.borrow(), |flag| flag.get_child(name)).ok()
    }

    pub fn child_mut(&self, name: &str) -> Option<RefMut<'_, FlagSet>> {
        RefMut::filter_map(self.0.borrow_mut(), |flag| {
            flag.children.as_mut().and_then(|children| children.get_mut(name))
        })
        .ok()
    }

    /// The child set named by the group's current value, ready to parse the
    /// tokens left over by the parent set.
    pub fn selected_child_mut(&self) -> Option<RefMut<'_, FlagSet>> {
        let selected = self.as_string()?;
        self.child_mut(&selected)
    }
}

impl Display for FlagRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&*self.0.borrow(), f)
    }
}

#[cfg(test)]
mod test {
    use crate::error::FlagErr;
    use crate::option::{Flag, Validator, Value};
    use crate::set::FlagSet;

    #[test]
    fn test_builder_requires_a_name() {
        let err = Flag::builder().value(true).doc("debug").build().unwrap_err();
        assert_eq!(FlagErr::MissingName, err);
    }

    #[test]
    fn test_builder_requires_a_value() {
        let err = Flag::builder().short("-d").doc("debug").build().unwrap_err();
        assert_eq!(FlagErr::MissingValue("-d".to_string()), err);
    }

    #[test]
    fn test_builder_requires_doc() {
        let err = Flag::builder().long("--debug").value(true).doc("").build().unwrap_err();
        assert_eq!(FlagErr::MissingDoc("--debug".to_string()), err);

        let err = Flag::builder().long("--debug").value(true).build().unwrap_err();
        assert_eq!(FlagErr::MissingDoc("--debug".to_string()), err);
    }

    #[test]
    fn test_builder_keeps_doc_as_given() {
        let flag = Flag::builder().long("--debug").value(true).doc("  Run in debug mode ").build().unwrap();
        assert_eq!("  Run in debug mode ", flag.get_doc());

        let flag = Flag::builder().long("--debug").value(true).doc(" ").build().unwrap();
        assert_eq!(" ", flag.get_doc());
    }

    #[test]
    fn test_handle_accessors() {
        let mut set = FlagSet::new("main", "main");
        set.bool("-d", "--debug", false, "Run in debug mode").unwrap();
        let input = set.string("", "--input", "in.txt", "Input filename").unwrap();
        let limit = set.int("-l", "", 2, "Limit nr of records").unwrap();

        assert_eq!("", input.short());
        assert_eq!("--input", input.long());
        assert_eq!("Input filename", input.doc());
        assert_eq!(1, input.index());
        assert_eq!("in.txt", &*input.as_str().unwrap());

        assert_eq!("-l", limit.short());
        assert_eq!("", limit.long());
        assert_eq!(2, limit.index());
        assert!(limit.as_str().is_none());

        set.parse(&["--input=out.txt"]).unwrap();
        assert_eq!("out.txt", &*input.as_str().unwrap());
    }

    #[test]
    fn test_builder_rejects_malformed_names() {
        let err = Flag::builder().short("d").value(true).doc("debug").build().unwrap_err();
        assert_eq!(FlagErr::InvalidShort("d".to_string()), err);

        let err = Flag::builder().long("--d").value(true).doc("debug").build().unwrap_err();
        assert_eq!(FlagErr::InvalidLong("--d".to_string()), err);
    }

    #[test]
    fn test_display_name() {
        let flag = Flag::builder().short("-d").long("--debug").value(false).doc("debug").build().unwrap();
        assert_eq!("-d (--debug)", flag.to_string());
        assert_eq!("-d", flag.get_key());

        let flag = Flag::builder().long("--input").value("").doc("input").build().unwrap();
        assert_eq!("--input", flag.to_string());
        assert_eq!("--input", flag.get_key());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Some(true), Value::Bool(true).as_bool());
        assert_eq!(None, Value::Bool(true).as_int());
        assert_eq!(Some(-3), Value::Int(-3).as_int());
        assert_eq!(Some("x"), Value::from("x").as_str());
        assert_eq!("42", Value::Int(42).to_string());
    }

    #[test]
    fn test_select_validator() {
        let flag = Flag::builder()
            .short("-o")
            .long("--oper")
            .value("")
            .select(&["add", "get", "upd", "del"])
            .doc("operation")
            .build()
            .unwrap();
        assert!(flag.validate("upd").is_ok());
        assert_eq!(
            Err("expected one of [add, get, upd, del]".to_string()),
            flag.validate("xyz")
        );
    }

    #[test]
    fn test_custom_validator() {
        let flag = Flag::builder()
            .long("--port")
            .value("80")
            .validator(Validator::custom(|v| {
                v.parse::<u16>().map(|_| ()).map_err(|e| e.to_string())
            }))
            .doc("port")
            .build()
            .unwrap();
        assert!(flag.validate("8080").is_ok());
        assert!(flag.validate("http").is_err());
    }

    #[test]
    fn test_group_without_children_rejects_everything() {
        let mut set = FlagSet::new("main", "main");
        let oper = set.group("-o", "--oper", "operation").unwrap();
        assert_eq!(
            Err("no expected values registered".to_string()),
            oper.borrow().validate("add")
        );
    }

    #[test]
    fn test_group_children() {
        let mut set = FlagSet::new("main", "main");
        let oper = set.group("-o", "--oper", "operation").unwrap();
        oper.add_child(FlagSet::new("add", "add a user")).unwrap();
        oper.add_child(FlagSet::new("del", "delete a user")).unwrap();

        assert_eq!(vec!["add".to_string(), "del".to_string()], oper.child_names());
        assert!(oper.borrow().validate("add").is_ok());
        assert!(oper.borrow().validate("del").is_ok());
        assert_eq!(Err("expected one of [add, del]".to_string()), oper.borrow().validate("mod"));
        assert_eq!("delete a user", oper.child("del").unwrap().doc());
        assert!(oper.child("mod").is_none());
    }

    #[test]
    fn test_add_child_errors() {
        let mut set = FlagSet::new("main", "main");
        let debug = set.bool("-d", "--debug", false, "debug").unwrap();
        let oper = set.group("-o", "--oper", "operation").unwrap();

        assert_eq!(
            Err(FlagErr::NotAGroup("-d (--debug)".to_string())),
            debug.add_child(FlagSet::new("add", "add"))
        );
        assert_eq!(
            Err(FlagErr::UnnamedChild("-o (--oper)".to_string())),
            oper.add_child(FlagSet::new("", "nameless"))
        );

        oper.add_child(FlagSet::new("add", "add")).unwrap();
        assert_eq!(
            Err(FlagErr::DuplicateChild { group: "-o (--oper)".to_string(), child: "add".to_string() }),
            oper.add_child(FlagSet::new("add", "again"))
        );
        assert_eq!(vec!["add".to_string()], oper.child_names());
    }

    #[test]
    fn test_add_child_refuses_own_set() {
        let mut set = FlagSet::new("main", "main");
        let oper = set.group("-o", "--oper", "operation").unwrap();
        assert_eq!(
            Err(FlagErr::CyclicGroup { group: "-o (--oper)".to_string(), child: "main".to_string() }),
            oper.add_child(set)
        );
        assert!(oper.child_names().is_empty());
    }

    #[test]
    fn test_add_child_refuses_nested_own_set() {
        let mut outer = FlagSet::new("outer", "outer");
        let oper = outer.group("-o", "--oper", "operation").unwrap();

        let mut middle = FlagSet::new("middle", "middle");
        let mode = middle.group("-m", "--mode", "mode").unwrap();
        mode.add_child(outer).unwrap();

        assert!(matches!(oper.add_child(middle), Err(FlagErr::CyclicGroup { .. })));
    }
}
