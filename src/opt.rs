//! Option cells and the capabilities the parsing engine dispatches on.
//!
//! An option implements the base [`Opt`] trait plus any combination of the
//! capability traits below. The engine asks for each capability through
//! the `as_*` accessors and picks the first one that fits the token shape:
//!
//! - [`FlagParser`]: `--name`, consumes no value.
//! - [`InlineParser`]: `--name=value`.
//! - [`ValueParser`]: `--name value`, or a single positional slot.
//! - [`ValuesParser`]: a run of positional values for the trailing variadic slot.

use crate::command::{Arg, Flag};
use crate::value::{self, Float, Integer, NamedValue, ValueError};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Tokens that look like flags but are still plain values for file-like options.
pub const DASH_OK: &[&str] = &["-"];

/// The base interface every option cell implements.
pub trait Opt {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Apply a declared default literal for a flag that was not given.
    fn parse_default(&self, literal: &str) -> Result<(), ValueError>;

    /// Exact dash-looking literals accepted as values (e.g. `-` for stdin).
    fn ok_values(&self) -> &'static [&'static str] {
        &[]
    }

    /// How many leading dashes a positional value may carry.
    fn dash_tolerance(&self) -> usize {
        0
    }

    /// `name=value` rendering of the current value.
    fn debug(&self) -> String;

    /// Return to the value held before any parse.
    fn reset(&self);

    fn as_flag(&self) -> Option<&dyn FlagParser> {
        None
    }

    fn as_inline(&self) -> Option<&dyn InlineParser> {
        None
    }

    fn as_value(&self) -> Option<&dyn ValueParser> {
        None
    }

    fn as_values(&self) -> Option<&dyn ValuesParser> {
        None
    }
}

pub trait FlagParser {
    /// `occurrence` counts earlier sightings of the same flag in this parse.
    fn parse_flag(&self, occurrence: usize) -> Result<(), ValueError>;
}

pub trait InlineParser {
    fn parse_inline(&self, value: &str) -> Result<(), ValueError>;
}

pub trait ValueParser {
    fn parse_value(&self, value: &str) -> Result<(), ValueError>;
}

/// A run that stopped early: `accepted` values were stored before `error`.
#[derive(Debug)]
pub struct Partial {
    pub accepted: usize,
    pub error: ValueError,
}

pub trait ValuesParser {
    /// Store a run of values, returning how many were consumed.
    fn parse_values(&self, values: &[String]) -> Result<usize, Partial>;
}

/// Whether `token` is a value for `opt` even though it may start with dashes.
///
/// A token qualifies if it is whitelisted exactly, or if its leading dash
/// run is no longer than the option tolerates. Tokens made only of dashes
/// qualify only through the whitelist.
pub fn accepts(opt: &dyn Opt, token: &str) -> bool {
    if opt.ok_values().iter().any(|ok| *ok == token) {
        return true;
    }
    let dashes = token.bytes().take_while(|b| *b == b'-').count();
    if dashes > 0 && dashes == token.len() {
        return false;
    }
    dashes <= opt.dash_tolerance()
}

type ParseFn<T> = Box<dyn Fn(&str) -> Result<T, ValueError>>;

pub(crate) struct SingleCell<T> {
    name: String,
    desc: String,
    initial: T,
    value: RefCell<T>,
    parse: ParseFn<T>,
    dash_tolerance: Cell<usize>,
    ok_values: Cell<&'static [&'static str]>,
}

impl<T> SingleCell<T> {
    fn store(&self, token: &str) -> Result<(), ValueError> {
        let parsed = (self.parse)(token)?;
        *self.value.borrow_mut() = parsed;
        Ok(())
    }
}

impl<T: Clone + fmt::Debug + 'static> Opt for SingleCell<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.desc
    }

    fn parse_default(&self, literal: &str) -> Result<(), ValueError> {
        self.store(literal)
    }

    fn ok_values(&self) -> &'static [&'static str] {
        self.ok_values.get()
    }

    fn dash_tolerance(&self) -> usize {
        self.dash_tolerance.get()
    }

    fn debug(&self) -> String {
        format!("{}={:?}", self.name, self.value.borrow())
    }

    fn reset(&self) {
        *self.value.borrow_mut() = self.initial.clone();
    }

    fn as_inline(&self) -> Option<&dyn InlineParser> {
        Some(self)
    }

    fn as_value(&self) -> Option<&dyn ValueParser> {
        Some(self)
    }
}

impl<T> InlineParser for SingleCell<T> {
    fn parse_inline(&self, value: &str) -> Result<(), ValueError> {
        self.store(value)
    }
}

impl<T> ValueParser for SingleCell<T> {
    fn parse_value(&self, value: &str) -> Result<(), ValueError> {
        self.store(value)
    }
}

/// A single-value option. A later successful parse overwrites the value.
///
/// Clones share the same cell, so keep one handle to read the value after
/// parsing and hand flags/args built from it to the command.
pub struct Single<T> {
    cell: Rc<SingleCell<T>>,
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Clone + fmt::Debug + 'static> Single<T> {
    /// Create an option from an initial value and a conversion function.
    pub fn new(
        name: impl Into<String>,
        desc: impl Into<String>,
        initial: T,
        parse: impl Fn(&str) -> Result<T, ValueError> + 'static,
    ) -> Self {
        Self {
            cell: Rc::new(SingleCell {
                name: name.into(),
                desc: desc.into(),
                value: RefCell::new(initial.clone()),
                initial,
                parse: Box::new(parse),
                dash_tolerance: Cell::new(0),
                ok_values: Cell::new(&[]),
            }),
        }
    }

    /// Accept positional values with up to `dashes` leading dashes.
    pub fn tolerate_dashes(self, dashes: usize) -> Self {
        self.cell.dash_tolerance.set(dashes);
        self
    }

    /// Accept these exact dash-looking literals as positional values.
    pub fn allow(self, literals: &'static [&'static str]) -> Self {
        self.cell.ok_values.set(literals);
        self
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn value(&self) -> T {
        self.cell.value.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.value.borrow())
    }

    /// A flag named `--<name>`.
    pub fn flag(&self) -> Flag {
        Flag::new(self.as_opt(), None, Some(self.cell.name.clone()))
    }

    /// A flag with both a short and a long name.
    pub fn flags(&self, short: char, long: &str) -> Flag {
        Flag::new(self.as_opt(), Some(short), Some(long.to_string()))
    }

    /// A flag with only a short name.
    pub fn short(&self, short: char) -> Flag {
        Flag::new(self.as_opt(), Some(short), None)
    }

    /// A positional argument displayed as `<name>`.
    pub fn pos(&self, name: &str) -> Arg {
        Arg::new(self.as_opt(), name, false)
    }

    pub(crate) fn as_opt(&self) -> Rc<dyn Opt> {
        self.cell.clone()
    }
}

/// Any string.
pub fn string(name: &str, desc: &str) -> Single<String> {
    string_like::<String>(name, desc)
}

/// Any string-like value.
pub fn string_like<T>(name: &str, desc: &str) -> Single<T>
where
    T: From<String> + Default + Clone + fmt::Debug + 'static,
{
    Single::new(name, desc, T::default(), |s| Ok(T::from(s.to_string())))
}

/// A filename; unlike [`string`] it also accepts `-` as a positional value.
pub fn file(name: &str, desc: &str) -> Single<String> {
    string(name, desc).allow(DASH_OK)
}

pub fn file_like<T>(name: &str, desc: &str) -> Single<T>
where
    T: From<String> + Default + Clone + fmt::Debug + 'static,
{
    string_like::<T>(name, desc).allow(DASH_OK)
}

/// An integer in `base` (0 detects `0x`/`0o`/`0b` prefixes).
/// Signed types accept negative positional values.
pub fn int<T: Integer>(name: &str, desc: &str, base: u32) -> Single<T> {
    Single::new(name, desc, T::default(), move |s| value::parse_int::<T>(s, base))
        .tolerate_dashes(usize::from(T::SIGNED))
}

pub fn float<T: Float>(name: &str, desc: &str) -> Single<T> {
    Single::new(name, desc, T::default(), value::parse_float::<T>).tolerate_dashes(1)
}

/// `true` or `false`.
pub fn boolean(name: &str, desc: &str) -> Single<bool> {
    Single::new(name, desc, false, |s| {
        s.parse::<bool>().map_err(|e| ValueError::convert::<bool>(s, e))
    })
}

/// A value looked up by name from `mapping`.
pub fn named_of<T>(name: &str, desc: &str, mapping: Vec<NamedValue<T>>) -> Single<T>
where
    T: Clone + Default + fmt::Debug + 'static,
{
    Single::new(name, desc, T::default(), move |s| {
        value::lookup_named(&mapping, s)
    })
}

/// A string restricted to `names`.
pub fn string_of(name: &str, desc: &str, names: &[&str]) -> Single<String> {
    let mapping = names
        .iter()
        .map(|n| NamedValue::new(*n, n.to_string()))
        .collect();
    named_of(name, desc, mapping)
}

/// A value produced by a custom conversion; `None` until parsed.
pub fn parser<U, E, F>(name: &str, desc: &str, convert: F) -> Single<Option<U>>
where
    U: Clone + fmt::Debug + 'static,
    E: Into<value::BoxError>,
    F: Fn(&str) -> Result<U, E> + 'static,
{
    Single::new(name, desc, None, move |s| {
        convert(s).map(Some).map_err(|e| ValueError::Custom(e.into()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_value_overwrites() {
        let opt = string("name", "");
        opt.cell.parse_value("first").unwrap();
        opt.cell.parse_inline("second").unwrap();
        assert_eq!(opt.value(), "second");
    }

    #[test]
    fn test_failed_parse_keeps_previous_value() {
        let opt = int::<i32>("n", "", 10);
        opt.cell.parse_value("5").unwrap();
        assert!(opt.cell.parse_value("five").is_err());
        assert_eq!(opt.value(), 5);
    }

    #[test]
    fn test_accepts_plain_and_dashed_tokens() {
        let s = string("s", "");
        assert!(accepts(&*s.as_opt(), "hello"));
        assert!(accepts(&*s.as_opt(), ""));
        assert!(!accepts(&*s.as_opt(), "-n"));
        assert!(!accepts(&*s.as_opt(), "-"));

        let f = file("f", "");
        assert!(accepts(&*f.as_opt(), "-"));
        assert!(!accepts(&*f.as_opt(), "-n"));

        let i = int::<i64>("i", "", 10);
        assert!(accepts(&*i.as_opt(), "-100"));
        assert!(!accepts(&*i.as_opt(), "--100"));
        assert!(!accepts(&*i.as_opt(), "-"));

        let u = int::<u8>("u", "", 10);
        assert!(!accepts(&*u.as_opt(), "-1"));
    }

    #[test]
    fn test_named_of_lookup() {
        let digit = named_of(
            "digit",
            "",
            vec![
                NamedValue::new("one", 1),
                NamedValue::new("two", 2),
                NamedValue::new("three", 3),
            ],
        );
        digit.cell.parse_value("two").unwrap();
        assert_eq!(digit.value(), 2);
        let err = digit.cell.parse_value("four").unwrap_err();
        assert!(matches!(err, ValueError::NotOneOf { .. }));
        assert_eq!(digit.value(), 2);
    }

    #[test]
    fn test_parser_wraps_custom_error() {
        let port = parser("port", "", |s: &str| {
            s.strip_prefix(':')
                .ok_or("port must start with ':'")
                .map(str::to_string)
        });
        assert!(port.cell.parse_value("8080").is_err());
        port.cell.parse_value(":8080").unwrap();
        assert_eq!(port.value(), Some("8080".to_string()));
    }

    #[test]
    fn test_reset_restores_initial_value() {
        let opt = int::<i32>("n", "", 10);
        opt.cell.parse_value("5").unwrap();
        opt.cell.reset();
        assert_eq!(opt.value(), 0);

        let named = Single::new("level", "", 3u8, |s| value::parse_int::<u8>(s, 10));
        named.cell.parse_value("7").unwrap();
        named.cell.reset();
        assert_eq!(named.value(), 3);
    }

    #[test]
    fn test_debug_rendering() {
        let s = string("greeting", "");
        s.cell.parse_value("hi").unwrap();
        assert_eq!(s.cell.debug(), r#"greeting="hi""#);
    }

    #[test]
    fn test_single_has_inline_and_value_only() {
        let s = string("s", "");
        let opt = s.as_opt();
        assert!(opt.as_flag().is_none());
        assert!(opt.as_inline().is_some());
        assert!(opt.as_value().is_some());
        assert!(opt.as_values().is_none());
    }
}
