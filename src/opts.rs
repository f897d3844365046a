//! Multi-value option cells: the trailing variadic argument, or a flag
//! that may be repeated.

use crate::command::{Arg, Flag};
use crate::opt::{InlineParser, Opt, Partial, ValueParser, ValuesParser, DASH_OK};
use crate::value::{self, Float, Integer, NamedValue, ValueError};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub(crate) struct MultiCell<T> {
    name: String,
    desc: String,
    values: RefCell<Vec<T>>,
    parse: Box<dyn Fn(&str) -> Result<T, ValueError>>,
    dash_tolerance: Cell<usize>,
    ok_values: Cell<&'static [&'static str]>,
}

impl<T> MultiCell<T> {
    fn push(&self, token: &str) -> Result<(), ValueError> {
        let parsed = (self.parse)(token)?;
        self.values.borrow_mut().push(parsed);
        Ok(())
    }
}

impl<T: fmt::Debug + 'static> Opt for MultiCell<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.desc
    }

    fn parse_default(&self, literal: &str) -> Result<(), ValueError> {
        self.push(literal)
    }

    fn ok_values(&self) -> &'static [&'static str] {
        self.ok_values.get()
    }

    fn dash_tolerance(&self) -> usize {
        self.dash_tolerance.get()
    }

    fn debug(&self) -> String {
        format!("{}={:?}", self.name, self.values.borrow())
    }

    fn reset(&self) {
        self.values.borrow_mut().clear();
    }

    fn as_inline(&self) -> Option<&dyn InlineParser> {
        Some(self)
    }

    fn as_value(&self) -> Option<&dyn ValueParser> {
        Some(self)
    }

    fn as_values(&self) -> Option<&dyn ValuesParser> {
        Some(self)
    }
}

impl<T> InlineParser for MultiCell<T> {
    fn parse_inline(&self, value: &str) -> Result<(), ValueError> {
        self.push(value)
    }
}

impl<T> ValueParser for MultiCell<T> {
    fn parse_value(&self, value: &str) -> Result<(), ValueError> {
        self.push(value)
    }
}

impl<T> ValuesParser for MultiCell<T> {
    fn parse_values(&self, values: &[String]) -> Result<usize, Partial> {
        for (accepted, token) in values.iter().enumerate() {
            self.push(token)
                .map_err(|error| Partial { accepted, error })?;
        }
        Ok(values.len())
    }
}

/// A growable list of values.
pub struct Multi<T> {
    cell: Rc<MultiCell<T>>,
}

impl<T> Clone for Multi<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug + 'static> Multi<T> {
    pub fn new(
        name: impl Into<String>,
        desc: impl Into<String>,
        parse: impl Fn(&str) -> Result<T, ValueError> + 'static,
    ) -> Self {
        Self {
            cell: Rc::new(MultiCell {
                name: name.into(),
                desc: desc.into(),
                values: RefCell::new(Vec::new()),
                parse: Box::new(parse),
                dash_tolerance: Cell::new(0),
                ok_values: Cell::new(&[]),
            }),
        }
    }

    pub fn tolerate_dashes(self, dashes: usize) -> Self {
        self.cell.dash_tolerance.set(dashes);
        self
    }

    pub fn allow(self, literals: &'static [&'static str]) -> Self {
        self.cell.ok_values.set(literals);
        self
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.cell.values.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.cell.values.borrow())
    }

    /// The trailing variadic argument, displayed as `<name> ...`.
    pub fn rest(&self, name: &str) -> Arg {
        Arg::new(self.as_opt(), name, true)
    }

    /// A repeatable flag named `--<name>`.
    pub fn flag(&self) -> Flag {
        Flag::new(self.as_opt(), None, Some(self.cell.name.clone()))
    }

    pub fn flags(&self, short: char, long: &str) -> Flag {
        Flag::new(self.as_opt(), Some(short), Some(long.to_string()))
    }

    pub(crate) fn as_opt(&self) -> Rc<dyn Opt> {
        self.cell.clone()
    }
}

pub fn string_slice(name: &str, desc: &str) -> Multi<String> {
    string_like_slice::<String>(name, desc)
}

pub fn string_like_slice<T>(name: &str, desc: &str) -> Multi<T>
where
    T: From<String> + fmt::Debug + 'static,
{
    Multi::new(name, desc, |s| Ok(T::from(s.to_string())))
}

/// Filenames, accepting `-` among the positional values.
pub fn file_slice(name: &str, desc: &str) -> Multi<String> {
    string_slice(name, desc).allow(DASH_OK)
}

pub fn int_slice<T: Integer>(name: &str, desc: &str, base: u32) -> Multi<T> {
    Multi::new(name, desc, move |s| value::parse_int::<T>(s, base))
        .tolerate_dashes(usize::from(T::SIGNED))
}

pub fn float_slice<T: Float>(name: &str, desc: &str) -> Multi<T> {
    Multi::new(name, desc, value::parse_float::<T>).tolerate_dashes(1)
}

/// `true`/`false` values.
pub fn bool_slice(name: &str, desc: &str) -> Multi<bool> {
    Multi::new(name, desc, |s| {
        s.parse::<bool>().map_err(|e| ValueError::convert::<bool>(s, e))
    })
}

pub fn named_slice_of<T>(name: &str, desc: &str, mapping: Vec<NamedValue<T>>) -> Multi<T>
where
    T: Clone + fmt::Debug + 'static,
{
    Multi::new(name, desc, move |s| value::lookup_named(&mapping, s))
}

pub fn string_slice_of(name: &str, desc: &str, names: &[&str]) -> Multi<String> {
    let mapping = names
        .iter()
        .map(|n| NamedValue::new(*n, n.to_string()))
        .collect();
    named_slice_of(name, desc, mapping)
}

pub fn parser_slice<U, E, F>(name: &str, desc: &str, convert: F) -> Multi<U>
where
    U: fmt::Debug + 'static,
    E: Into<value::BoxError>,
    F: Fn(&str) -> Result<U, E> + 'static,
{
    Multi::new(name, desc, move |s| {
        convert(s).map_err(|e| ValueError::Custom(e.into()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_values_consumes_all() {
        let many = string_slice("files", "");
        let taken = many.cell.parse_values(&tokens(&["a", "b", "c"])).unwrap();
        assert_eq!(taken, 3);
        assert_eq!(many.values(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_values_reports_failure_position() {
        let many = int_slice::<i64>("n", "", 0);
        let partial = many
            .cell
            .parse_values(&tokens(&["6", "-2", "17", "+-3", "9"]))
            .unwrap_err();
        assert_eq!(partial.accepted, 3);
        assert!(matches!(partial.error, ValueError::Convert { .. }));
        assert_eq!(many.values(), vec![6, -2, 17]);
    }

    #[test]
    fn test_repeated_single_values_append() {
        let many = string_slice("tag", "");
        many.cell.parse_value("x").unwrap();
        many.cell.parse_inline("y").unwrap();
        assert_eq!(many.values(), vec!["x", "y"]);
    }

    #[test]
    fn test_reset_clears_values() {
        let many = string_slice("tag", "");
        many.cell.parse_value("x").unwrap();
        many.cell.reset();
        assert!(many.values().is_empty());
    }

    #[test]
    fn test_named_slice() {
        let digits = named_slice_of(
            "digits",
            "",
            vec![NamedValue::new("one", 1), NamedValue::new("two", 2)],
        );
        let partial = digits
            .cell
            .parse_values(&tokens(&["two", "four"]))
            .unwrap_err();
        assert_eq!(partial.accepted, 1);
        assert_eq!(digits.values(), vec![2]);
    }

    #[test]
    fn test_debug_rendering() {
        let many = float_slice::<f64>("pcts", "");
        many.cell
            .parse_values(&tokens(&["12.34", "+12", "-.34"]))
            .unwrap();
        assert_eq!(many.cell.debug(), "pcts=[12.34, 12.0, -0.34]");
    }
}
