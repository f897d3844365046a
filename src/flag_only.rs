//! Flag-only options: no textual value, each sighting advances a sequence.

use crate::command::Flag;
use crate::opt::{FlagParser, Opt};
use crate::value::{Accumulate, ValueError};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Step<T> = Box<dyn Fn(&T, usize) -> Result<T, ValueError>>;

pub(crate) struct FlagOnlyCell<T> {
    name: String,
    desc: String,
    initial: T,
    value: RefCell<T>,
    step: Step<T>,
}

impl<T> FlagOnlyCell<T> {
    fn advance(&self, occurrence: usize) -> Result<(), ValueError> {
        let next = {
            let current = self.value.borrow();
            (self.step)(&current, occurrence)?
        };
        *self.value.borrow_mut() = next;
        Ok(())
    }
}

impl<T: Clone + fmt::Debug + 'static> Opt for FlagOnlyCell<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.desc
    }

    // The literal is ignored; a default counts as a first sighting.
    fn parse_default(&self, _literal: &str) -> Result<(), ValueError> {
        self.advance(0)
    }

    fn debug(&self) -> String {
        format!("{}={:?}", self.name, self.value.borrow())
    }

    fn reset(&self) {
        *self.value.borrow_mut() = self.initial.clone();
    }

    fn as_flag(&self) -> Option<&dyn FlagParser> {
        Some(self)
    }
}

impl<T> FlagParser for FlagOnlyCell<T> {
    fn parse_flag(&self, occurrence: usize) -> Result<(), ValueError> {
        self.advance(occurrence)
    }
}

/// A flag that takes no value.
pub struct FlagOnly<T> {
    cell: Rc<FlagOnlyCell<T>>,
}

impl<T> Clone for FlagOnly<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Clone + fmt::Debug + 'static> FlagOnly<T> {
    fn new(
        name: &str,
        desc: &str,
        initial: T,
        step: impl Fn(&T, usize) -> Result<T, ValueError> + 'static,
    ) -> Self {
        Self {
            cell: Rc::new(FlagOnlyCell {
                name: name.to_string(),
                desc: desc.to_string(),
                value: RefCell::new(initial.clone()),
                initial,
                step: Box::new(step),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    pub fn value(&self) -> T {
        self.cell.value.borrow().clone()
    }

    pub fn flag(&self) -> Flag {
        Flag::new(self.as_opt(), None, Some(self.cell.name.clone()))
    }

    pub fn flags(&self, short: char, long: &str) -> Flag {
        Flag::new(self.as_opt(), Some(short), Some(long.to_string()))
    }

    pub fn short(&self, short: char) -> Flag {
        Flag::new(self.as_opt(), Some(short), None)
    }

    pub(crate) fn as_opt(&self) -> Rc<dyn Opt> {
        self.cell.clone()
    }
}

/// Starts as `unseen`, becomes `seen`, and fails if given twice.
pub fn enabler<T>(name: &str, desc: &str, unseen: T, seen: T) -> FlagOnly<T>
where
    T: Clone + fmt::Debug + 'static,
{
    FlagOnly::new(
        name,
        desc,
        unseen,
        move |_, occurrence| {
            if occurrence > 0 {
                return Err(ValueError::Repeated);
            }
            Ok(seen.clone())
        },
    )
}

/// Alternates between `seen` and `unseen`, starting from `unseen`.
pub fn toggler<T>(name: &str, desc: &str, unseen: T, seen: T) -> FlagOnly<T>
where
    T: Clone + fmt::Debug + 'static,
{
    let off = unseen.clone();
    FlagOnly::new(
        name,
        desc,
        unseen,
        move |_, occurrence| {
            if occurrence % 2 == 0 {
                Ok(seen.clone())
            } else {
                Ok(off.clone())
            }
        },
    )
}

/// Starts at `initial` and adds `increment` on every sighting.
pub fn accumulator<T>(name: &str, desc: &str, initial: T, increment: T) -> FlagOnly<T>
where
    T: Accumulate + fmt::Debug + 'static,
{
    let start = initial.clone();
    FlagOnly::new(
        name,
        desc,
        initial,
        move |current, occurrence| {
            let base = if occurrence == 0 { &start } else { current };
            Ok(base.accumulate(&increment))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabler_errors_on_repeat() {
        let en = enabler("en", "", false, true);
        assert!(!en.value());
        en.cell.parse_flag(0).unwrap();
        assert!(en.value());
        let err = en.cell.parse_flag(1).unwrap_err();
        assert!(matches!(err, ValueError::Repeated));
    }

    #[test]
    fn test_toggler_alternates() {
        let t = toggler("en", "", false, true);
        let mut seen = Vec::new();
        for occurrence in 0..3 {
            t.cell.parse_flag(occurrence).unwrap();
            seen.push(t.value());
        }
        assert_eq!(seen, vec![true, false, true]);
    }

    #[test]
    fn test_accumulator_numbers_and_strings() {
        let no = accumulator("no", "", 0, -2);
        for occurrence in 0..4 {
            no.cell.parse_flag(occurrence).unwrap();
        }
        assert_eq!(no.value(), -8);

        let ha = accumulator("ha", "", String::new(), "ha".to_string());
        ha.cell.parse_flag(0).unwrap();
        ha.cell.parse_flag(1).unwrap();
        assert_eq!(ha.value(), "haha");
    }

    #[test]
    fn test_accumulator_restarts_each_parse() {
        let v = accumulator("v", "", 0u32, 1);
        v.cell.parse_flag(0).unwrap();
        v.cell.parse_flag(1).unwrap();
        assert_eq!(v.value(), 2);
        // a fresh parse sees occurrence 0 again
        v.cell.parse_flag(0).unwrap();
        assert_eq!(v.value(), 1);
    }

    #[test]
    fn test_reset_returns_to_unseen() {
        let en = enabler("en", "", false, true);
        en.cell.parse_flag(0).unwrap();
        en.cell.reset();
        assert!(!en.value());
        en.cell.parse_flag(0).unwrap();
        assert!(en.value());
    }

    #[test]
    fn test_only_flag_capability() {
        let en = enabler("en", "", false, true);
        let opt = en.as_opt();
        assert!(opt.as_flag().is_some());
        assert!(opt.as_inline().is_none());
        assert!(opt.as_value().is_none());
        assert!(opt.as_values().is_none());
    }
}
