//! Token conversion: the errors a single value can fail with, and the
//! numeric/named conversions shared by the option cells.

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Boxed error produced by a custom conversion function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Enumerations with at least this many names report a generic message
/// instead of listing every allowed name.
pub const NAMED_LIST_LIMIT: usize = 8;

/// Errors that can occur while converting a single token into a value.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("parsing {value:?} as {type_name}: {cause}")]
    Convert {
        value: String,
        type_name: &'static str,
        #[source]
        cause: BoxError,
    },

    #[error("{}", not_one_of(.value, .names))]
    NotOneOf { value: String, names: Vec<String> },

    #[error("repeated")]
    Repeated,

    #[error(transparent)]
    Custom(BoxError),
}

impl ValueError {
    /// Wrap a conversion failure of `value` into `T`.
    pub fn convert<T: ?Sized>(value: &str, cause: impl Into<BoxError>) -> Self {
        ValueError::Convert {
            value: value.to_string(),
            type_name: short_type_name::<T>(),
            cause: cause.into(),
        }
    }
}

fn not_one_of(value: &str, names: &[String]) -> String {
    if names.len() < NAMED_LIST_LIMIT {
        let quoted: Vec<String> = names.iter().map(|n| format!("{:?}", n)).collect();
        format!("{:?} not one of {}", value, quoted.join(", "))
    } else {
        format!("{:?} unsupported value", value)
    }
}

/// Type name without its module path (`alloc::string::String` -> `String`).
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// A name and the value it stands for, used by enumerated options.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue<T> {
    pub name: String,
    pub desc: String,
    pub value: T,
}

impl<T> NamedValue<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            desc: String::new(),
            value,
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }
}

/// Linear lookup of `token` among `mapping`.
pub(crate) fn lookup_named<T: Clone>(
    mapping: &[NamedValue<T>],
    token: &str,
) -> Result<T, ValueError> {
    mapping
        .iter()
        .find(|nv| nv.name == token)
        .map(|nv| nv.value.clone())
        .ok_or_else(|| ValueError::NotOneOf {
            value: token.to_string(),
            names: mapping.iter().map(|nv| nv.name.clone()).collect(),
        })
}

/// Primitive integers usable by `int` options.
pub trait Integer: Copy + Default + std::fmt::Debug + 'static {
    /// Signed integers tolerate one leading dash as a positional value.
    const SIGNED: bool;

    fn from_str_radix(src: &str, radix: u32) -> Result<Self, ParseIntError>;
}

macro_rules! impl_integer {
    ($signed:expr => $($ty:ty),*) => {
        $(
            impl Integer for $ty {
                const SIGNED: bool = $signed;

                fn from_str_radix(src: &str, radix: u32) -> Result<Self, ParseIntError> {
                    <$ty>::from_str_radix(src, radix)
                }
            }
        )*
    };
}

impl_integer!(true => i8, i16, i32, i64, i128, isize);
impl_integer!(false => u8, u16, u32, u64, u128, usize);

/// Parse an integer in `base`; base 0 selects the base from the prefix
/// (`0x`, `0o`, `0b`, or a leading `0` for octal) and defaults to 10.
/// Any other base outside `2..=36` fails every token.
pub fn parse_int<T: Integer>(token: &str, base: u32) -> Result<T, ValueError> {
    if base != 0 {
        if !(2..=36).contains(&base) {
            return Err(ValueError::convert::<T>(token, format!("invalid base {}", base)));
        }
        return T::from_str_radix(token, base).map_err(|e| ValueError::convert::<T>(token, e));
    }

    let (sign, unsigned) = match token.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", token.strip_prefix('+').unwrap_or(token)),
    };
    if unsigned.starts_with(&['+', '-'][..]) {
        // a second sign is never valid; let the conversion report it
        return T::from_str_radix(token, 10).map_err(|e| ValueError::convert::<T>(token, e));
    }

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    T::from_str_radix(&format!("{}{}", sign, digits), radix)
        .map_err(|e| ValueError::convert::<T>(token, e))
}

/// Primitive floats usable by `float` options.
pub trait Float:
    Copy + Default + std::fmt::Debug + std::str::FromStr<Err = ParseFloatError> + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}

pub fn parse_float<T: Float>(token: &str) -> Result<T, ValueError> {
    token
        .parse::<T>()
        .map_err(|e| ValueError::convert::<T>(token, e))
}

/// Values an accumulator flag can add to: ordered numbers and strings.
pub trait Accumulate: Clone {
    fn accumulate(&self, increment: &Self) -> Self;
}

macro_rules! impl_accumulate_int {
    ($($ty:ty),*) => {
        $(
            impl Accumulate for $ty {
                fn accumulate(&self, increment: &Self) -> Self {
                    self.saturating_add(*increment)
                }
            }
        )*
    };
}

impl_accumulate_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Accumulate for f32 {
    fn accumulate(&self, increment: &Self) -> Self {
        self + increment
    }
}

impl Accumulate for f64 {
    fn accumulate(&self, increment: &Self) -> Self {
        self + increment
    }
}

impl Accumulate for String {
    fn accumulate(&self, increment: &Self) -> Self {
        let mut joined = String::with_capacity(self.len() + increment.len());
        joined.push_str(self);
        joined.push_str(increment);
        joined
    }
}
