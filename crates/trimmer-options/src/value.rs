//! Option values
//!
//! [`OptionValue`] is the string codec every option value type implements.
//! `parse(to_store_string(v))` must reproduce `v`.

use std::fmt::Debug;

/// Value held by an option node
pub trait OptionValue: Clone + PartialEq + Debug + Default + 'static {
    /// Parse persisted text, `None` when the text is not a valid value
    fn parse(input: &str) -> Option<Self>;

    /// Serialize for the value store
    fn to_store_string(&self) -> String;
}

/// How [`crate::OptionNode::load`] obtained its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Input parsed successfully
    Parsed,
    /// Input was empty or malformed; the default value was used
    Defaulted,
}

impl OptionValue for bool {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("true") {
            Some(true)
        } else if input.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn to_store_string(&self) -> String {
        self.to_string()
    }
}

macro_rules! numeric_option_value {
    ($($ty:ty),*) => {
        $(
            impl OptionValue for $ty {
                fn parse(input: &str) -> Option<Self> {
                    input.trim().parse().ok()
                }

                fn to_store_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

numeric_option_value!(i32, i64, u32, f32, f64);

impl OptionValue for String {
    fn parse(input: &str) -> Option<Self> {
        Some(input.to_string())
    }

    fn to_store_string(&self) -> String {
        self.clone()
    }
}
