//! Type-erased option instances
//!
//! Each node owns a `Box<dyn ErasedOption>` created by the factory of its
//! [`OptionDescriptor`](crate::OptionDescriptor). The concrete type is
//! [`TypedOption<T>`], which holds the current and default value of `T`.

use crate::option_type::{ApplyContext, NodeConfig, OptionConfig, OptionType};
use crate::value::{LoadOutcome, OptionValue};
use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

pub(crate) struct ApplyInfo<'a> {
    pub(crate) path: &'a str,
    pub(crate) parameter: Option<&'a str>,
    pub(crate) is_default_variant: bool,
}

pub(crate) trait ErasedOption: Debug {
    fn load(&mut self, input: &str) -> LoadOutcome;
    fn save(&self) -> String;
    fn default_string(&self) -> String;
    fn apply(&self, info: ApplyInfo<'_>, env: &mut dyn Any);
    fn allows_feature_only(&self) -> bool;
    fn value_any(&self) -> &dyn Any;
    fn value_any_mut(&mut self) -> &mut dyn Any;
}

pub(crate) struct TypedOption<T: OptionType> {
    value: T::Value,
    default: T::Value,
    _type: PhantomData<fn() -> T>,
}

impl<T: OptionType> Debug for TypedOption<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedOption")
            .field("option", &T::NAME)
            .field("value", &self.value)
            .field("default", &self.default)
            .finish()
    }
}

impl<T: OptionType> ErasedOption for TypedOption<T> {
    fn load(&mut self, input: &str) -> LoadOutcome {
        if input.is_empty() {
            self.value = self.default.clone();
            return LoadOutcome::Defaulted;
        }
        match T::Value::parse(input) {
            Some(value) => {
                self.value = value;
                LoadOutcome::Parsed
            }
            None => {
                tracing::debug!(option = T::NAME, input, "unparseable value, using default");
                self.value = self.default.clone();
                LoadOutcome::Defaulted
            }
        }
    }

    fn save(&self) -> String {
        self.value.to_store_string()
    }

    fn default_string(&self) -> String {
        self.default.to_store_string()
    }

    fn apply(&self, info: ApplyInfo<'_>, env: &mut dyn Any) {
        let mut ctx = ApplyContext {
            value: &self.value,
            path: info.path,
            parameter: info.parameter,
            is_default_variant: info.is_default_variant,
            env,
        };
        T::apply(&mut ctx);
    }

    fn allows_feature_only(&self) -> bool {
        T::allows_feature_only(&self.value)
    }

    fn value_any(&self) -> &dyn Any {
        &self.value
    }

    fn value_any_mut(&mut self) -> &mut dyn Any {
        &mut self.value
    }
}

/// Virtual constructor: construct, then configure
pub(crate) fn instantiate<T: OptionType>() -> (Box<dyn ErasedOption>, NodeConfig) {
    let mut config = OptionConfig::<T::Value>::new();
    T::configure(&mut config);
    let (default, node_config) = config.finish(T::NAME);
    let option = TypedOption::<T> {
        value: default.clone(),
        default,
        _type: PhantomData,
    };
    (Box::new(option), node_config)
}
