//! Testing utilities for the Trimmer workspace
//!
//! A small sample schema covering every variance, capability filters and an
//! enum-valued option, plus a recording apply environment and tracing setup.

#![allow(missing_docs)]

use trimmer_options::prelude::*;
use trimmer_options::{OptionSchema, OptionTree};
use trimmer_store::ValueStore;

/// Build target on which [`Console`] is unavailable
pub const SERVER_TARGET: &str = "server";

/// Install a `RUST_LOG`-filtered fmt subscriber once per process
///
/// Later calls are no-ops.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Apply environment that records `(path, value)` per applied node
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppliedLog {
    pub entries: Vec<(String, String)>,
}

impl AppliedLog {
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(path, _)| path.as_str()).collect()
    }

    #[must_use]
    pub fn value_of(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, value)| value.as_str())
    }
}

fn record<V: OptionValue>(ctx: &mut ApplyContext<'_, V>) {
    let entry = (ctx.path().to_string(), ctx.value().to_store_string());
    if let Some(log) = ctx.environment::<AppliedLog>() {
        log.entries.push(entry);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QualityLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl OptionValue for QualityLevel {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    fn to_store_string(&self) -> String {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
        .to_string()
    }
}

pub struct Graphics;
pub struct Quality;
pub struct Channel;
pub struct Network;
pub struct Server;
pub struct Port;
pub struct Console;

impl OptionType for Graphics {
    type Value = bool;
    const NAME: &'static str = "Graphics";

    fn configure(config: &mut OptionConfig<bool>) {
        config.default_value(true).capabilities(
            Capabilities::HAS_ASSOCIATED_FEATURE
                | Capabilities::CAN_INCLUDE_OPTION
                | Capabilities::CONFIGURES_BUILD,
        );
    }

    fn children(children: &mut ChildRegistry) {
        children.add::<Quality>().add::<Channel>();
    }

    fn apply(ctx: &mut ApplyContext<'_, bool>) {
        record(ctx);
    }
}

impl OptionType for Quality {
    type Value = QualityLevel;
    const NAME: &'static str = "Quality";

    fn configure(config: &mut OptionConfig<QualityLevel>) {
        config.default_value(QualityLevel::Medium).apply_order(-1);
    }

    fn apply(ctx: &mut ApplyContext<'_, QualityLevel>) {
        record(ctx);
    }
}

impl OptionType for Channel {
    type Value = f32;
    const NAME: &'static str = "Channel";

    fn configure(config: &mut OptionConfig<f32>) {
        config
            .default_value(1.0)
            .variance(Variance::Array)
            .category("Audio");
    }

    fn apply(ctx: &mut ApplyContext<'_, f32>) {
        record(ctx);
    }
}

impl OptionType for Network {
    type Value = bool;
    const NAME: &'static str = "Network";

    fn configure(config: &mut OptionConfig<bool>) {
        config.capabilities(
            Capabilities::HAS_ASSOCIATED_FEATURE
                | Capabilities::CAN_INCLUDE_OPTION
                | Capabilities::CAN_PLAY_LIVE,
        );
    }

    fn children(children: &mut ChildRegistry) {
        children.add::<Server>();
    }

    fn apply(ctx: &mut ApplyContext<'_, bool>) {
        record(ctx);
    }
}

impl OptionType for Server {
    type Value = String;
    const NAME: &'static str = "Server";

    fn configure(config: &mut OptionConfig<String>) {
        config
            .default_value("localhost".to_string())
            .variance(Variance::Dictionary)
            .default_parameter("Main");
    }

    fn children(children: &mut ChildRegistry) {
        children.add::<Port>();
    }

    fn apply(ctx: &mut ApplyContext<'_, String>) {
        record(ctx);
    }
}

impl OptionType for Port {
    type Value = u32;
    const NAME: &'static str = "Port";

    fn configure(config: &mut OptionConfig<u32>) {
        config.default_value(8080);
    }

    fn apply(ctx: &mut ApplyContext<'_, u32>) {
        record(ctx);
    }
}

impl OptionType for Console {
    type Value = bool;
    const NAME: &'static str = "Console";

    fn configure(config: &mut OptionConfig<bool>) {
        config.default_value(true).capabilities(
            Capabilities::HAS_ASSOCIATED_FEATURE
                | Capabilities::CAN_INCLUDE_OPTION
                | Capabilities::EXECUTE_OUTSIDE_PLAY,
        );
    }

    fn apply(ctx: &mut ApplyContext<'_, bool>) {
        record(ctx);
    }

    fn is_available(target: &BuildTarget) -> bool {
        target.as_str() != SERVER_TARGET
    }

    fn allows_feature_only(value: &bool) -> bool {
        *value
    }
}

/// Graphics, Network and Console roots
#[must_use]
pub fn sample_schema() -> OptionSchema {
    OptionSchema::builder()
        .root::<Graphics>()
        .root::<Network>()
        .root::<Console>()
        .build()
        .expect("sample schema has unique roots")
}

/// Fresh tree over [`sample_schema`]
#[must_use]
pub fn sample_tree() -> OptionTree {
    OptionTree::new(&sample_schema()).expect("sample schema builds")
}

/// Store with a quality setting and two array channels, `1` and `9`
#[must_use]
pub fn sample_store() -> ValueStore {
    let mut store = ValueStore::new();
    for (path, value) in [
        ("Graphics/Quality", "High"),
        ("Graphics/Channel:1", "0.5"),
        ("Graphics/Channel:9", "0.2"),
    ] {
        store.set_value(path, value).expect("valid sample path");
    }
    store.clear_dirty();
    store
}
