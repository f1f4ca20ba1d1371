//! Widget helpers.
//!
//! A widget exposes a subset of the plugin's instance options. When the
//! admin saves a widget, the submitted instance is merged into the stored
//! one with markup stripped from every accepted field.

use serde_json::{Map, Value};
use wpdtrt_options::OptionStore;

use crate::{ctx::PluginContext, utils::strip_tags};

/// Widget instance settings, keyed by option name.
pub type Instance = Map<String, Value>;

/// Instance key every widget accepts regardless of its options.
pub const TITLE_KEY: &str = "title";

/// A widget and the instance options it exposes.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Base id.
    pub name: String,
    /// Title shown in the widget admin.
    pub title: String,
    pub description: String,
    /// Content template name.
    pub template: String,
    user_options: OptionStore,
}

impl Widget {
    /// Creates a widget using the named subset of the plugin's instance
    /// options.
    pub fn new(
        ctx: &PluginContext,
        name: &str,
        title: &str,
        description: &str,
        template: &str,
        selected: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            template: template.to_string(),
            user_options: ctx.instance_options_for(selected),
        }
    }

    /// Options the admin can edit on this widget.
    pub fn user_options(&self) -> &OptionStore {
        &self.user_options
    }

    /// Merge a submitted instance into the stored one.
    pub fn update(&self, new_instance: &Instance, old_instance: &Instance) -> Instance {
        update_widget_instance(new_instance, old_instance, &self.user_options)
    }
}

/// Merge a submitted widget instance into the stored one.
///
/// Starts from `old_instance`. The title and every key of `user_options`
/// present (and not null) in `new_instance` are copied over as strings with
/// HTML stripped: numbers keep their decimal text, booleans become `"1"` or
/// `""`. Arrays and objects are not form values and are skipped, as are
/// submitted keys the widget does not know.
pub fn update_widget_instance(
    new_instance: &Instance,
    old_instance: &Instance,
    user_options: &OptionStore,
) -> Instance {
    let mut instance = old_instance.clone();

    for key in std::iter::once(TITLE_KEY).chain(user_options.keys()) {
        let text = match new_instance.get(key) {
            Some(Value::Null) | None => continue,
            Some(Value::String(s)) => strip_tags(s),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(true)) => "1".to_string(),
            Some(Value::Bool(false)) => String::new(),
            Some(other) => {
                warn!("widget field `{key}` is not a scalar, skipped: {other}");
                continue;
            }
        };
        instance.insert(key.to_string(), Value::String(text));
    }

    instance
}
