//! Figment-backed implementation of [`ConfigurationBinder`].

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use figment::{Figment, providers::Serialized};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use super::{ConfigAttribute, ConfigGroup, ConfigurationBinder};
use crate::{Message, PropertyMap};

type BindFn = fn(&PropertyMap, &mut dyn FnMut(Message)) -> GroupBinding;

struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    prefix: &'static str,
    bind: BindFn,
}

struct GroupBinding {
    instance: Option<Box<dyn Any + Send + Sync>>,
    errors: Vec<Message>,
    used: BTreeSet<String>,
    attributes: Vec<ConfigAttribute>,
}

/// Binds [`ConfigGroup`] types by layering each group's defaults and its
/// `PREFIX.*` properties through [`Figment`].
///
/// Property values are strings; they are converted to the field types with
/// figment's lossy extraction, so `"8080"` binds to a `u16` and `"yes"` to a
/// `bool`.
///
/// # Examples
///
/// ```
/// use bootseq::{ConfigGroup, ConfigurationBinder, ConfigurationFactory, PropertyMap};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Db {
///     pool: u32,
/// }
///
/// impl ConfigGroup for Db {
///     const PREFIX: &'static str = "db";
/// }
///
/// let mut factory = ConfigurationFactory::default();
/// factory.register::<Db>();
/// let mut props = PropertyMap::new();
/// props.insert("db.pool".into(), "8".into());
/// let errors = factory.bind(&props, &mut |_| {});
/// assert!(errors.is_empty());
/// assert_eq!(factory.build::<Db>().map(|db| db.pool), Some(8));
/// assert!(factory.used_properties().contains("db.pool"));
/// ```
#[derive(Default)]
pub struct ConfigurationFactory {
    registrations: Vec<Registration>,
    instances: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    used: BTreeSet<String>,
    attributes: Vec<ConfigAttribute>,
}

impl fmt::Debug for ConfigurationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationFactory")
            .field(
                "groups",
                &self
                    .registrations
                    .iter()
                    .map(|r| r.type_name)
                    .collect::<Vec<_>>(),
            )
            .field("used", &self.used)
            .finish_non_exhaustive()
    }
}

impl ConfigurationBinder for ConfigurationFactory {
    fn register<T: ConfigGroup>(&mut self) {
        let type_id = TypeId::of::<T>();
        if self.registrations.iter().any(|r| r.type_id == type_id) {
            return;
        }
        self.registrations.push(Registration {
            type_id,
            type_name: std::any::type_name::<T>(),
            prefix: T::PREFIX,
            bind: bind_group::<T>,
        });
    }

    fn bind(
        &mut self,
        properties: &PropertyMap,
        warnings: &mut dyn FnMut(Message),
    ) -> Vec<Message> {
        self.instances.clear();
        self.used.clear();
        self.attributes.clear();
        let mut errors = Vec::new();
        for registration in &self.registrations {
            debug!(
                group = registration.type_name,
                prefix = registration.prefix,
                "binding configuration group"
            );
            let binding = (registration.bind)(properties, warnings);
            errors.extend(binding.errors);
            self.used.extend(binding.used);
            self.attributes.extend(binding.attributes);
            if let Some(instance) = binding.instance {
                self.instances.insert(registration.type_id, instance);
            }
        }
        errors
    }

    fn used_properties(&self) -> BTreeSet<String> {
        self.used.clone()
    }

    fn build<T: ConfigGroup>(&self) -> Option<T> {
        self.instances
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.downcast_ref::<T>())
            .cloned()
    }

    fn attributes(&self) -> Vec<ConfigAttribute> {
        self.attributes.clone()
    }
}

fn bind_group<T: ConfigGroup>(
    properties: &PropertyMap,
    warnings: &mut dyn FnMut(Message),
) -> GroupBinding {
    let defaults = T::default();
    let default_fields = serialized_fields(&defaults);
    let mut used = BTreeSet::new();
    let mut figment = Figment::from(Serialized::defaults(&defaults));

    for (legacy, replacement) in T::LEGACY {
        let legacy_key = property_name(T::PREFIX, legacy);
        let Some(value) = properties.get(&legacy_key) else {
            continue;
        };
        let replacement_key = property_name(T::PREFIX, replacement);
        warnings(Message::warning(format!(
            "Configuration property '{legacy_key}' has been replaced. Use '{replacement_key}' instead."
        )));
        if !properties.contains_key(&replacement_key) {
            figment = figment.merge(Serialized::default(replacement, value));
        }
        used.insert(legacy_key);
    }

    for (key, value) in properties {
        let Some(path) = field_path(T::PREFIX, key) else {
            continue;
        };
        if !default_fields.contains_key(top_level(path)) {
            continue;
        }
        figment = figment.merge(Serialized::default(path, value));
        used.insert(key.clone());
    }

    let (instance, errors) = match figment.extract_lossy::<T>() {
        Ok(config) => {
            let violations = config.validate();
            if violations.is_empty() {
                (Some(config), Vec::new())
            } else {
                let errors = violations
                    .into_iter()
                    .map(|v| Message::error(format!("Invalid configuration for '{}': {v}", T::PREFIX)))
                    .collect();
                (None, errors)
            }
        }
        Err(err) => (
            None,
            err.into_iter().map(|e| binding_error(T::PREFIX, &e)).collect(),
        ),
    };

    let current_fields = instance.as_ref().map(serialized_fields);
    let attributes = describe::<T>(&default_fields, current_fields.as_ref());
    GroupBinding {
        instance: instance.map(|config| Box::new(config) as Box<dyn Any + Send + Sync>),
        errors,
        used,
        attributes,
    }
}

fn binding_error(prefix: &str, err: &figment::Error) -> Message {
    let property = if err.path.is_empty() {
        prefix.to_owned()
    } else {
        property_name(prefix, &err.path.join("."))
    };
    Message::error(format!(
        "Invalid configuration property '{property}': {}",
        err.kind
    ))
}

fn serialized_fields<T: Serialize>(value: &T) -> JsonMap<String, JsonValue> {
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(fields)) => fields,
        _ => JsonMap::new(),
    }
}

fn describe<T: ConfigGroup>(
    defaults: &JsonMap<String, JsonValue>,
    current: Option<&JsonMap<String, JsonValue>>,
) -> Vec<ConfigAttribute> {
    defaults
        .iter()
        .map(|(field, default)| {
            let sensitive = T::SENSITIVE.iter().any(|name| *name == field.as_str());
            let description = T::DESCRIPTIONS
                .iter()
                .find(|(name, _)| *name == field.as_str())
                .map(|(_, text)| (*text).to_owned())
                .unwrap_or_default();
            ConfigAttribute {
                property_name: property_name(T::PREFIX, field),
                default_value: display_value(Some(default), sensitive),
                current_value: display_value(current.and_then(|c| c.get(field)), sensitive),
                description,
            }
        })
        .collect()
}

fn display_value(value: Option<&JsonValue>, sensitive: bool) -> String {
    match value {
        _ if sensitive => "[REDACTED]".to_owned(),
        None | Some(JsonValue::Null) => "----".to_owned(),
        Some(JsonValue::String(text)) => text.clone(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| display_value(Some(item), false))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    }
}

fn property_name(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_owned()
    } else {
        format!("{prefix}.{field}")
    }
}

fn field_path<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(key);
    }
    key.strip_prefix(prefix)?
        .strip_prefix('.')
        .filter(|path| !path.is_empty())
}

fn top_level(path: &str) -> &str {
    path.split_once('.').map_or(path, |(head, _)| head)
}
