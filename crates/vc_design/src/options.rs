use alloc::collections::BTreeMap;
use alloc::string::String;

use log::warn;

use crate::localization::LocalizationModel;

// -----------------------------------------------------------------------------
// DesignerOptions

/// Knobs of a serialization session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesignerOptions {
    /// Reuse cached statements of components that did not change.
    pub cache_enabled: bool,
    pub localization: LocalizationModel,
    /// Strings longer than this many characters are written to the
    /// resource store instead of inline literals.
    pub resource_string_threshold: usize,
    /// Keep statement names when the container already uses them,
    /// instead of letting it choose fresh ones.
    pub preserve_names: bool,
    /// Creating an instance under a name the container already uses
    /// returns the existing component.
    pub recycle_instances: bool,
    /// Reject recycled instances whose type differs from the requested one.
    pub validate_recycled_types: bool,
}

impl Default for DesignerOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            localization: LocalizationModel::None,
            resource_string_threshold: 200,
            preserve_names: false,
            recycle_instances: false,
            validate_recycled_types: true,
        }
    }
}

/// Option keys understood by [`DesignerOptions::from_source`].
pub mod keys {
    pub const CACHE_ENABLED: &str = "cache.enabled";
    pub const LOCALIZATION_MODEL: &str = "localization.model";
    pub const RESOURCE_STRING_THRESHOLD: &str = "resources.string_threshold";
    pub const PRESERVE_NAMES: &str = "names.preserve";
    pub const RECYCLE_INSTANCES: &str = "instances.recycle";
    pub const VALIDATE_RECYCLED_TYPES: &str = "instances.validate_types";
}

impl DesignerOptions {
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_localization(mut self, model: LocalizationModel) -> Self {
        self.localization = model;
        self
    }

    pub fn with_resource_string_threshold(mut self, threshold: usize) -> Self {
        self.resource_string_threshold = threshold;
        self
    }

    pub fn with_preserve_names(mut self, preserve: bool) -> Self {
        self.preserve_names = preserve;
        self
    }

    pub fn with_recycle_instances(mut self, recycle: bool, validate_types: bool) -> Self {
        self.recycle_instances = recycle;
        self.validate_recycled_types = validate_types;
        self
    }

    /// Reads options from a key/value source. Missing or malformed entries
    /// keep their default.
    ///
    /// ```
    /// use vc_design::{DesignerOptions, LocalizationModel};
    ///
    /// let options = DesignerOptions::from_source(&[
    ///     ("cache.enabled", "false"),
    ///     ("localization.model", "reflection"),
    /// ][..]);
    /// assert!(!options.cache_enabled);
    /// assert_eq!(options.localization, LocalizationModel::PropertyReflection);
    /// ```
    pub fn from_source(source: &(impl OptionsSource + ?Sized)) -> Self {
        let mut options = Self::default();
        read(source, keys::CACHE_ENABLED, parse_bool, &mut options.cache_enabled);
        read(source, keys::LOCALIZATION_MODEL, LocalizationModel::parse, &mut options.localization);
        read(
            source,
            keys::RESOURCE_STRING_THRESHOLD,
            |s| s.parse().ok(),
            &mut options.resource_string_threshold,
        );
        read(source, keys::PRESERVE_NAMES, parse_bool, &mut options.preserve_names);
        read(source, keys::RECYCLE_INSTANCES, parse_bool, &mut options.recycle_instances);
        read(
            source,
            keys::VALIDATE_RECYCLED_TYPES,
            parse_bool,
            &mut options.validate_recycled_types,
        );
        options
    }
}

fn read<S, T>(source: &S, key: &str, parse: impl FnOnce(&str) -> Option<T>, slot: &mut T)
where
    S: OptionsSource + ?Sized,
{
    let Some(raw) = source.value(key) else {
        return;
    };
    match parse(raw.trim()) {
        Some(value) => *slot = value,
        None => warn!("ignoring malformed option `{key}` = `{raw}`"),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// OptionsSource

/// A flat key/value configuration source.
pub trait OptionsSource {
    fn value(&self, key: &str) -> Option<&str>;
}

impl<K: AsRef<str>, V: AsRef<str>> OptionsSource for [(K, V)] {
    fn value(&self, key: &str) -> Option<&str> {
        self.iter()
            .rev()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }
}

impl OptionsSource for BTreeMap<String, String> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{DesignerOptions, keys};
    use crate::localization::LocalizationModel;

    #[test]
    fn defaults() {
        let options = DesignerOptions::default();
        assert!(options.cache_enabled);
        assert_eq!(options.resource_string_threshold, 200);
        assert_eq!(options.localization, LocalizationModel::None);
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let source = [
            (keys::RESOURCE_STRING_THRESHOLD, "lots"),
            (keys::RECYCLE_INSTANCES, "yes"),
            (keys::LOCALIZATION_MODEL, "assignment"),
        ];
        let options = DesignerOptions::from_source(&source[..]);
        assert_eq!(options.resource_string_threshold, 200);
        assert!(options.recycle_instances);
        assert_eq!(options.localization, LocalizationModel::PropertyAssignment);
    }
}
