//! Localizable properties and design-time language switching.
//!
//! Under [`LocalizationModel::PropertyAssignment`] every localizable
//! property is assigned from the resource manager. Under
//! [`LocalizationModel::PropertyReflection`] values are only written to
//! the resource store and a single `ApplyResources` call per object
//! restores them at run time.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use log::{debug, warn};
use vc_codedom::{Expression, Statement};

use crate::Value;
use crate::context::ExpressionContext;
use crate::descriptor::{PropertyDescriptor, TypeFlags};
use crate::error::{DeserializeError, SerializeError};
use crate::host::{DesignHost, ObjectId};
use crate::manager::SerializationManager;

// -----------------------------------------------------------------------------
// LocalizationModel

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LocalizationModel {
    #[default]
    None,
    PropertyAssignment,
    PropertyReflection,
}

impl LocalizationModel {
    /// Parses `none`, `assignment` or `reflection`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(Self::None),
            "assignment" => Some(Self::PropertyAssignment),
            "reflection" => Some(Self::PropertyReflection),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// LocalizationEngine

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalizationEngine {
    model: LocalizationModel,
}

impl LocalizationEngine {
    pub const fn new(model: LocalizationModel) -> Self {
        Self { model }
    }

    #[inline]
    pub const fn model(&self) -> LocalizationModel {
        self.model
    }

    /// Returns `true` when `property` of `owner` goes through resources.
    ///
    /// Sub-objects serialized as content of another object and values that
    /// cannot be stored as a resource are never localized.
    pub fn is_localized(
        &self,
        manager: &SerializationManager<'_>,
        owner: ObjectId,
        property: &PropertyDescriptor,
        value: &Value,
    ) -> bool {
        if self.model == LocalizationModel::None || !property.is_localizable() {
            return false;
        }
        if manager.host().resources().is_none() {
            return false;
        }
        let in_content = manager
            .context()
            .get::<ExpressionContext>()
            .is_some_and(|c| c.is_preset(&Value::Object(owner)));
        if in_content {
            return false;
        }
        match value.as_object() {
            Some(object) => manager
                .host()
                .type_of(object)
                .is_some_and(|ty| manager.registry().flags(ty).contains(TypeFlags::SERIALIZABLE)),
            None => true,
        }
    }

    /// Serializes a localized property. Returns `false` when the property
    /// is not localized and must be serialized normally.
    pub(crate) fn serialize_property(
        &self,
        manager: &mut SerializationManager<'_>,
        owner: ObjectId,
        property: &PropertyDescriptor,
        value: &Value,
        target: &Expression,
        statements: &mut Vec<Statement>,
    ) -> Result<bool, SerializeError> {
        if !self.is_localized(manager, owner, property, value) {
            return Ok(false);
        }
        let reference = Expression::property(target.clone(), property.name());
        let context = ExpressionContext::new(reference.clone(), Some(property.ty()), Some(owner));

        match self.model {
            LocalizationModel::None => Ok(false),
            LocalizationModel::PropertyAssignment => {
                let lookup = manager.with_context(context, |m| {
                    m.serialize_to_resource_expression(value, false)
                })?;
                match lookup {
                    Some(lookup) => {
                        statements.push(Statement::assign(reference, lookup));
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            LocalizationModel::PropertyReflection => {
                let written = manager.with_context(context, |m| m.serialize_to_resource(value, false));
                if written.is_none() {
                    return Ok(false);
                }
                if manager.mark_localized(owner)
                    && let Some(name) = manager.resource_owner_name(owner)
                {
                    let resources = manager.resource_manager_expression();
                    statements.push(Statement::expression(Expression::invoke(
                        resources,
                        "ApplyResources",
                        vec![target.clone(), Expression::string(name)],
                    )));
                }
                Ok(true)
            }
        }
    }

    /// Switches the working culture of the host's resource store and
    /// reloads the design surface through `reload`.
    ///
    /// A failed reload is shown through the host's UI service and the
    /// previous culture is restored. Returns `true` when the switch
    /// succeeded.
    pub fn change_language(
        &self,
        host: &dyn DesignHost,
        culture: &str,
        reload: impl FnOnce() -> Result<(), DeserializeError>,
    ) -> bool {
        let Some(store) = host.resources() else {
            warn!("cannot switch to culture `{culture}` without a resource store");
            return false;
        };
        let previous = store.culture();
        if previous == culture {
            return true;
        }
        store.set_culture(culture);
        debug!("switched culture from `{previous}` to `{culture}`");

        match reload() {
            Ok(()) => true,
            Err(err) => {
                let message = format!("Failed to load culture `{culture}`: {err}");
                warn!("{message}");
                if let Some(ui) = host.ui() {
                    ui.show_error(&message);
                }
                store.set_culture(&previous);
                false
            }
        }
    }
}
