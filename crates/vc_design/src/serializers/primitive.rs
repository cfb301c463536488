use vc_codedom::Expression;

use crate::Value;
use crate::dispatch::{CodeSerializer, Serialized};
use crate::error::SerializeError;
use crate::manager::SerializationManager;

/// Literals, type references and long strings.
///
/// Strings longer than the configured threshold are moved to the
/// resource store when the host has one.
pub struct PrimitiveSerializer;

impl CodeSerializer for PrimitiveSerializer {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        if let Value::Str(text) = value
            && text.chars().count() > manager.options().resource_string_threshold
            && let Some(lookup) = manager.serialize_to_resource_expression(value, true)?
        {
            return Ok(Serialized::Expression(lookup));
        }

        if let Value::Type(ty) = value {
            let registry = manager.registry();
            return match registry.get(*ty) {
                Some(desc) => Ok(Serialized::Expression(Expression::TypeOf(desc.type_ref()))),
                None => Err(SerializeError::UnserializableValue(registry.path_of(*ty).into())),
            };
        }

        match value.to_literal() {
            Some(literal) => Ok(Serialized::Expression(Expression::Primitive(literal))),
            None => Err(SerializeError::UnserializableValue(alloc::format!("{value:?}"))),
        }
    }
}
