use crate::Value;
use crate::dispatch::{CodeSerializer, Serialized};
use crate::error::SerializeError;
use crate::manager::SerializationManager;

/// Resource manager objects, always written as the `resources` local.
pub struct ResourceManagerSerializer;

impl CodeSerializer for ResourceManagerSerializer {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        let expression = manager.resource_manager_expression();
        if let Some(object) = value.as_object() {
            manager.set_expression(object, expression.clone(), false);
        }
        Ok(Serialized::Expression(expression))
    }
}
