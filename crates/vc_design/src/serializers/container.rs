use alloc::vec;

use log::trace;
use vc_codedom::{Expression, OrderHint, Statement};

use crate::Value;
use crate::context::RootContext;
use crate::dispatch::{CodeSerializer, DeserializeInput, Serialized};
use crate::error::{DeserializeError, HostError, SerializeError};
use crate::manager::SerializationManager;

use super::creation_of;

/// Field or local name of the component container.
pub(crate) const CONTAINER_NAME: &str = "components";

/// The component container handed to constructors of components that
/// need one.
///
/// Its creation statement is tagged [`OrderHint::Container`] so it runs
/// before any constructor refers to it.
pub struct ContainerSerializer;

impl CodeSerializer for ContainerSerializer {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        let Some(container) = value.as_object() else {
            return Err(SerializeError::UnserializableValue(alloc::format!("{value:?}")));
        };
        if let Some(existing) = manager.get_expression(container) {
            return Ok(Serialized::Expression(existing));
        }

        let ty = manager.type_of(container)?;
        let desc = manager
            .registry()
            .get(ty)
            .ok_or_else(|| HostError::UnknownType(manager.registry().path_of(ty).into()))?;
        let create = Expression::create(desc.type_ref(), vec![]);

        let root = manager.context().get::<RootContext>().map(|r| r.expression().clone());
        let (reference, statement) = match root {
            Some(root) => {
                let reference = Expression::field(root, CONTAINER_NAME);
                (reference.clone(), Statement::assign(reference, create))
            }
            None => (
                Expression::variable(CONTAINER_NAME),
                Statement::declare(desc.type_ref(), CONTAINER_NAME, Some(create)),
            ),
        };
        manager.bind_name(container, CONTAINER_NAME);
        manager.set_expression(container, reference, false);
        Ok(Serialized::Statements(vec![statement.with_order(OrderHint::Container)]))
    }

    /// Binds the declared name to the host's container instead of
    /// creating a second one.
    fn deserialize(
        &self,
        manager: &mut SerializationManager<'_>,
        input: DeserializeInput<'_>,
    ) -> Result<Value, DeserializeError> {
        let statements = match input {
            DeserializeInput::Statements(statements) => statements,
            DeserializeInput::Expression(expression) => {
                return manager.deserialize_expression(None, expression);
            }
        };
        let Some(container) = manager.host().container() else {
            return super::deserialize_sequence(manager, statements);
        };
        for statement in statements {
            match creation_of(statement) {
                Some((name, _)) => {
                    trace!("binding `{name}` to the host container");
                    manager.bind_name(container, name);
                }
                None => manager.interpret(statement),
            }
        }
        Ok(Value::Object(container))
    }
}
