use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use vc_codedom::{Expression, Statement, TypeRef};

use crate::Value;
use crate::context::{ExpressionContext, StatementContext};
use crate::descriptor::TypeKey;
use crate::dispatch::{CodeSerializer, Serialized};
use crate::error::SerializeError;
use crate::manager::SerializationManager;

/// Lists.
///
/// A list reached as the content of a read-only property is filled in
/// place with one `Add` call per item. Any other list becomes an array
/// creation of the collection's element type.
pub struct CollectionSerializer;

impl CodeSerializer for CollectionSerializer {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        let Value::List(items) = value else {
            return Err(SerializeError::UnserializableValue(format!("{value:?}")));
        };
        let context = manager.context().get::<ExpressionContext>().cloned();
        let element = element_type(manager, context.as_ref());

        match context {
            Some(context) if context.is_preset(value) => {
                let mut statements = Vec::new();
                let target = context.expression().clone();
                let item_context =
                    ExpressionContext::new(target.clone(), element, context.owner());
                for item in items {
                    let expression = manager.with_context(item_context.clone(), |m| {
                        m.serialize_to_expression(item, &mut statements)
                    });
                    match expression {
                        Ok(Some(expression)) => statements.push(Statement::expression(
                            Expression::invoke(target.clone(), "Add", vec![expression]),
                        )),
                        Ok(None) => manager.report(SerializeError::UnserializableValue(format!(
                            "{target}[{item:?}]"
                        ))),
                        Err(err) => manager.report(err),
                    }
                }
                Ok(Serialized::Statements(statements))
            }
            context => {
                let mut statements = Vec::new();
                let mut expressions = Vec::with_capacity(items.len());
                let item_context = context.map(|c| {
                    ExpressionContext::new(c.expression().clone(), element, c.owner())
                });
                for item in items {
                    let expression = match &item_context {
                        Some(frame) => manager.with_context(frame.clone(), |m| {
                            m.serialize_to_expression(item, &mut statements)
                        })?,
                        None => manager.serialize_to_expression(item, &mut statements)?,
                    };
                    expressions.push(expression.unwrap_or_else(Expression::null));
                }
                if !statements.is_empty() {
                    forward(manager, item_context.as_ref(), statements);
                }

                let registry = manager.registry();
                let element = element
                    .and_then(|ty| registry.get(ty))
                    .map(|desc| desc.type_ref())
                    .unwrap_or_else(|| TypeRef::new(registry.path_of(TypeKey::OBJECT)));
                Ok(Serialized::Expression(Expression::ArrayCreate {
                    ty: element,
                    items: expressions,
                }))
            }
        }
    }
}

/// Hands statements produced by array items to the slot of the object
/// owning the array.
fn forward(
    manager: &mut SerializationManager<'_>,
    context: Option<&ExpressionContext>,
    statements: Vec<Statement>,
) {
    let owner = context.and_then(ExpressionContext::owner);
    let slot = owner.and_then(|owner| {
        manager
            .context_mut()
            .get_mut::<StatementContext>()
            .and_then(|table| table.statements_mut(owner))
    });
    match slot {
        Some(slot) => slot.extend(statements),
        None => manager.report(SerializeError::UnserializableValue(format!(
            "array items needing {} statement(s)",
            statements.len()
        ))),
    }
}

/// The element type of the collection named by the expression context.
fn element_type(manager: &SerializationManager<'_>, context: Option<&ExpressionContext>) -> Option<TypeKey> {
    let ty = context.and_then(ExpressionContext::ty)?;
    manager.registry().get(ty).and_then(|desc| desc.element())
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::vec;
    use alloc::vec::Vec;

    use vc_codedom::Expression;

    use crate::Value;
    use crate::context::ExpressionContext;
    use crate::dispatch::Serialized;
    use crate::fixtures;
    use crate::manager::SerializationManager;
    use crate::options::DesignerOptions;

    fn lines(result: Serialized) -> Vec<alloc::string::String> {
        match result {
            Serialized::Statements(statements) => statements.iter().map(|s| format!("{s}")).collect(),
            Serialized::Expression(expression) => vec![format!("{expression}")],
        }
    }

    #[test]
    fn preset_lists_are_filled_in_place() {
        let demo = fixtures::demo();
        let combo = demo.add("comboBox1", demo.types.combo);
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        let items = Value::List(vec![Value::from("a"), Value::from("b")]);
        let target = Expression::property(Expression::field(Expression::This, "comboBox1"), "Items");
        let context = ExpressionContext::new(target, Some(demo.types.strings), Some(combo))
            .with_preset(items.clone());
        let result = manager.with_context(context, |m| m.serialize(&items)).unwrap();

        assert_eq!(
            lines(result),
            [
                "this.comboBox1.Items.Add(\"a\");",
                "this.comboBox1.Items.Add(\"b\");",
            ]
        );
    }

    #[test]
    fn other_lists_become_arrays() {
        let demo = fixtures::demo();
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        let items = Value::List(vec![Value::from(1_i64), Value::from(2_i64)]);
        assert_eq!(
            lines(manager.serialize(&items).unwrap()),
            ["new System.Object[] { 1, 2 }"]
        );

        let context = ExpressionContext::new(Expression::variable("x"), Some(demo.types.strings), None);
        let strings = Value::List(vec![Value::from("a")]);
        let result = manager.with_context(context, |m| m.serialize(&strings)).unwrap();
        assert_eq!(lines(result), ["new System.String[] { \"a\" }"]);

        assert_eq!(
            lines(manager.serialize(&Value::List(vec![])).unwrap()),
            ["new System.Object[0]"]
        );
    }
}
