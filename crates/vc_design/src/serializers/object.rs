use alloc::vec;
use alloc::vec::Vec;

use log::trace;
use vc_codedom::{Expression, OrderHint, Statement, StatementKind};

use crate::Value;
use crate::context::{ExpressionContext, RootContext};
use crate::descriptor::{TypeDescriptor, TypeFlags};
use crate::dispatch::{CodeSerializer, Serialized};
use crate::error::{DeserializeError, HostError, SerializeError};
use crate::host::ObjectId;
use crate::manager::SerializationManager;
use crate::members;

use super::PrimitiveSerializer;

// -----------------------------------------------------------------------------
// Serializers

/// Sited components: a field on the root, its members and its events.
///
/// Results are cached per component between passes.
pub struct ComponentSerializer;

/// Any other object: a creation expression, or a local declaration
/// followed by its members.
pub struct DefaultSerializer;

impl CodeSerializer for ComponentSerializer {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        match value.as_object() {
            Some(object) => serialize_object(manager, object, true),
            None => PrimitiveSerializer.serialize(manager, value),
        }
    }
}

impl CodeSerializer for DefaultSerializer {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        match value.as_object() {
            Some(object) => serialize_object(manager, object, false),
            None => PrimitiveSerializer.serialize(manager, value),
        }
    }
}

// -----------------------------------------------------------------------------
// Serialization

fn serialize_object(
    manager: &mut SerializationManager<'_>,
    object: ObjectId,
    component: bool,
) -> Result<Serialized, SerializeError> {
    if component && let Some(statements) = manager.replay_cached(object) {
        return Ok(Serialized::Statements(statements));
    }
    let recording = component && manager.begin_entry(object);
    let result = build(manager, object, component);
    if recording {
        manager.end_entry(object, result.as_ref().ok());
    }
    result
}

fn build(
    manager: &mut SerializationManager<'_>,
    object: ObjectId,
    component: bool,
) -> Result<Serialized, SerializeError> {
    let registry = manager.registry();
    let ty = manager.type_of(object)?;
    let desc = registry
        .get(ty)
        .ok_or_else(|| HostError::UnknownType(registry.path_of(ty).into()))?;
    let mut statements = Vec::new();

    let reference = match manager.get_expression(object) {
        Some(existing) => {
            manager.set_expression(object, existing.clone(), false);
            existing
        }
        None => {
            let (creation, complete) = creation_expression(manager, object, desc, &mut statements)?;
            if complete && !component && statements.is_empty() {
                return Ok(Serialized::Expression(creation));
            }
            declare(manager, object, desc, component, creation, &mut statements)?
        }
    };

    let layout = component && desc.has(TypeFlags::CONTAINER);
    if layout {
        statements.push(
            Statement::expression(Expression::invoke(reference.clone(), "SuspendLayout", vec![]))
                .with_order(OrderHint::Begin),
        );
    }

    members::serialize_design_time(manager, object);
    members::serialize_properties(manager, object, &mut statements);
    members::serialize_events(manager, object, &mut statements);

    if layout {
        statements.push(
            Statement::expression(Expression::invoke(
                reference,
                "ResumeLayout",
                vec![Expression::bool(false)],
            ))
            .with_order(OrderHint::End),
        );
    }
    Ok(Serialized::Statements(statements))
}

/// The expression creating `object`, and whether it fully describes it.
fn creation_expression(
    manager: &mut SerializationManager<'_>,
    object: ObjectId,
    desc: &TypeDescriptor,
    statements: &mut Vec<Statement>,
) -> Result<(Expression, bool), SerializeError> {
    let ty = desc.type_ref();

    if desc.has(TypeFlags::NEEDS_CONTAINER)
        && let Some(container) = manager.host().container()
        && let Some(arg) = manager.serialize_to_expression(&Value::Object(container), statements)?
    {
        return Ok((Expression::create(ty, vec![arg]), false));
    }

    if let Some(ctor) = desc.constructor()
        && let Some(args) = constructor_args(manager, object, desc, ctor.params(), statements)
    {
        return Ok((Expression::create(ty, args), ctor.is_complete()));
    }

    if desc.has_default_constructor() {
        return Ok((Expression::create(ty, vec![]), false));
    }

    if desc.has(TypeFlags::SERIALIZABLE)
        && let Some(lookup) =
            manager.serialize_to_resource_expression(&Value::Object(object), false)?
    {
        return Ok((lookup, true));
    }

    Err(SerializeError::NoCreationExpression(desc.path().into()))
}

/// Constructor arguments read from the members the parameters map to.
/// `None` abandons the constructor shortcut.
fn constructor_args(
    manager: &mut SerializationManager<'_>,
    object: ObjectId,
    desc: &TypeDescriptor,
    params: &[alloc::string::String],
    statements: &mut Vec<Statement>,
) -> Option<Vec<Expression>> {
    let mut args = Vec::with_capacity(params.len());
    for param in params {
        let value = manager.host().get_value(object, param).ok()?;
        let ty = desc.property(param).map(|p| p.ty());
        let context = ExpressionContext::new(Expression::variable(param.as_str()), ty, Some(object));
        let arg = manager
            .with_context(context, |m| m.serialize_to_expression(&value, statements))
            .ok()??;
        args.push(arg);
    }
    Some(args)
}

/// Emits the statement binding `creation` to a name and returns the
/// expression referring to the object from now on.
fn declare(
    manager: &mut SerializationManager<'_>,
    object: ObjectId,
    desc: &TypeDescriptor,
    component: bool,
    creation: Expression,
    statements: &mut Vec<Statement>,
) -> Result<Expression, SerializeError> {
    let root = manager
        .context()
        .get::<RootContext>()
        .map(|r| r.expression().clone());

    if component
        && let Some(root) = root
        && manager.host().contains(object)
    {
        let name = manager
            .get_name(object)
            .ok_or_else(|| SerializeError::UnresolvedTarget(desc.path().into()))?;
        let reference = Expression::field(root, name);
        manager.set_expression(object, reference.clone(), false);
        statements.push(Statement::assign(reference.clone(), creation));
        return Ok(reference);
    }

    let name = manager.unique_name(object)?;
    let reference = Expression::variable(name.as_str());
    manager.set_expression(object, reference.clone(), false);
    statements.push(Statement::declare(desc.type_ref(), name, Some(creation)));
    Ok(reference)
}

// -----------------------------------------------------------------------------
// Deserialization

/// The name and initializer of a statement that introduces an object:
/// `this.name = ...`, `name = ...` or `T name = ...`.
pub(crate) fn creation_of(statement: &Statement) -> Option<(&str, &Expression)> {
    match statement.kind() {
        StatementKind::Assign {
            left: Expression::Field { target, name },
            right,
        } if **target == Expression::This => Some((name, right)),
        StatementKind::Assign {
            left: Expression::Variable(name),
            right,
        } => Some((name, right)),
        StatementKind::VariableDeclaration {
            name,
            init: Some(init),
            ..
        } => Some((name, init)),
        _ => None,
    }
}

/// Rebuilds an object from its statements.
///
/// The first creation statement produces the instance, whose members are
/// then reset to their defaults. Every other statement is interpreted;
/// failures are reported and the remaining statements still run.
pub(crate) fn deserialize_sequence(
    manager: &mut SerializationManager<'_>,
    statements: &[Statement],
) -> Result<Value, DeserializeError> {
    let mut instance = None;
    for statement in statements {
        if instance.is_none()
            && let Some((name, init)) = creation_of(statement)
        {
            let value = manager
                .deserialize_expression(Some(name), init)
                .map_err(|err| err.at(statement.line()))?;
            if let Some(object) = value.as_object() {
                manager.bind_name(object, name);
                reset_defaults(manager, object);
            }
            instance = Some(value);
            continue;
        }
        manager.interpret(statement);
    }
    instance.ok_or(DeserializeError::NoInstance)
}

/// Resets the browsable members of `object` to their defaults. Content
/// sub-objects are reset recursively and content lists are emptied.
pub(crate) fn reset_defaults(manager: &SerializationManager<'_>, object: ObjectId) {
    let host = manager.host();
    let Some(desc) = host.type_of(object).and_then(|ty| manager.registry().get(ty)) else {
        return;
    };
    for property in desc.properties() {
        if property.is_hidden() || !property.is_browsable() || property.is_design_only() {
            continue;
        }
        let Ok(current) = host.get_value(object, property.name()) else {
            continue;
        };
        let reset = if property.is_content() {
            match current {
                Value::Object(sub) => {
                    reset_defaults(manager, sub);
                    None
                }
                Value::List(items) if !items.is_empty() => Some(Value::List(Vec::new())),
                _ => None,
            }
        } else if property.is_read_only() {
            None
        } else {
            property
                .default_value()
                .filter(|default| **default != current)
                .cloned()
        };
        if let Some(value) = reset
            && let Err(err) = host.set_value(object, property.name(), value)
        {
            trace!("could not reset `{}`: {err}", property.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use vc_codedom::{Expression, OrderHint};

    use crate::Value;
    use crate::context::RootContext;
    use crate::dispatch::Serialized;
    use crate::fixtures;
    use crate::host::DesignHost;
    use crate::manager::SerializationManager;
    use crate::options::DesignerOptions;

    fn lines(result: Serialized) -> Vec<String> {
        match result {
            Serialized::Statements(statements) => statements.iter().map(|s| format!("{s}")).collect(),
            Serialized::Expression(expression) => vec![format!("{expression}")],
        }
    }

    fn serialize_in_root(demo: &fixtures::Demo, value: Value) -> Vec<String> {
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        let root = RootContext::new(Expression::This, demo.root);
        let result = manager.with_context(root, |m| m.serialize(&value)).unwrap();
        assert!(manager.diagnostics().is_empty(), "{:?}", manager.diagnostics());
        lines(result)
    }

    #[test]
    fn component_with_one_changed_property() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "Hello");

        assert_eq!(
            serialize_in_root(&demo, Value::Object(button)),
            [
                "this.button1 = new Demo.Button();",
                "this.button1.Text = \"Hello\";",
            ]
        );
    }

    #[test]
    fn content_sub_objects_are_walked_in_place() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let appearance = demo.host.get_value(button, "FlatAppearance").unwrap();
        demo.set(appearance.as_object().unwrap(), "BorderSize", 0_i64);

        assert_eq!(
            serialize_in_root(&demo, Value::Object(button)),
            [
                "this.button1 = new Demo.Button();",
                "this.button1.FlatAppearance.BorderSize = 0;",
            ]
        );
    }

    #[test]
    fn complete_constructors_are_expressions() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let point = demo
            .host
            .create_instance(demo.types.point, &[Value::from(3_i64), Value::from(4_i64)], None, false)
            .unwrap();
        demo.set(button, "Location", point);

        assert_eq!(
            serialize_in_root(&demo, Value::Object(button)),
            [
                "this.button1 = new Demo.Button();",
                "this.button1.Location = new Demo.Point(3, 4);",
            ]
        );
    }

    #[test]
    fn container_components_are_bracketed() {
        let demo = fixtures::demo();
        let panel = demo.add("panel1", demo.types.panel);
        let button = demo.add("button1", demo.types.button);
        demo.set(panel, "Controls", Value::List(vec![Value::Object(button)]));

        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        let root = RootContext::new(Expression::This, demo.root);
        let Serialized::Statements(statements) = manager
            .with_context(root, |m| m.serialize(&Value::Object(panel)))
            .unwrap()
        else {
            panic!("expected statements");
        };

        let orders: Vec<_> = statements.iter().map(|s| s.order()).collect();
        assert_eq!(orders.first(), Some(&OrderHint::Default));
        assert_eq!(orders.get(1), Some(&OrderHint::Begin));
        assert_eq!(orders.last(), Some(&OrderHint::End));
        let printed: Vec<String> = statements.iter().map(|s| format!("{s}")).collect();
        assert!(printed.contains(&String::from("this.panel1.Controls.Add(this.button1);")));
        assert!(printed.contains(&String::from("this.button1 = new Demo.Button();")));
        assert_eq!(printed.last().map(String::as_str), Some("this.panel1.ResumeLayout(false);"));
    }

    #[test]
    fn components_needing_a_container_receive_it() {
        let demo = fixtures::demo();
        let timer = demo.add("timer1", demo.types.timer);
        demo.set(timer, "Interval", 250_i64);

        let printed = serialize_in_root(&demo, Value::Object(timer));
        assert_eq!(
            printed,
            [
                "this.components = new System.ComponentModel.Container();",
                "this.timer1 = new Demo.Timer(this.components);",
                "this.timer1.Interval = 250;",
            ]
        );
    }

    #[test]
    fn sequences_reset_members_to_defaults() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "Stale");
        let options = DesignerOptions::default().with_recycle_instances(true, true);
        let mut manager = SerializationManager::new(&demo.host, &options);

        let statements = vec![
            vc_codedom::Statement::assign(
                Expression::field(Expression::This, "button1"),
                Expression::create("Demo.Button".into(), vec![]),
            ),
            vc_codedom::Statement::assign(
                Expression::property(Expression::field(Expression::This, "button1"), "TabIndex"),
                Expression::int(3),
            ),
        ];
        let root = RootContext::new(Expression::This, demo.root);
        let value = manager
            .with_context(root, |m| super::deserialize_sequence(m, &statements))
            .unwrap();

        assert_eq!(value, Value::Object(button));
        assert_eq!(demo.host.get_value(button, "Text"), Ok(Value::from("")));
        assert_eq!(demo.host.get_value(button, "TabIndex"), Ok(Value::from(3_i64)));
    }
}
