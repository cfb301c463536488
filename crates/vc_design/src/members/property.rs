use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use log::trace;
use vc_codedom::{Expression, Statement};

use super::{BoundProperty, MemberSerializer, property_value};
use crate::Value;
use crate::context::{AbsoluteContext, ExpressionContext, MemberContext};
use crate::dispatch::Serialized;
use crate::error::SerializeError;
use crate::host::ObjectId;
use crate::manager::SerializationManager;

/// Property assignments.
///
/// Plain properties become `target.Name = value`, extended properties a
/// `provider.SetName(target, value)` call. Content properties are not
/// assigned; the object or list they hold is filled in place.
pub struct PropertySerializer;

impl MemberSerializer for PropertySerializer {
    type Member = BoundProperty;

    fn should_serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        owner: ObjectId,
        property: &BoundProperty,
    ) -> Result<bool, SerializeError> {
        let descriptor = property.descriptor();
        if descriptor.is_hidden() {
            return Ok(false);
        }
        if descriptor.is_content() {
            return Ok(true);
        }
        if descriptor.is_read_only() {
            return Ok(false);
        }
        if property.provider().is_none() && relationship(manager, owner, property).is_some() {
            return Ok(true);
        }
        let absolute = manager
            .context()
            .get::<AbsoluteContext>()
            .is_some_and(|a| a.applies_to(descriptor.name()));
        if absolute {
            return Ok(true);
        }
        let value = property_value(manager, owner, property)?;
        Ok(descriptor.should_serialize_value(&value))
    }

    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        owner: ObjectId,
        property: &BoundProperty,
        statements: &mut Vec<Statement>,
    ) -> Result<(), SerializeError> {
        manager.count_member();
        let context = MemberContext::new(owner, property.descriptor().clone());
        manager.with_context(context, |m| {
            if property.descriptor().is_content() {
                serialize_content(m, owner, property, statements)
            } else if let Some(provider) = property.provider() {
                serialize_extender(m, owner, provider, property, statements)
            } else {
                serialize_plain(m, owner, property, statements)
            }
        })
    }
}

/// The sibling member `owner.property` is bound to, when its expression
/// is known.
fn relationship(
    manager: &mut SerializationManager<'_>,
    owner: ObjectId,
    property: &BoundProperty,
) -> Option<Expression> {
    let related = manager
        .host()
        .relationships()?
        .relationship(owner, property.name())?;
    let target = manager.get_expression(related.owner)?;
    Some(Expression::property(target, related.member))
}

fn target_of(
    manager: &mut SerializationManager<'_>,
    owner: ObjectId,
    property: &BoundProperty,
) -> Result<Expression, SerializeError> {
    manager
        .get_expression(owner)
        .ok_or_else(|| SerializeError::UnresolvedTarget(String::from(property.name())))
}

fn serialize_plain(
    manager: &mut SerializationManager<'_>,
    owner: ObjectId,
    property: &BoundProperty,
    statements: &mut Vec<Statement>,
) -> Result<(), SerializeError> {
    let descriptor = property.descriptor();
    let target = target_of(manager, owner, property)?;
    let reference = Expression::property(target.clone(), descriptor.name());

    if let Some(related) = relationship(manager, owner, property) {
        manager.mark_tracking();
        statements.push(Statement::assign(reference, related));
        return Ok(());
    }

    let value = property_value(manager, owner, property)?;
    let engine = manager.localization();
    if engine.serialize_property(manager, owner, descriptor, &value, &target, statements)? {
        return Ok(());
    }

    let context = ExpressionContext::new(reference.clone(), Some(descriptor.ty()), Some(owner));
    let expression = manager
        .with_context(context, |m| m.serialize_to_expression(&value, statements))?
        .ok_or_else(|| SerializeError::UnserializableValue(String::from(descriptor.name())))?;
    statements.push(Statement::assign(reference, expression));
    Ok(())
}

fn serialize_extender(
    manager: &mut SerializationManager<'_>,
    owner: ObjectId,
    provider: ObjectId,
    property: &BoundProperty,
    statements: &mut Vec<Statement>,
) -> Result<(), SerializeError> {
    let name = property.name();
    let Some(target) = manager.get_expression(owner) else {
        trace!("extended `{name}` skipped: no expression for its target");
        return Ok(());
    };
    let Some(provider_expression) =
        manager.serialize_to_expression(&Value::Object(provider), statements)?
    else {
        trace!("extended `{name}` skipped: no expression for its provider");
        return Ok(());
    };
    manager.mark_tracking();

    let value = property_value(manager, owner, property)?;
    let getter = Expression::invoke(
        provider_expression.clone(),
        format!("Get{name}"),
        vec![target.clone()],
    );
    let context = ExpressionContext::new(getter, Some(property.descriptor().ty()), Some(owner));
    let expression = manager
        .with_context(context, |m| m.serialize_to_expression(&value, statements))?
        .ok_or_else(|| SerializeError::UnserializableValue(String::from(name)))?;

    statements.push(Statement::expression(Expression::invoke(
        provider_expression,
        format!("Set{name}"),
        vec![target, expression],
    )));
    Ok(())
}

fn serialize_content(
    manager: &mut SerializationManager<'_>,
    owner: ObjectId,
    property: &BoundProperty,
    statements: &mut Vec<Statement>,
) -> Result<(), SerializeError> {
    let descriptor = property.descriptor();
    let target = target_of(manager, owner, property)?;
    let reference = match property.provider() {
        Some(provider) => {
            let Some(provider_expression) =
                manager.serialize_to_expression(&Value::Object(provider), statements)?
            else {
                trace!("extended `{}` skipped: no expression for its provider", property.name());
                return Ok(());
            };
            manager.mark_tracking();
            Expression::invoke(
                provider_expression,
                format!("Get{}", property.name()),
                vec![target],
            )
        }
        None => Expression::property(target, descriptor.name()),
    };

    let value = property_value(manager, owner, property)?;
    if !matches!(value, Value::Object(_) | Value::List(_)) {
        return match property.provider() {
            Some(_) => Ok(()),
            None => serialize_plain(manager, owner, property, statements),
        };
    }

    let context = ExpressionContext::new(reference.clone(), Some(descriptor.ty()), Some(owner))
        .with_preset(value.clone());
    let result = manager.with_context(context, |m| {
        let serializer = m.select(&value).serializer();
        serializer.serialize(m, &value)
    })?;
    match result {
        Serialized::Statements(produced) => statements.extend(produced),
        Serialized::Expression(expression) if !descriptor.is_read_only() => {
            statements.push(Statement::assign(reference, expression));
        }
        Serialized::Expression(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;

    use vc_codedom::Expression;

    use crate::Value;
    use crate::context::{AbsoluteContext, RootContext};
    use crate::dispatch::Serialized;
    use crate::fixtures;
    use crate::host::{DesignHost, MemberRelationship, ObjectId, RelationshipService};
    use crate::manager::SerializationManager;
    use crate::members::{PropertySerializer, properties_of, serialize_member};
    use crate::options::DesignerOptions;

    fn serialize(
        demo: &fixtures::Demo,
        options: &DesignerOptions,
        object: ObjectId,
        absolute: bool,
    ) -> Vec<String> {
        let mut manager = SerializationManager::new(&demo.host, options);
        let depth = manager.push_context(RootContext::new(Expression::This, demo.root));
        manager.set_expression(demo.root, Expression::This, false);
        let result = match absolute {
            true => manager.with_context(AbsoluteContext::member("Enabled"), |m| {
                m.serialize(&Value::Object(object))
            }),
            false => manager.serialize(&Value::Object(object)),
        };
        manager.pop_context(depth);
        match result.unwrap() {
            Serialized::Statements(statements) => statements.iter().map(|s| format!("{s}")).collect(),
            Serialized::Expression(expression) => alloc::vec![format!("{expression}")],
        }
    }

    #[test]
    fn extended_properties_are_set_through_the_provider() {
        let demo = fixtures::demo();
        let tip = demo.add("toolTip1", demo.types.tooltip);
        let button = demo.add("button1", demo.types.button);
        demo.host
            .set_extended(tip, button, "ToolTip", Value::from("Press me"))
            .unwrap();

        let printed = serialize(&demo, &DesignerOptions::default(), button, false);
        assert!(printed.contains(&String::from(
            "this.toolTip1.SetToolTip(this.button1, \"Press me\");"
        )));
    }

    #[test]
    fn extended_properties_of_unresolved_targets_are_skipped() {
        let demo = fixtures::demo();
        let tip = demo.add("toolTip1", demo.types.tooltip);
        let button = demo.add("button1", demo.types.button);
        demo.host
            .set_extended(tip, button, "ToolTip", Value::from("Press me"))
            .unwrap();

        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        manager.set_expression(tip, Expression::field(Expression::This, "toolTip1"), false);
        let property = properties_of(&manager, button)
            .unwrap()
            .into_iter()
            .find(|p| p.provider() == Some(tip))
            .unwrap();

        let mut statements = Vec::new();
        serialize_member(&mut manager, &PropertySerializer, button, &property, &mut statements);
        assert!(statements.is_empty());
        assert!(manager.diagnostics().is_empty());
    }

    #[test]
    fn relationships_override_values() {
        let demo = fixtures::demo();
        let label = demo.add("label1", demo.types.label);
        let button = demo.add("button1", demo.types.button);
        demo.host.set_relationship(
            button,
            "Text",
            Some(MemberRelationship {
                owner: label,
                member: "Text".into(),
            }),
        );

        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        manager.set_expression(label, Expression::field(Expression::This, "label1"), false);
        let root = RootContext::new(Expression::This, demo.root);
        let result = manager.with_context(root, |m| m.serialize(&Value::Object(button))).unwrap();
        let Serialized::Statements(statements) = result else {
            panic!("expected statements");
        };
        let printed: Vec<String> = statements.iter().map(|s| format!("{s}")).collect();
        assert_eq!(
            printed,
            ["this.button1 = new Demo.Button();", "this.button1.Text = this.label1.Text;"]
        );
    }

    #[test]
    fn absolute_member_is_forced() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let printed = serialize(&demo, &DesignerOptions::default(), button, true);
        assert_eq!(
            printed,
            ["this.button1 = new Demo.Button();", "this.button1.Enabled = true;"]
        );
    }

    #[test]
    fn localized_by_assignment() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "Hello");
        let options = DesignerOptions::default()
            .with_localization(crate::localization::LocalizationModel::PropertyAssignment);

        let printed = serialize(&demo, &options, button, false);
        assert_eq!(
            printed,
            [
                "System.ComponentModel.ComponentResourceManager resources = \
                 new System.ComponentModel.ComponentResourceManager(typeof(Demo.Form));",
                "this.button1 = new Demo.Button();",
                "this.button1.Text = resources.GetString(\"button1.Text\");",
            ]
        );
    }

    #[test]
    fn reflection_applies_resources_once() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "Hello");
        demo.set(button, "AccessibleName", "Greeting");
        let options = DesignerOptions::default()
            .with_localization(crate::localization::LocalizationModel::PropertyReflection);

        let printed = serialize(&demo, &options, button, false);
        assert_eq!(
            printed,
            [
                "System.ComponentModel.ComponentResourceManager resources = \
                 new System.ComponentModel.ComponentResourceManager(typeof(Demo.Form));",
                "this.button1 = new Demo.Button();",
                "resources.ApplyResources(this.button1, \"button1\");",
            ]
        );
        assert_eq!(
            crate::host::ResourceStore::get(&demo.host, "", "button1.AccessibleName"),
            Some(Value::from("Greeting"))
        );
    }
}
