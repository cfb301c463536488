//! Evaluation of statement trees against the design host.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use log::trace;
use vc_codedom::{BinaryOp, Expression, Statement, StatementKind, TypeRef};

use crate::Value;
use crate::descriptor::{TypeFlags, TypeKey};
use crate::error::DeserializeError;
use crate::host::{ObjectId, ResourceStore, parent_culture};
use crate::manager::SerializationManager;

// -----------------------------------------------------------------------------
// StatementInterpreter

/// Executes statements and evaluates expressions during deserialization.
pub trait StatementInterpreter: Sync {
    fn interpret(
        &self,
        manager: &mut SerializationManager<'_>,
        statement: &Statement,
    ) -> Result<(), DeserializeError>;

    /// Evaluates `expression`. An object it creates is given `name`.
    fn evaluate(
        &self,
        manager: &mut SerializationManager<'_>,
        name: Option<&str>,
        expression: &Expression,
    ) -> Result<Value, DeserializeError>;
}

// -----------------------------------------------------------------------------
// CodeInterpreter

/// The interpreter for every statement and expression shape the
/// serializers produce.
#[derive(Clone, Copy, Debug, Default)]
pub struct CodeInterpreter;

impl StatementInterpreter for CodeInterpreter {
    fn interpret(
        &self,
        manager: &mut SerializationManager<'_>,
        statement: &Statement,
    ) -> Result<(), DeserializeError> {
        let result = match statement.kind() {
            StatementKind::VariableDeclaration {
                name,
                init: Some(init),
                ..
            } => self.bind(manager, name, init),
            StatementKind::VariableDeclaration { init: None, .. } | StatementKind::Comment(_) => {
                Ok(())
            }
            StatementKind::Assign { left, right } => self.assign(manager, left, right),
            StatementKind::Expression(expression) => {
                self.evaluate(manager, None, expression).map(drop)
            }
            StatementKind::AttachEvent {
                target,
                event,
                listener,
            } => self.attach(manager, target, event, Some(listener)),
            StatementKind::RemoveEvent { target, event, .. } => {
                self.attach(manager, target, event, None)
            }
        };
        result.map_err(|err| err.at(statement.line()))
    }

    fn evaluate(
        &self,
        manager: &mut SerializationManager<'_>,
        name: Option<&str>,
        expression: &Expression,
    ) -> Result<Value, DeserializeError> {
        match expression {
            Expression::Primitive(literal) => Ok(Value::from(literal)),
            Expression::This => manager
                .root()
                .map(Value::Object)
                .ok_or(DeserializeError::NoRootObject),
            Expression::Variable(variable) => manager
                .get_instance(variable)
                .map(Value::Object)
                .ok_or_else(|| DeserializeError::UndeclaredName(variable.clone())),
            Expression::Field { target, name: field } => match target.as_ref() {
                Expression::TypeReference(ty) => self.static_field(manager, ty, field),
                Expression::This => manager
                    .get_instance(field)
                    .map(Value::Object)
                    .ok_or_else(|| DeserializeError::UndeclaredName(field.clone())),
                other => {
                    let owner = self.evaluate_object(manager, other)?;
                    Ok(manager.host().get_value(owner, field)?)
                }
            },
            Expression::Property { target, name: property } => {
                let owner = self.evaluate_object(manager, target)?;
                Ok(manager.host().get_value(owner, property)?)
            }
            Expression::TypeReference(ty) | Expression::TypeOf(ty) => {
                Ok(Value::Type(resolve(manager, ty)?))
            }
            Expression::ObjectCreate { ty, args } => {
                let ty = resolve(manager, ty)?;
                let args = self.evaluate_all(manager, args)?;
                let object = manager.create_instance(ty, &args, name, name.is_some())?;
                Ok(Value::Object(object))
            }
            Expression::ArrayCreate { items, .. } => {
                Ok(Value::List(self.evaluate_all(manager, items)?))
            }
            Expression::Cast { ty, expr } => {
                let ty = resolve(manager, ty)?;
                let value = self.evaluate(manager, name, expr)?;
                convert(manager, ty, value)
            }
            Expression::Binary { left, op, right } => {
                let left = self.evaluate(manager, None, left)?;
                let right = self.evaluate(manager, None, right)?;
                binary(*op, left, right)
            }
            Expression::MethodInvoke {
                target,
                method,
                args,
            } => self.invoke(manager, target, method, args),
            Expression::DelegateCreate { ty, method, .. } => Err(DeserializeError::Unsupported(
                format!("delegate `{ty}` to `{method}` outside an event attachment"),
            )),
        }
    }
}

impl CodeInterpreter {
    fn evaluate_all(
        &self,
        manager: &mut SerializationManager<'_>,
        expressions: &[Expression],
    ) -> Result<Vec<Value>, DeserializeError> {
        expressions
            .iter()
            .map(|expression| self.evaluate(manager, None, expression))
            .collect()
    }

    fn evaluate_object(
        &self,
        manager: &mut SerializationManager<'_>,
        expression: &Expression,
    ) -> Result<ObjectId, DeserializeError> {
        let value = self.evaluate(manager, None, expression)?;
        value
            .as_object()
            .ok_or_else(|| DeserializeError::NotAnObject(describe(&value)))
    }

    fn bind(
        &self,
        manager: &mut SerializationManager<'_>,
        name: &str,
        init: &Expression,
    ) -> Result<(), DeserializeError> {
        let value = self.evaluate(manager, Some(name), init)?;
        if let Some(object) = value.as_object() {
            manager.bind_name(object, name);
        }
        Ok(())
    }

    fn assign(
        &self,
        manager: &mut SerializationManager<'_>,
        left: &Expression,
        right: &Expression,
    ) -> Result<(), DeserializeError> {
        match left {
            Expression::Field { target, name } if **target == Expression::This => {
                self.bind(manager, name, right)
            }
            Expression::Variable(name) => self.bind(manager, name, right),
            Expression::Field { target, name } | Expression::Property { target, name } => {
                let owner = self.evaluate_object(manager, target)?;
                let value = self.evaluate(manager, None, right)?;
                manager.host().set_value(owner, name, value)?;
                Ok(())
            }
            other => Err(DeserializeError::Unsupported(format!(
                "assignment to `{other}`"
            ))),
        }
    }

    fn static_field(
        &self,
        manager: &mut SerializationManager<'_>,
        ty: &TypeRef,
        field: &str,
    ) -> Result<Value, DeserializeError> {
        let key = resolve(manager, ty)?;
        let registry = manager.registry();
        let desc = registry
            .get(key)
            .ok_or_else(|| DeserializeError::TypeNotFound(ty.path().into()))?;
        if !desc.has(TypeFlags::ENUM) {
            return Err(DeserializeError::Unsupported(format!("static field `{ty}.{field}`")));
        }
        desc.variant(field)
            .map(|variant| Value::Enum {
                ty: key,
                bits: variant.value(),
            })
            .ok_or_else(|| DeserializeError::UndeclaredName(format!("{ty}.{field}")))
    }

    fn invoke(
        &self,
        manager: &mut SerializationManager<'_>,
        target: &Expression,
        method: &str,
        args: &[Expression],
    ) -> Result<Value, DeserializeError> {
        if let Expression::TypeReference(ty) = target {
            return Err(DeserializeError::Unsupported(format!("static call `{ty}.{method}`")));
        }

        // Collections reached through a property are written back whole.
        if let ("Add" | "AddRange", Expression::Property { target: owner, name }) = (method, target) {
            let owner = self.evaluate_object(manager, owner)?;
            let mut items = match manager.host().get_value(owner, name)? {
                Value::List(items) => items,
                Value::Null => Vec::new(),
                other => return Err(DeserializeError::NotAnObject(describe(&other))),
            };
            for value in self.evaluate_all(manager, args)? {
                match (method, value) {
                    ("AddRange", Value::List(more)) => items.extend(more),
                    (_, value) => items.push(value),
                }
            }
            manager.host().set_value(owner, name, Value::List(items))?;
            return Ok(Value::Null);
        }

        let object = self.evaluate_object(manager, target)?;
        let values = self.evaluate_all(manager, args)?;
        let flags = manager
            .host()
            .type_of(object)
            .map(|ty| manager.registry().flags(ty))
            .unwrap_or(TypeFlags::empty());

        if flags.contains(TypeFlags::RESOURCE_MANAGER) {
            return resource_call(manager, method, &values);
        }
        if flags.contains(TypeFlags::EXTENDER_PROVIDER) {
            if let Some(member) = method.strip_prefix("Set")
                && let [Value::Object(extendee), value] = values.as_slice()
            {
                manager
                    .host()
                    .set_extended(object, *extendee, member, value.clone())?;
                return Ok(Value::Null);
            }
            if let Some(member) = method.strip_prefix("Get")
                && let [Value::Object(extendee)] = values.as_slice()
            {
                return Ok(manager.host().get_extended(object, *extendee, member)?);
            }
        }
        Ok(manager.host().invoke(object, method, &values)?)
    }

    fn attach(
        &self,
        manager: &mut SerializationManager<'_>,
        target: &Expression,
        event: &str,
        listener: Option<&Expression>,
    ) -> Result<(), DeserializeError> {
        let object = self.evaluate_object(manager, target)?;
        let registry = manager.registry();
        let ty = manager.type_of(object)?;
        if registry.get(ty).and_then(|desc| desc.event(event)).is_none() {
            return Err(DeserializeError::UnknownEvent {
                ty: registry.path_of(ty).into(),
                event: event.into(),
            });
        }
        let Some(bindings) = manager.host().event_bindings() else {
            return Ok(());
        };
        match listener {
            None => bindings.bind(object, event, None),
            Some(Expression::DelegateCreate { target, method, .. })
                if matches!(target.as_ref(), Expression::This) =>
            {
                bindings.bind(object, event, Some(method.as_str()));
            }
            Some(other) => trace!("listener `{other}` is not a handler of the root"),
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn resolve(manager: &SerializationManager<'_>, ty: &TypeRef) -> Result<TypeKey, DeserializeError> {
    manager
        .resolve_type(ty.path())
        .ok_or_else(|| DeserializeError::TypeNotFound(ty.path().into()))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "a boolean".into(),
        Value::Char(_) => "a character".into(),
        Value::Int(_) => "an integer".into(),
        Value::Float(_) | Value::Double(_) => "a floating point number".into(),
        Value::Str(_) => "a string".into(),
        Value::Enum { .. } => "an enumeration value".into(),
        Value::Object(id) => format!("object {id}"),
        Value::List(_) => "a list".into(),
        Value::Type(_) => "a type".into(),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(f64::from(*v)),
        Value::Double(v) => Some(*v),
        Value::Char(c) => Some(f64::from(u32::from(*c))),
        Value::Enum { bits, .. } => Some(*bits as f64),
        _ => None,
    }
}

/// Converts a value to the type named by a cast.
fn convert(manager: &SerializationManager<'_>, ty: TypeKey, value: Value) -> Result<Value, DeserializeError> {
    let registry = manager.registry();
    let invalid = |value: &Value| DeserializeError::InvalidOperands {
        op: "cast",
        left: registry.path_of(ty).into(),
        right: describe(value),
    };
    let converted = if registry.flags(ty).contains(TypeFlags::ENUM) {
        value.as_int().map(|bits| Value::Enum { ty, bits })
    } else {
        match ty {
            TypeKey::INT => as_f64(&value).map(|v| Value::Int(v as i64)),
            TypeKey::FLOAT => as_f64(&value).map(|v| Value::Float(v as f32)),
            TypeKey::DOUBLE => as_f64(&value).map(Value::Double),
            TypeKey::CHAR => value
                .as_int()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(char::from_u32)
                .map(Value::Char),
            TypeKey::BOOL => value.as_bool().map(Value::Bool),
            _ => return Ok(value),
        }
    };
    converted.ok_or_else(|| invalid(&value))
}

/// Applies a binary operator.
///
/// Bitwise operators keep the enumeration type of an operand; mixed
/// integer and floating point arithmetic is done in `f64`.
fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, DeserializeError> {
    let invalid = |left: &Value, right: &Value| DeserializeError::InvalidOperands {
        op: op.symbol(),
        left: describe(left),
        right: describe(right),
    };

    match op {
        BinaryOp::BitwiseOr | BinaryOp::BitwiseAnd => {
            let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
                return Err(invalid(&left, &right));
            };
            let bits = match op {
                BinaryOp::BitwiseOr => a | b,
                _ => a & b,
            };
            Ok(match (&left, &right) {
                (Value::Enum { ty, .. }, _) | (_, Value::Enum { ty, .. }) => {
                    Value::Enum { ty: *ty, bits }
                }
                _ => Value::Int(bits),
            })
        }
        BinaryOp::BooleanOr | BinaryOp::BooleanAnd => {
            let (Some(a), Some(b)) = (left.as_bool(), right.as_bool()) else {
                return Err(invalid(&left, &right));
            };
            Ok(Value::Bool(match op {
                BinaryOp::BooleanOr => a || b,
                _ => a && b,
            }))
        }
        BinaryOp::ValueEquality | BinaryOp::IdentityEquality => Ok(Value::Bool(left == right)),
        BinaryOp::IdentityInequality => Ok(Value::Bool(left != right)),
        BinaryOp::LessThan
        | BinaryOp::LessThanOrEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanOrEqual => {
            let (Some(a), Some(b)) = (as_f64(&left), as_f64(&right)) else {
                return Err(invalid(&left, &right));
            };
            Ok(Value::Bool(match op {
                BinaryOp::LessThan => a < b,
                BinaryOp::LessThanOrEqual => a <= b,
                BinaryOp::GreaterThan => a > b,
                _ => a >= b,
            }))
        }
        BinaryOp::Add if matches!((&left, &right), (Value::Str(_), _) | (_, Value::Str(_))) => {
            match (&left, &right) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
                _ => Err(invalid(&left, &right)),
            }
        }
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulus => arithmetic(op, &left, &right).ok_or_else(|| {
            match (op, right.as_int(), &right) {
                (BinaryOp::Divide | BinaryOp::Modulus, Some(0), Value::Int(_)) => {
                    DeserializeError::DivisionByZero
                }
                _ => invalid(&left, &right),
            }
        }),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let (a, b) = (*a, *b);
        return match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Subtract => a.checked_sub(b),
            BinaryOp::Multiply => a.checked_mul(b),
            BinaryOp::Divide => a.checked_div(b),
            BinaryOp::Modulus => a.checked_rem(b),
            _ => None,
        }
        .map(Value::Int);
    }
    let (a, b) = (as_f64(left)?, as_f64(right)?);
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::Modulus => a % b,
        _ => return None,
    };
    Some(Value::Double(result))
}

// -----------------------------------------------------------------------------
// Resource manager calls

fn resource_call(
    manager: &mut SerializationManager<'_>,
    method: &str,
    args: &[Value],
) -> Result<Value, DeserializeError> {
    let Some(store) = manager.host().resources() else {
        return Err(DeserializeError::Unsupported(format!(
            "resource lookup `{method}` without a resource store"
        )));
    };
    match (method, args) {
        ("GetString" | "GetObject", [Value::Str(name)]) => {
            Ok(lookup(store, name).unwrap_or_default())
        }
        ("ApplyResources", [Value::Object(target), Value::Str(prefix)]) => {
            for (member, value) in applicable(store, prefix) {
                manager.host().set_value(*target, &member, value)?;
            }
            Ok(Value::Null)
        }
        _ => Err(DeserializeError::Unsupported(format!(
            "resource manager method `{method}`"
        ))),
    }
}

/// Cultures from the working one up to the invariant culture.
fn culture_chain(store: &dyn ResourceStore) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = Some(store.culture());
    while let Some(culture) = current {
        current = parent_culture(&culture).map(String::from);
        chain.push(culture);
    }
    chain
}

fn lookup(store: &dyn ResourceStore, name: &str) -> Option<Value> {
    culture_chain(store)
        .iter()
        .find_map(|culture| store.get(culture, name))
}

/// The `prefix.Member` resources of the working culture, falling back to
/// parent cultures member by member.
fn applicable(store: &dyn ResourceStore, prefix: &str) -> BTreeMap<String, Value> {
    let mut merged = BTreeMap::new();
    for culture in culture_chain(store).iter().rev() {
        for (name, value) in store.entries(culture) {
            let member = name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
                .filter(|member| !member.contains('.'));
            if let Some(member) = member {
                merged.insert(String::from(member), value);
            }
        }
    }
    merged
}
