use alloc::vec::Vec;

use vc_codedom::{BinaryOp, Expression};

use crate::Value;
use crate::descriptor::TypeDescriptor;
use crate::dispatch::{CodeSerializer, Serialized};
use crate::error::{HostError, SerializeError};
use crate::manager::SerializationManager;

/// Enumeration values as named members.
///
/// A value matching a declared member is written as `Type.Member`. Flags
/// values are decomposed greedily in declaration order and joined with
/// `|`; several members are wrapped in a cast to the enumeration type.
/// Values no member describes are written as a cast numeric literal.
pub struct EnumSerializer;

impl CodeSerializer for EnumSerializer {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        let Value::Enum { ty, bits } = value else {
            return Err(SerializeError::UnserializableValue(alloc::format!("{value:?}")));
        };
        let registry = manager.registry();
        let desc = registry
            .get(*ty)
            .ok_or_else(|| HostError::UnknownType(registry.path_of(*ty).into()))?;
        Ok(Serialized::Expression(enum_expression(desc, *bits)))
    }
}

pub(crate) fn enum_expression(desc: &TypeDescriptor, bits: i64) -> Expression {
    let member = |name: &str| Expression::static_field(desc.type_ref(), name);

    if let Some(variant) = desc.variant_by_value(bits) {
        return member(variant.name());
    }

    if desc.has(crate::descriptor::TypeFlags::FLAGS) {
        let mut remaining = bits;
        let mut parts = Vec::new();
        for variant in desc.variants() {
            let value = variant.value();
            if value != 0 && value & remaining == value {
                parts.push(member(variant.name()));
                remaining &= !value;
            }
        }
        if remaining == 0 && !parts.is_empty() {
            if parts.len() == 1 {
                return parts.remove(0);
            }
            if let Some(chain) = Expression::chain(BinaryOp::BitwiseOr, parts) {
                return Expression::cast(desc.type_ref(), chain);
            }
        }
    }

    Expression::cast(desc.type_ref(), Expression::int(bits))
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use crate::Value;
    use crate::dispatch::Serialized;
    use crate::fixtures;
    use crate::manager::SerializationManager;
    use crate::options::DesignerOptions;

    fn print(value: Value) -> alloc::string::String {
        let demo = fixtures::demo();
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        match manager.serialize(&value) {
            Ok(Serialized::Expression(expression)) => format!("{expression}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn single_flag_is_a_bare_member() {
        let (_, types) = fixtures::registry();
        assert_eq!(print(Value::Enum { ty: types.anchor, bits: 1 }), "Demo.AnchorStyles.Top");
        assert_eq!(print(Value::Enum { ty: types.dock, bits: 5 }), "Demo.DockStyle.Fill");
    }

    #[test]
    fn combined_flags_are_cast() {
        let (_, types) = fixtures::registry();
        assert_eq!(
            print(Value::Enum { ty: types.anchor, bits: 1 | 4 | 8 }),
            "((Demo.AnchorStyles)(((Demo.AnchorStyles.Top | Demo.AnchorStyles.Left) | Demo.AnchorStyles.Right)))"
        );
    }

    #[test]
    fn unknown_values_are_cast_literals() {
        let (_, types) = fixtures::registry();
        assert_eq!(print(Value::Enum { ty: types.dock, bits: 42 }), "((Demo.DockStyle)(42))");
        assert_eq!(print(Value::Enum { ty: types.anchor, bits: 16 }), "((Demo.AnchorStyles)(16))");
    }
}
