use log::debug;
use vc_codedom::Statement;

use super::{DeferredTable, SerializationManager};
use crate::Value;
use crate::descriptor::TypeKey;
use crate::dispatch::DeserializeInput;
use crate::host::ObjectId;
use crate::serializers::creation_of;

impl SerializationManager<'_> {
    /// Installs the statements of a load, materialized on lookup.
    pub(crate) fn begin_restore(&mut self, table: DeferredTable) {
        self.deferred = Some(table);
    }

    pub(crate) fn end_restore(&mut self) {
        self.deferred = None;
    }

    pub(super) fn resolve_deferred(&mut self, name: &str) -> Option<ObjectId> {
        let table = self.deferred.as_mut()?;
        let entry = table.take(name)?;
        let apply_defaults = table.apply_defaults();
        debug!("materializing `{name}`");

        let object = self.materialize(name, entry.ty, &entry.statements);
        if let (Some(object), Some(state)) = (object, entry.state.as_ref()) {
            crate::store::apply_state(self, object, state, apply_defaults);
        }
        object
    }

    fn materialize(
        &mut self,
        name: &str,
        ty: Option<TypeKey>,
        statements: &[Statement],
    ) -> Option<ObjectId> {
        // Statements of an object that already exists, such as the root.
        if let Some(existing) = self.names.object(name) {
            for statement in statements {
                self.interpret(statement);
            }
            return Some(existing);
        }

        let creates = statements.iter().any(|s| creation_of(s).is_some());
        match ty {
            Some(ty) if creates => {
                match self.deserialize(Some(ty), DeserializeInput::Statements(statements)) {
                    Ok(Value::Object(object)) => Some(object),
                    Ok(_) => None,
                    Err(err) => {
                        self.report(err);
                        None
                    }
                }
            }
            _ => {
                for statement in statements {
                    self.interpret(statement);
                }
                self.names
                    .object(name)
                    .or_else(|| self.host.component(name))
            }
        }
    }
}
