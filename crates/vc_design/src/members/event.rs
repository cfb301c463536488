use alloc::string::String;
use alloc::vec::Vec;

use vc_codedom::{Expression, Statement};

use super::MemberSerializer;
use crate::descriptor::EventDescriptor;
use crate::error::SerializeError;
use crate::host::ObjectId;
use crate::manager::SerializationManager;

/// Event handler attachments, `target.Event += new Delegate(this.Handler)`.
pub struct EventSerializer;

impl MemberSerializer for EventSerializer {
    type Member = EventDescriptor;

    fn should_serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        owner: ObjectId,
        event: &EventDescriptor,
    ) -> Result<bool, SerializeError> {
        Ok(manager
            .host()
            .event_bindings()
            .and_then(|bindings| bindings.handler(owner, event.name()))
            .is_some())
    }

    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        owner: ObjectId,
        event: &EventDescriptor,
        statements: &mut Vec<Statement>,
    ) -> Result<(), SerializeError> {
        manager.count_member();
        let Some(handler) = manager
            .host()
            .event_bindings()
            .and_then(|bindings| bindings.handler(owner, event.name()))
        else {
            return Ok(());
        };
        let target = manager
            .get_expression(owner)
            .ok_or_else(|| SerializeError::UnresolvedTarget(String::from(event.name())))?;
        let listener = Expression::delegate(event.delegate().clone(), manager.root_expression(), handler);
        statements.push(Statement::attach_event(target, event.name(), listener));
        Ok(())
    }
}
