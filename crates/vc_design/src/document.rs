//! Whole design documents: the root object and every sited component,
//! written as one generated class and read back from it.

use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, warn};
use vc_codedom::{Expression, MemberField, TypeDeclaration};

use crate::Value;
use crate::assembler::StatementAssembler;
use crate::context::{RootContext, StatementContext};
use crate::descriptor::{TypeFlags, TypeKey};
use crate::error::{DeserializeError, SerializeError};
use crate::host::ObjectId;
use crate::manager::{DeferredObject, DeferredTable, SerializationManager};
use crate::serializers::reset_defaults;
use crate::statement_table::{fill_statement_table, local_type};

// -----------------------------------------------------------------------------
// Serialization

/// Generates the class of the document rooted at `root`.
///
/// Each sited component becomes a field. Its statements are collected in
/// its own slot, the root's members come last, and the assembler orders
/// the union. Failures of single components are reported and the rest of
/// the document is still generated.
pub fn serialize_document(
    manager: &mut SerializationManager<'_>,
    root: ObjectId,
) -> Result<TypeDeclaration, SerializeError> {
    let host = manager.host();
    let registry = manager.registry();
    let class_name = manager
        .get_name(root)
        .ok_or_else(|| SerializeError::UnresolvedTarget(String::from("this")))?;
    let root_type = manager.type_of(root)?;
    let mut declaration = TypeDeclaration::new(
        class_name.as_str(),
        registry
            .get(root_type)
            .map(|desc| desc.type_ref())
            .unwrap_or_else(|| registry.path_of(root_type).into()),
    );

    let components: Vec<ObjectId> = host
        .components()
        .into_iter()
        .filter(|&component| component != root)
        .collect();
    let container = host.container().filter(|_| {
        components.iter().any(|&component| {
            host.type_of(component)
                .is_some_and(|ty| registry.flags(ty).contains(TypeFlags::NEEDS_CONTAINER))
        })
    });

    let owners: Vec<ObjectId> = container
        .into_iter()
        .chain(components.iter().copied())
        .chain([root])
        .collect();
    let (loose, table) = manager.with_context(RootContext::new(Expression::This, root), |m| {
        m.with_frame(StatementContext::new(owners.iter().copied()), |m| {
            let mut loose = Vec::new();
            for &object in &owners {
                if let Err(err) = m.serialize_to_expression(&Value::Object(object), &mut loose) {
                    m.report(err);
                }
            }
            loose
        })
    });
    let table = table.unwrap_or_default();

    if !loose.is_empty() {
        warn!("{} statements were produced outside of any component", loose.len());
    }

    let mut assembler = StatementAssembler::new();
    assembler.extend(manager.take_prologue());
    for (_, statements) in table.into_statements() {
        assembler.extend(statements);
    }
    assembler.extend(loose);
    declaration.initialize = assembler.combine();

    if let Some(container) = container
        && manager.is_serialized(container, false)
        && let Some(name) = manager.get_name(container)
        && let Some(desc) = host.type_of(container).and_then(|ty| registry.get(ty))
    {
        declaration.fields.push(MemberField::new(desc.type_ref(), name));
    }
    for component in components {
        let Some(name) = host.component_name(component) else {
            continue;
        };
        if let Some(desc) = host.type_of(component).and_then(|ty| registry.get(ty)) {
            declaration.fields.push(MemberField::new(desc.type_ref(), name));
        }
    }

    debug!(
        "serialized `{}`: {} fields, {} statements",
        declaration.name,
        declaration.fields.len(),
        declaration.initialize.len()
    );
    Ok(declaration)
}

// -----------------------------------------------------------------------------
// Loading

/// Rebuilds the document described by `declaration` on top of the host's
/// root object, which is returned.
///
/// Statements are grouped by the object they act on and every group is
/// materialized on first lookup, so forward references between
/// components resolve. Statement failures are reported and loading goes
/// on.
pub fn load_document(
    manager: &mut SerializationManager<'_>,
    declaration: &TypeDeclaration,
) -> Result<ObjectId, DeserializeError> {
    let root = manager.host().root().ok_or(DeserializeError::NoRootObject)?;
    manager.bind_name(root, &declaration.name);
    let depth = manager.push_context(RootContext::new(Expression::This, root));

    let table = fill_statement_table(&declaration.initialize, &declaration.name);
    let mut deferred = DeferredTable::new(false);
    let mut names = Vec::with_capacity(table.len());
    for (name, statements) in table {
        let ty = declared_type(manager, declaration, &name, &statements);
        names.push(name.clone());
        deferred.insert(name, DeferredObject {
            ty,
            statements,
            state: None,
        });
    }

    manager.begin_restore(deferred);
    reset_defaults(manager, root);
    for name in &names {
        if manager.get_instance(name).is_none() {
            manager.report(DeserializeError::UndeclaredName(name.clone()));
        }
    }
    manager.end_restore();
    manager.pop_context(depth);

    debug!("loaded `{}` from {} statements", declaration.name, declaration.initialize.len());
    Ok(root)
}

/// The type of a name: its field, or the local declaration among its
/// statements.
fn declared_type(
    manager: &SerializationManager<'_>,
    declaration: &TypeDeclaration,
    name: &str,
    statements: &[vc_codedom::Statement],
) -> Option<TypeKey> {
    let ty = declaration
        .field_type(name)
        .or_else(|| local_type(statements, name))?;
    let key = manager.resolve_type(ty.path());
    if key.is_none() {
        warn!("type `{ty}` of `{name}` could not be resolved");
    }
    key
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{load_document, serialize_document};
    use crate::Value;
    use crate::cache::ComponentCache;
    use crate::fixtures;
    use crate::host::{DesignHost, EventBindingService, MemoryHost, ResourceStore};
    use crate::localization::LocalizationModel;
    use crate::manager::SerializationManager;
    use crate::options::DesignerOptions;

    fn sample(demo: &fixtures::Demo) {
        let panel = demo.add("panel1", demo.types.panel);
        let button = demo.add("button1", demo.types.button);
        let timer = demo.add("timer1", demo.types.timer);
        demo.set(button, "Text", "OK");
        demo.set(button, "TabIndex", 2_i64);
        demo.set(panel, "Controls", Value::List(vec![Value::Object(button)]));
        demo.set(demo.root, "Controls", Value::List(vec![Value::Object(panel)]));
        demo.set(demo.root, "Text", "Main");
        demo.set(timer, "Interval", 500_i64);
        demo.host.bind(button, "Click", Some("button1_Click"));
    }

    fn generate(host: &MemoryHost, options: &DesignerOptions) -> (Vec<String>, Vec<String>) {
        let mut manager = SerializationManager::new(host, options);
        let root = host.root().unwrap();
        let declaration = serialize_document(&mut manager, root).unwrap();
        assert!(manager.diagnostics().is_empty(), "{:?}", manager.diagnostics());
        let fields = declaration.fields.iter().map(|f| f.name.clone()).collect();
        let lines = declaration.initialize.iter().map(ToString::to_string).collect();
        (fields, lines)
    }

    #[test]
    fn document_statements_are_ordered() {
        let demo = fixtures::demo();
        sample(&demo);
        let (fields, lines) = generate(&demo.host, &DesignerOptions::default());

        assert_eq!(fields, ["components", "panel1", "button1", "timer1"]);
        assert_eq!(lines, [
            "this.components = new System.ComponentModel.Container();",
            "this.panel1 = new Demo.Panel();",
            "this.button1 = new Demo.Button();",
            "this.timer1 = new Demo.Timer(this.components);",
            "this.panel1.SuspendLayout();",
            "this.SuspendLayout();",
            "this.panel1.Controls.Add(this.button1);",
            "this.button1.TabIndex = 2;",
            "this.button1.Text = \"OK\";",
            "this.button1.Click += new System.EventHandler(this.button1_Click);",
            "this.timer1.Interval = 500;",
            "this.Controls.Add(this.panel1);",
            "this.Text = \"Main\";",
            "this.panel1.ResumeLayout(false);",
            "this.ResumeLayout(false);",
        ]);
    }

    #[test]
    fn documents_load_into_a_fresh_host() {
        let demo = fixtures::demo();
        sample(&demo);
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        let declaration = serialize_document(&mut manager, demo.root).unwrap();

        let target = fixtures::demo();
        let mut manager = SerializationManager::new(&target.host, &options);
        let root = load_document(&mut manager, &declaration).unwrap();
        assert!(manager.diagnostics().is_empty(), "{:?}", manager.diagnostics());

        let button = target.host.component("button1").unwrap();
        let panel = target.host.component("panel1").unwrap();
        let timer = target.host.component("timer1").unwrap();
        assert_eq!(target.host.get_value(button, "Text"), Ok(Value::from("OK")));
        assert_eq!(target.host.get_value(timer, "Interval"), Ok(Value::from(500_i64)));
        assert_eq!(
            target.host.get_value(panel, "Controls"),
            Ok(Value::List(vec![Value::Object(button)]))
        );
        assert_eq!(target.host.get_value(root, "Text"), Ok(Value::from("Main")));
        assert_eq!(target.host.handler(button, "Click").as_deref(), Some("button1_Click"));

        // The reloaded graph generates the same code.
        let (_, original) = generate(&demo.host, &options);
        let (_, reloaded) = generate(&target.host, &options);
        assert_eq!(original, reloaded);
    }

    #[test]
    fn reloading_the_same_host_is_idempotent() {
        let demo = fixtures::demo();
        sample(&demo);
        let options = DesignerOptions::default().with_recycle_instances(true, true);
        let (_, before) = generate(&demo.host, &options);

        let mut manager = SerializationManager::new(&demo.host, &options);
        let declaration = serialize_document(&mut manager, demo.root).unwrap();
        for _ in 0..2 {
            let mut manager = SerializationManager::new(&demo.host, &options);
            load_document(&mut manager, &declaration).unwrap();
            assert!(manager.diagnostics().is_empty(), "{:?}", manager.diagnostics());
        }

        let (_, after) = generate(&demo.host, &options);
        assert_eq!(before, after);
    }

    #[test]
    fn cached_components_are_replayed() {
        let demo = fixtures::demo();
        sample(&demo);
        let options = DesignerOptions::default();
        let mut cache = ComponentCache::new(&options);
        demo.host.drain_changes();

        let first = {
            let mut manager = SerializationManager::new(&demo.host, &options).with_cache(&mut cache);
            let declaration = serialize_document(&mut manager, demo.root).unwrap();
            let stats = manager.statistics();
            assert_eq!(stats.cache_hits, 0);
            assert!(stats.members_serialized > 0);
            declaration
        };
        assert!(!cache.is_empty());
        // Serializing does not touch the design surface.
        assert!(demo.host.drain_changes().is_empty());

        let mut manager = SerializationManager::new(&demo.host, &options).with_cache(&mut cache);
        let second = serialize_document(&mut manager, demo.root).unwrap();
        let stats = manager.statistics();
        assert_eq!(stats.members_serialized, 0);
        assert_eq!(stats.cache_misses, 0);
        assert!(stats.cache_hits >= 4);
        assert_eq!(first, second);
    }

    #[test]
    fn changed_components_are_regenerated() {
        let demo = fixtures::demo();
        sample(&demo);
        let options = DesignerOptions::default();
        let mut cache = ComponentCache::new(&options);
        {
            let mut manager = SerializationManager::new(&demo.host, &options).with_cache(&mut cache);
            serialize_document(&mut manager, demo.root).unwrap();
        }
        demo.host.drain_changes();

        let button = demo.host.component("button1").unwrap();
        demo.set(button, "Text", "Cancel");
        cache.apply(&demo.host, &demo.host.drain_changes());
        assert!(cache.get(button).is_none());

        let mut manager = SerializationManager::new(&demo.host, &options).with_cache(&mut cache);
        let declaration = serialize_document(&mut manager, demo.root).unwrap();
        let lines: Vec<String> = declaration.initialize.iter().map(ToString::to_string).collect();
        assert!(lines.contains(&String::from("this.button1.Text = \"Cancel\";")));
        assert!(manager.statistics().cache_misses >= 1);
    }

    #[test]
    fn localized_documents_round_trip_through_resources() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "Hello");
        demo.set(button, "AccessibleName", "Greeting");
        let options = DesignerOptions::default().with_localization(LocalizationModel::PropertyReflection);

        let mut manager = SerializationManager::new(&demo.host, &options);
        let declaration = serialize_document(&mut manager, demo.root).unwrap();
        let lines: Vec<String> = declaration.initialize.iter().map(ToString::to_string).collect();
        let applies = lines.iter().filter(|l| l.contains("ApplyResources")).count();
        assert_eq!(applies, 1);
        assert_eq!(
            lines.first().map(String::as_str),
            Some(
                "System.ComponentModel.ComponentResourceManager resources = \
                 new System.ComponentModel.ComponentResourceManager(typeof(Demo.Form));"
            )
        );
        assert_eq!(demo.host.get("", "button1.Text"), Some(Value::from("Hello")));

        demo.set(button, "Text", "Changed");
        let mut manager = SerializationManager::new(&demo.host, &options.clone().with_recycle_instances(true, true));
        load_document(&mut manager, &declaration).unwrap();
        assert!(manager.diagnostics().is_empty(), "{:?}", manager.diagnostics());
        assert_eq!(demo.host.get_value(button, "Text"), Ok(Value::from("Hello")));
        assert_eq!(demo.host.get_value(button, "AccessibleName"), Ok(Value::from("Greeting")));
    }
}
