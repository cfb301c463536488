//! Demo control types shared by unit tests.

use crate::Value;
use crate::descriptor::{Assembly, ConstructorDescriptor, EventDescriptor, PropertyDescriptor};
use crate::descriptor::{TypeDescriptor, TypeFlags, TypeKey, TypeRegistry};
use crate::host::{DesignHost, MemoryHost, ObjectId};

pub(crate) const CONTROLS: &str = "Demo.Controls";
pub(crate) const APP: &str = "Demo.App";

#[derive(Clone, Copy, Debug)]
pub(crate) struct DemoTypes {
    pub anchor: TypeKey,
    pub dock: TypeKey,
    pub appearance: TypeKey,
    pub point: TypeKey,
    pub form: TypeKey,
    pub button: TypeKey,
    pub panel: TypeKey,
    pub label: TypeKey,
    pub timer: TypeKey,
    pub tooltip: TypeKey,
    pub strings: TypeKey,
    pub combo: TypeKey,
}

pub(crate) fn registry() -> (TypeRegistry, DemoTypes) {
    let mut registry = TypeRegistry::new();
    registry.register_assembly(Assembly::new(CONTROLS));
    registry.register_assembly(Assembly::new(APP).with_reference(CONTROLS));

    let anchor = registry.register(
        TypeDescriptor::enumeration("Demo.AnchorStyles", true)
            .with_variant("None", 0)
            .with_variant("Top", 1)
            .with_variant("Bottom", 2)
            .with_variant("Left", 4)
            .with_variant("Right", 8)
            .with_assembly(CONTROLS),
    );
    let dock = registry.register(
        TypeDescriptor::enumeration("Demo.DockStyle", false)
            .with_variant("None", 0)
            .with_variant("Top", 1)
            .with_variant("Bottom", 2)
            .with_variant("Fill", 5)
            .with_assembly(CONTROLS),
    );
    let appearance = registry.register(
        TypeDescriptor::new("Demo.FlatButtonAppearance", TypeFlags::empty())
            .with_property(PropertyDescriptor::new("BorderSize", TypeKey::INT).with_default(1_i64))
            .with_assembly(CONTROLS),
    );
    let point = registry.register(
        TypeDescriptor::new("Demo.Point", TypeFlags::SERIALIZABLE)
            .with_property(PropertyDescriptor::new("X", TypeKey::INT).with_default(0_i64))
            .with_property(PropertyDescriptor::new("Y", TypeKey::INT).with_default(0_i64))
            .with_constructor(ConstructorDescriptor::new(["X", "Y"]).complete())
            .with_assembly(CONTROLS),
    );
    let strings = registry.register(
        TypeDescriptor::new("Demo.StringCollection", TypeFlags::COLLECTION)
            .with_element(TypeKey::STRING)
            .with_assembly(CONTROLS),
    );

    let controls = || PropertyDescriptor::new("Controls", TypeKey::LIST).content().read_only();
    let text = || PropertyDescriptor::new("Text", TypeKey::STRING).with_default("").localizable();

    let form = registry.register(
        TypeDescriptor::new("Demo.Form", TypeFlags::COMPONENT | TypeFlags::CONTAINER)
            .with_property(text())
            .with_property(controls())
            .with_event(EventDescriptor::new("Load"))
            .with_assembly(APP),
    );
    let button = registry.register(
        TypeDescriptor::new("Demo.Button", TypeFlags::COMPONENT)
            .with_property(text())
            .with_property(
                PropertyDescriptor::new("AccessibleName", TypeKey::STRING)
                    .with_default("")
                    .localizable(),
            )
            .with_property(PropertyDescriptor::new("Enabled", TypeKey::BOOL).with_default(true))
            .with_property(PropertyDescriptor::new("TabIndex", TypeKey::INT).with_default(0_i64))
            .with_property(
                PropertyDescriptor::new("Anchor", anchor)
                    .with_default(Value::Enum { ty: anchor, bits: 5 }),
            )
            .with_property(
                PropertyDescriptor::new("Dock", dock).with_default(Value::Enum { ty: dock, bits: 0 }),
            )
            .with_property(PropertyDescriptor::new("FlatAppearance", appearance).content())
            .with_property(PropertyDescriptor::new("Location", point).with_default(Value::Null))
            .with_property(
                PropertyDescriptor::new("Locked", TypeKey::BOOL)
                    .with_default(false)
                    .design_only(),
            )
            .with_event(EventDescriptor::new("Click"))
            .with_event(EventDescriptor::new("MouseEnter"))
            .with_assembly(CONTROLS),
    );
    let panel = registry.register(
        TypeDescriptor::new("Demo.Panel", TypeFlags::COMPONENT | TypeFlags::CONTAINER)
            .with_property(controls())
            .with_property(
                PropertyDescriptor::new("Dock", dock).with_default(Value::Enum { ty: dock, bits: 0 }),
            )
            .with_assembly(CONTROLS),
    );
    let label = registry.register(
        TypeDescriptor::new("Demo.Label", TypeFlags::COMPONENT)
            .with_property(text())
            .with_assembly(CONTROLS),
    );
    let timer = registry.register(
        TypeDescriptor::new("Demo.Timer", TypeFlags::COMPONENT | TypeFlags::NEEDS_CONTAINER)
            .with_property(PropertyDescriptor::new("Interval", TypeKey::INT).with_default(100_i64))
            .with_property(PropertyDescriptor::new("Enabled", TypeKey::BOOL).with_default(false))
            .with_event(EventDescriptor::new("Tick"))
            .with_assembly(CONTROLS),
    );
    let tooltip = registry.register(
        TypeDescriptor::new(
            "Demo.ToolTip",
            TypeFlags::COMPONENT | TypeFlags::NEEDS_CONTAINER | TypeFlags::EXTENDER_PROVIDER,
        )
        .with_extender(PropertyDescriptor::new("ToolTip", TypeKey::STRING).with_default(""))
        .with_assembly(CONTROLS),
    );
    let combo = registry.register(
        TypeDescriptor::new("Demo.ComboBox", TypeFlags::COMPONENT)
            .with_property(PropertyDescriptor::new("Items", strings).content().read_only())
            .with_assembly(CONTROLS),
    );

    let types = DemoTypes {
        anchor,
        dock,
        appearance,
        point,
        form,
        button,
        panel,
        label,
        timer,
        tooltip,
        strings,
        combo,
    };
    (registry, types)
}

pub(crate) struct Demo {
    pub host: MemoryHost,
    pub root: ObjectId,
    pub types: DemoTypes,
}

impl Demo {
    pub fn add(&self, name: &str, ty: TypeKey) -> ObjectId {
        self.host.add_component(ty, name).unwrap()
    }

    pub fn set(&self, object: ObjectId, member: &str, value: impl Into<Value>) {
        self.host.set_value(object, member, value.into()).unwrap();
    }
}

/// A host holding an empty `Form1`.
pub(crate) fn demo() -> Demo {
    demo_with(|host| host)
}

pub(crate) fn demo_with(configure: impl FnOnce(MemoryHost) -> MemoryHost) -> Demo {
    let (registry, types) = registry();
    let host = configure(MemoryHost::new(registry));
    let root = host.create_root(types.form, "Form1").unwrap();
    Demo { host, root, types }
}
