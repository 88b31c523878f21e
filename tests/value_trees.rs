// tests/value_trees.rs
//! A small document model built through the facade crate.

use weft::weft_identity::{Identifier, IdentifierRegistry, Path, PathStep};
use weft::weft_tree::{ChangeFlags, ValueTreeRoot};
use weft::weft_types::{
    Optionality, SubtypeOrder, TypeRef, TypeSystem, TypeSystemConfig, Value, ValueHolder,
};

struct Model {
    ts: TypeSystem,
    registry: IdentifierRegistry,
}

impl Model {
    fn new() -> Self {
        let mut registry = IdentifierRegistry::new();
        let ts = TypeSystem::new(&mut registry, TypeSystemConfig::default()).unwrap();
        Self { ts, registry }
    }

    fn id(&mut self, name: &str) -> Identifier {
        self.registry.intern(name).unwrap()
    }

    /// `{ title: String, layers: Array<{ opacity: Int, blend: Enum }>[1, 8, 1] }`
    fn document(&mut self) -> TypeRef {
        let blend = [self.id("normal"), self.id("multiply"), self.id("screen")];
        let (opacity, mode, title, layers) = (
            self.id("opacity"),
            self.id("mode"),
            self.id("title"),
            self.id("layers"),
        );
        let b = self.ts.builtins();
        let layer = b.record([
            (opacity, b.int(0, 100, 100), Optionality::AlwaysActive),
            (mode, b.enum_of(blend, 0), Optionality::AlwaysActive),
        ]);
        b.record([
            (title, b.string(), Optionality::AlwaysActive),
            (layers, b.array(layer, 1, Some(8), 1), Optionality::AlwaysActive),
        ])
    }
}

fn path(steps: impl IntoIterator<Item = PathStep>) -> Path {
    let mut path = Path::root();
    for step in steps {
        path.push(step);
    }
    path
}

#[test]
fn editing_a_document() {
    let mut model = Model::new();
    let document = model.document();
    let layers = path([PathStep::field(model.id("layers"))]);
    let opacity = |index| {
        layers
            .join(PathStep::index(index))
            .join(PathStep::field(Identifier::new("opacity").unwrap()))
    };
    let ts = &model.ts;

    let mut root = ValueTreeRoot::new(ts, document).unwrap();
    root.insert_entries(ts, &layers, 1, 2).unwrap();
    assert_eq!(root.change_flags(), ChangeFlags::VALUE_CHANGED | ChangeFlags::STRUCTURE_CHANGED);
    root.clear_changes();

    root.back_up_value();
    let before = root.value().clone();
    root.set_value_at(ts, &opacity(2), ValueHolder::new(Value::Int(40)))
        .unwrap();

    // Only the spine down to the edited field is copied.
    let untouched = root.value_at(ts, &layers.join(PathStep::index(0))).unwrap();
    let Value::Record(old_fields) = &*before else {
        panic!("expected a record");
    };
    let old_layers = old_fields.get(&Identifier::new("layers").unwrap()).unwrap();
    assert!(untouched.ptr_eq(old_layers.as_array().unwrap().get(0).unwrap()));

    assert_eq!(root.reconcile_changes_from_backup(ts), ChangeFlags::VALUE_CHANGED);
    assert_eq!(root.value_at(ts, &opacity(2)).unwrap().as_int(), Some(40));
    assert_eq!(root.value_at(ts, &opacity(1)).unwrap().as_int(), Some(100));

    let err = root
        .set_value_at(ts, &opacity(0), ValueHolder::new(Value::Int(101)))
        .unwrap_err();
    assert!(matches!(err, weft::weft_tree::ModelError::InvalidValue { .. }));
}

#[test]
fn documents_survive_json() {
    let mut model = Model::new();
    let document = model.document();
    let ts = &model.ts;
    let root = ValueTreeRoot::new(ts, document.clone()).unwrap();

    let json = serde_json::to_string(root.value()).unwrap();
    let back: ValueHolder = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, root.value());

    let ty = ts.resolve(&document).unwrap();
    assert!(ty.is_valid_value(ts, &back));

    let text = serde_json::to_string(&document).unwrap();
    let parsed: TypeRef = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, document);
}

#[test]
fn wider_documents_accept_narrower_ones() {
    let mut model = Model::new();
    let narrow = model.document();
    let text = narrow.to_string().replace("[1, 8, 1]", "[0, -1, 1]");
    let wide = model.ts.parse_type_ref(&text).unwrap();

    assert_eq!(model.ts.compare_subtype(&narrow, &wide), SubtypeOrder::Subtype);

    let ts = &model.ts;
    let source = ValueTreeRoot::new(ts, narrow.clone()).unwrap();
    let mut target = ValueTreeRoot::new(ts, wide).unwrap();
    target.remove_entries(ts, &path([PathStep::field(Identifier::new("layers").unwrap())]), 0, 1)
        .unwrap();
    assert!(target.assign(ts, &narrow, source.value().clone()).unwrap());
    assert!(target.value().ptr_eq(source.value()));
}
