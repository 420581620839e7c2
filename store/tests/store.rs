use altars_core::{BlockLocation, ItemDescriptor, KnownWorlds, WorldName};
use altars_store::{load_settings, DefinitionStore, Edit, Editor, Grants, StoreError};

#[test]
fn missing_files_open_as_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = DefinitionStore::open(dir.path().join("altars.toml")).expect("opens");
    assert!(store.catalog().altars.is_empty());
    assert!(store.records().is_empty());

    let report = load_settings(&dir.path().join("config.toml")).expect("defaults");
    assert!(report.diagnostics.is_empty());
}

#[test]
fn edits_survive_a_round_trip_on_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("data").join("altars.toml");
    let worlds: KnownWorlds = ["world"].into_iter().collect();
    let editor = Editor::new(Grants::all()).with_worlds(worlds);
    let center = BlockLocation::new(WorldName::new("world"), 10, 64, 10);
    let pedestal = BlockLocation::new(WorldName::new("world"), 12, 64, 10);
    let ember = ItemDescriptor::new("BLAZE_ROD")
        .with_display_name("Ember")
        .with_enchantment("FIRE_ASPECT", 2);

    let mut store = DefinitionStore::open(&path).expect("opens");
    for edit in [
        Edit::Create {
            name: "fire_altar".to_owned(),
        },
        Edit::SetCenter {
            name: "fire_altar".to_owned(),
            location: center,
        },
        Edit::AddPedestal {
            name: "fire_altar".to_owned(),
            location: pedestal,
        },
        Edit::SetCentralItem {
            name: "fire_altar".to_owned(),
            item: ItemDescriptor::new("NETHER_STAR"),
        },
        Edit::AddRequiredItem {
            name: "fire_altar".to_owned(),
            item: ember.clone(),
            amount: 1,
        },
    ] {
        let _ = editor.apply(store.catalog_mut(), edit).expect("edit applies");
    }
    store.save().expect("saved");

    let reopened = DefinitionStore::open(&path).expect("reopens");
    assert_eq!(reopened.path(), path.as_path());
    assert_eq!(reopened.catalog(), store.catalog());
    let record = &reopened.records()[0];
    assert_eq!(record.center.as_deref(), Some("world,10,64,10"));
    assert_eq!(record.pedestal_locations, vec!["world,12,64,10"]);
    assert_eq!(record.required_items, vec![Ok((ember, 1))]);
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("altars.toml");
    std::fs::write(&path, "[altars.broken\ncenter = ").expect("written");

    let error = DefinitionStore::open(&path).unwrap_err();
    assert!(matches!(error, StoreError::Parse { .. }), "{error:?}");
}
