use altars_core::{
    AltarName, AltarRecord, BlockLocation, Command, Event, ItemDescriptor, ItemStack, KnownWorlds,
    Notice, PlayerId, PlayerRef, Settings, WorldName,
};
use altars_world::{self as world, query, World};

#[test]
fn placing_required_items_makes_the_altar_ready() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");

    let events = interact(&mut world, &alice, pedestal(0), Some(ember(3)));
    assert!(
        events.iter().any(|event| matches!(
            event,
            Event::ItemPlaced {
                feeds_readiness: true,
                ..
            }
        )),
        "placement should feed readiness: {events:?}"
    );
    assert!(events.contains(&Event::HeldItemConsumed {
        player: alice.id(),
        amount: 1
    }));
    assert!(!is_ready(&world), "one of two embers placed");

    let _ = interact(&mut world, &alice, pedestal(1), Some(ember(2)));
    assert!(is_ready(&world), "both embers placed");
    assert_eq!(query::ready_centers(&world), vec![center()]);
}

#[test]
fn surplus_items_keep_the_altar_ready() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    for index in 0..2 {
        let _ = interact(&mut world, &alice, pedestal(index), Some(ember(1)));
    }
    assert!(is_ready(&world));

    let events = interact(&mut world, &alice, pedestal(2), Some(ember(1)));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ItemPlaced { feeds_readiness: true, .. })));
    assert!(is_ready(&world), "a third ember keeps the altar ready");

    let events = interact(&mut world, &alice, center(), Some(star()));
    let ceremony = events
        .iter()
        .find_map(|event| match event {
            Event::SummoningStarted { ceremony, .. } => Some(ceremony.len()),
            _ => None,
        })
        .expect("ritual started");
    assert_eq!(ceremony, 4, "three embers and the star");
}

#[test]
fn display_floats_below_the_configured_pedestal_height() {
    let mut world = world_with(vec![shrine_record()]);
    let events = interact(&mut world, &player(1, "alice"), pedestal(0), Some(ember(1)));
    let position = events
        .iter()
        .find_map(|event| match event {
            Event::DisplaySpawned { at, .. } => Some(at.point()),
            _ => None,
        })
        .expect("display spawned");
    let expected = pedestal(0).offset(0.5, 1.0, 0.5).point();
    assert!((position - expected).length() < 1e-9, "{position:?}");
}

#[test]
fn central_item_starts_a_ritual_with_every_placed_item() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    let _ = interact(&mut world, &alice, pedestal(0), Some(ember(1)));
    let _ = interact(&mut world, &alice, pedestal(1), Some(ember(1)));
    let _ = interact(&mut world, &alice, pedestal(2), Some(dirt()));

    let events = interact(&mut world, &alice, center(), Some(star()));

    let (summoner, ceremony) = events
        .iter()
        .find_map(|event| match event {
            Event::SummoningStarted {
                summoner, ceremony, ..
            } => Some((summoner.clone(), ceremony.clone())),
            _ => None,
        })
        .expect("ritual started");
    assert_eq!(summoner, alice);
    let items: Vec<&str> = ceremony.iter().map(|c| c.item.material()).collect();
    assert_eq!(items, vec!["BLAZE_ROD", "BLAZE_ROD", "DIRT", "NETHER_STAR"]);
    assert!(query::is_summoning(&world, &AltarName::new("shrine")));
    assert!(
        query::placement_at(&world, &pedestal(0)).is_none(),
        "placements move to the ritual"
    );
    assert!(query::ready_centers(&world).is_empty(), "summoning altars never pulse");
}

#[test]
fn central_item_before_requirements_reports_not_ready() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    let _ = interact(&mut world, &alice, pedestal(0), Some(ember(1)));

    let events = interact(&mut world, &alice, center(), Some(star()));
    assert_eq!(events, vec![notice(&alice, Notice::NotReady)]);
    assert!(!query::is_summoning(&world, &AltarName::new("shrine")));
}

#[test]
fn other_items_on_the_center_are_wrong() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    let events = interact(&mut world, &alice, center(), Some(ember(1)));
    assert_eq!(events, vec![notice(&alice, Notice::WrongItem)]);
}

#[test]
fn empty_hands_do_nothing_on_empty_slots() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    assert!(interact(&mut world, &alice, pedestal(0), None).is_empty());
    let air = ItemStack::new(ItemDescriptor::new("AIR"), 1);
    assert!(interact(&mut world, &alice, center(), Some(air)).is_empty());
}

#[test]
fn altars_without_requirements_summon_immediately() {
    let mut record = AltarRecord::named("bare");
    record.center = Some("world,50,64,50".to_owned());
    record.central_item = Some(Ok(star_descriptor()));
    let mut world = world_with(vec![record]);

    let alice = player(1, "alice");
    let events = interact(&mut world, &alice, block(50, 64, 50), Some(star()));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::SummoningStarted { ceremony, .. } if ceremony.len() == 1)));
}

#[test]
fn only_one_ritual_runs_per_altar() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    let bob = player(2, "bob");
    let _ = interact(&mut world, &alice, pedestal(0), Some(ember(1)));
    let _ = interact(&mut world, &alice, pedestal(1), Some(ember(1)));
    let _ = interact(&mut world, &alice, center(), Some(star()));

    let events = interact(&mut world, &bob, center(), Some(star()));
    assert_eq!(events, vec![notice(&bob, Notice::AlreadySummoning)]);
    let events = interact(&mut world, &bob, pedestal(2), Some(ember(1)));
    assert_eq!(events, vec![notice(&bob, Notice::AlreadySummoning)]);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ReleaseAltar {
            altar: AltarName::new("shrine"),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::AltarReleased {
            altar: AltarName::new("shrine")
        }]
    );
    assert!(!query::is_summoning(&world, &AltarName::new("shrine")));
}

#[test]
fn theft_prevention_protects_placed_items() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    let bob = player(2, "bob");
    let _ = interact(&mut world, &alice, pedestal(0), Some(ember(1)));

    let events = interact(&mut world, &bob, pedestal(0), Some(ember(1)));
    assert_eq!(events, vec![notice(&bob, Notice::NotYourItem)]);
    assert!(query::placement_at(&world, &pedestal(0)).is_some());

    let events = interact(&mut world, &alice, pedestal(0), None);
    assert!(events.contains(&Event::ItemRetrieved {
        altar: AltarName::new("shrine"),
        player: alice.id(),
        location: pedestal(0),
        item: ember_descriptor(),
    }));
    assert!(query::placement_at(&world, &pedestal(0)).is_none());
}

#[test]
fn anyone_may_retrieve_when_theft_is_allowed() {
    let mut world = world_with(vec![shrine_record()]);
    let mut settings = Settings::default();
    settings.altar.prevent_item_theft = false;
    let mut events = Vec::new();
    world::apply(&mut world, Command::Configure { settings }, &mut events);

    let alice = player(1, "alice");
    let bob = player(2, "bob");
    let _ = interact(&mut world, &alice, pedestal(0), Some(ember(1)));
    let events = interact(&mut world, &bob, pedestal(0), None);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ItemRetrieved { player, .. } if *player == bob.id())));
}

#[test]
fn reload_refunds_items_on_slots_that_disappeared() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    let _ = interact(&mut world, &alice, pedestal(0), Some(ember(1)));
    let _ = interact(&mut world, &alice, pedestal(1), Some(ember(1)));

    let mut trimmed = shrine_record();
    trimmed.pedestal_locations.truncate(1);
    let events = load(&mut world, vec![trimmed]);

    let refunds: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::ItemReturned { .. }))
        .collect();
    assert_eq!(refunds.len(), 1, "{events:?}");
    assert!(query::placement_at(&world, &pedestal(0)).is_some());
    assert!(query::placement_at(&world, &pedestal(1)).is_none());
}

#[test]
fn dormant_altars_protect_blocks_without_reacting() {
    let mut record = shrine_record();
    record.center = Some("not_set".to_owned());
    let mut world = world_with(vec![record]);

    assert!(query::is_claimed_block(&world, &pedestal(0)));
    assert!(!query::is_claimed_block(&world, &block(99, 64, 99)));
    assert!(interact(&mut world, &player(1, "alice"), pedestal(0), Some(ember(1))).is_empty());
    assert!(!query::diagnostics(&world).has_errors());
}

#[test]
fn shutdown_removes_everything_without_refunds() {
    let mut world = world_with(vec![shrine_record()]);
    let alice = player(1, "alice");
    let _ = interact(&mut world, &alice, pedestal(2), Some(dirt()));
    let _ = interact(&mut world, &alice, pedestal(0), Some(ember(1)));
    let _ = interact(&mut world, &alice, pedestal(1), Some(ember(1)));
    let _ = interact(&mut world, &alice, center(), Some(star()));

    let mut events = Vec::new();
    world::apply(&mut world, Command::Shutdown, &mut events);

    let removed = events
        .iter()
        .filter(|event| matches!(event, Event::DisplayRemoved { .. }))
        .count();
    assert_eq!(removed, 4, "three pedestal displays and the central display");
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ItemReturned { .. })));
    assert_eq!(events.last(), Some(&Event::ShutDown));
    assert!(!query::is_summoning(&world, &AltarName::new("shrine")));
}

fn world_with(records: Vec<AltarRecord>) -> World {
    let mut world = World::new();
    let _ = load(&mut world, records);
    world
}

fn load(world: &mut World, records: Vec<AltarRecord>) -> Vec<Event> {
    let mut events = Vec::new();
    let worlds: KnownWorlds = ["world"].into_iter().collect();
    world::apply(world, Command::LoadAltars { records, worlds }, &mut events);
    events
}

fn interact(
    world: &mut World,
    player: &PlayerRef,
    location: BlockLocation,
    held: Option<ItemStack>,
) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Interact {
            player: player.clone(),
            location,
            held,
        },
        &mut events,
    );
    events
}

fn is_ready(world: &World) -> bool {
    let altar = query::altar(world, &AltarName::new("shrine")).expect("shrine loaded");
    query::is_ready(world, altar)
}

fn shrine_record() -> AltarRecord {
    let mut record = AltarRecord::named("shrine");
    record.center = Some("world,0,64,0".to_owned());
    record.central_item = Some(Ok(star_descriptor()));
    record.required_items = vec![Ok((ember_descriptor(), 2))];
    record.pedestal_locations = (0..3).map(|i| pedestal(i).encode()).collect();
    record
}

fn notice(player: &PlayerRef, notice: Notice) -> Event {
    Event::Notified {
        player: player.id(),
        notice,
    }
}

fn player(id: u128, name: &str) -> PlayerRef {
    PlayerRef::new(PlayerId::new(id), name)
}

fn block(x: i32, y: i32, z: i32) -> BlockLocation {
    BlockLocation::new(WorldName::new("world"), x, y, z)
}

fn center() -> BlockLocation {
    block(0, 64, 0)
}

fn pedestal(index: i32) -> BlockLocation {
    block(3, 64, index * 2 - 2)
}

fn ember_descriptor() -> ItemDescriptor {
    ItemDescriptor::new("BLAZE_ROD").with_display_name("Ember")
}

fn star_descriptor() -> ItemDescriptor {
    ItemDescriptor::new("NETHER_STAR")
}

fn ember(amount: u32) -> ItemStack {
    ItemStack::new(ember_descriptor(), amount)
}

fn star() -> ItemStack {
    ItemStack::new(star_descriptor(), 1)
}

fn dirt() -> ItemStack {
    ItemStack::new(ItemDescriptor::new("DIRT"), 1)
}
