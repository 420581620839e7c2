use altars_core::{
    AltarRecord, BlockLocation, Command, Event, ItemDescriptor, ItemStack, KnownWorlds,
    PlayerId, PlayerRef, WorldName,
};
use altars_system_ambient::{Ambient, READY_PULSE_INTERVAL};
use altars_world::{self as world, query, World};

#[test]
fn ready_altars_pulse_above_their_center() {
    let mut harness = Harness::new();
    harness.place(pedestal(0), ember());
    harness.place(pedestal(1), ember());

    let particles = harness.run_until(READY_PULSE_INTERVAL);
    let pulse = center().offset(0.5, 1.2, 0.5);
    let pulses: Vec<&Event> = particles
        .iter()
        .filter(|event| matches!(event, Event::ParticlesSpawned { emission } if emission.at == pulse))
        .collect();
    assert_eq!(pulses.len(), 1, "one pulse per interval");
    if let Event::ParticlesSpawned { emission } = pulses[0] {
        assert_eq!(emission.count, 5);
    }
}

#[test]
fn partially_filled_altars_only_loop_their_pedestals() {
    let mut harness = Harness::new();
    harness.place(pedestal(0), ember());
    harness.place(pedestal(1), ItemDescriptor::new("DIRT"));

    let particles = harness.run_until(READY_PULSE_INTERVAL);
    assert_eq!(harness.ambient.active_loops(), 1, "dirt feeds nothing");
    assert_eq!(particles.len(), (READY_PULSE_INTERVAL / 2) as usize);
    assert!(query::ready_centers(&harness.world).is_empty());
}

#[test]
fn retrieving_an_item_stops_its_loop() {
    let mut harness = Harness::new();
    harness.place(pedestal(0), ember());
    let _ = harness.run_until(2);
    assert_eq!(harness.ambient.active_loops(), 1);

    harness.submit(Command::Interact {
        player: alice(),
        location: pedestal(0),
        held: None,
    });
    assert_eq!(harness.ambient.active_loops(), 0);
}

#[test]
fn shutdown_stops_every_loop() {
    let mut harness = Harness::new();
    harness.place(pedestal(0), ember());
    harness.place(pedestal(1), ember());
    let _ = harness.run_until(4);

    harness.submit(Command::Shutdown);
    assert_eq!(harness.ambient.active_loops(), 0);
    assert!(harness.run_until(READY_PULSE_INTERVAL).is_empty());
}

struct Harness {
    world: World,
    ambient: Ambient,
    log: Vec<Event>,
}

impl Harness {
    fn new() -> Self {
        let mut record = AltarRecord::named("shrine");
        record.center = Some(center().encode());
        record.central_item = Some(Ok(ItemDescriptor::new("NETHER_STAR")));
        record.required_items = vec![Ok((ember(), 2))];
        record.pedestal_locations = (0..2).map(|i| pedestal(i).encode()).collect();

        let mut harness = Self {
            world: World::new(),
            ambient: Ambient::new(),
            log: Vec::new(),
        };
        let worlds: KnownWorlds = ["world"].into_iter().collect();
        harness.submit(Command::LoadAltars {
            records: vec![record],
            worlds,
        });
        harness
    }

    fn submit(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            let ready = query::ready_centers(&self.world);
            let feeding = query::feeding_slots(&self.world);
            self.ambient.handle(
                &events,
                &ready,
                &feeding,
                &query::settings(&self.world).effects,
                &mut pending,
            );
            self.log.extend(events);
        }
    }

    fn place(&mut self, location: BlockLocation, item: ItemDescriptor) {
        self.submit(Command::Interact {
            player: alice(),
            location,
            held: Some(ItemStack::new(item, 1)),
        });
    }

    /// Ticks until the world clock reaches `tick`, returning the particles spawned.
    fn run_until(&mut self, tick: u64) -> Vec<Event> {
        let start = self.log.len();
        while query::tick(&self.world) < tick {
            self.submit(Command::Tick);
        }
        self.log[start..]
            .iter()
            .filter(|event| matches!(event, Event::ParticlesSpawned { .. }))
            .cloned()
            .collect()
    }
}

fn alice() -> PlayerRef {
    PlayerRef::new(PlayerId::new(7), "alice")
}

fn center() -> BlockLocation {
    BlockLocation::new(WorldName::new("world"), 0, 70, 0)
}

fn pedestal(index: i32) -> BlockLocation {
    BlockLocation::new(WorldName::new("world"), -2, 70, index * 4 - 2)
}

fn ember() -> ItemDescriptor {
    ItemDescriptor::new("BLAZE_ROD")
}
