//! Resolution of a player's click on a claimed block.

use altars_core::{
    Altar, BlockLocation, CeremonyItem, Event, ItemDescriptor, ItemStack, Notice, PlayerId,
    PlayerRef, SlotRole, SoundSpec, PICKUP_SOUND, PLACE_SOUND,
};
use altars_system_readiness as readiness;

use crate::{placements::Placement, World};

pub(crate) fn interact(
    world: &mut World,
    player: PlayerRef,
    location: BlockLocation,
    held: Option<ItemStack>,
    out_events: &mut Vec<Event>,
) {
    let Some((altar, role)) = world.registry.find_altar_at(&location) else {
        return;
    };
    let altar = altar.clone();

    if world.summoning.contains(altar.name()) {
        notify(out_events, player.id(), Notice::AlreadySummoning);
        return;
    }

    if world.placements.get(&location).is_some() {
        retrieve(world, &altar, player.id(), location, out_events);
        return;
    }

    let Some(held) = held.filter(|stack| !stack.is_empty()) else {
        tracing::debug!(altar = %altar.name(), %location, "ignored empty-handed click");
        return;
    };

    match role {
        SlotRole::Center => activate(world, &altar, player, held.descriptor(), out_events),
        SlotRole::Pedestal => place(
            world,
            &altar,
            player.id(),
            location,
            held.descriptor().clone(),
            out_events,
        ),
    }
}

fn retrieve(
    world: &mut World,
    altar: &Altar,
    player: PlayerId,
    location: BlockLocation,
    out_events: &mut Vec<Event>,
) {
    let Some(placement) = world.placements.get(&location) else {
        return;
    };
    if world.settings.altar.prevent_item_theft && placement.placer() != player {
        notify(out_events, player, Notice::NotYourItem);
        return;
    }
    let Some(placement) = world.placements.take(&location) else {
        return;
    };

    tracing::debug!(altar = %altar.name(), %location, "placed item retrieved");
    out_events.push(Event::ItemRetrieved {
        altar: altar.name().clone(),
        player,
        location: location.clone(),
        item: placement.item().clone(),
    });
    out_events.push(Event::DisplayRemoved {
        display: placement.display(),
    });
    out_events.push(Event::SoundPlayed {
        sound: SoundSpec::new(PICKUP_SOUND),
        at: location.offset(0.5, 0.5, 0.5),
    });
}

fn activate(
    world: &mut World,
    altar: &Altar,
    player: PlayerRef,
    held: &ItemDescriptor,
    out_events: &mut Vec<Event>,
) {
    if altar.central_item() != Some(held) {
        notify(out_events, player.id(), Notice::WrongItem);
        return;
    }

    let placed = altar
        .slots()
        .filter_map(|slot| world.placements.get(slot))
        .map(Placement::item);
    if !readiness::is_ready(altar.required(), placed) {
        notify(out_events, player.id(), Notice::NotReady);
        return;
    }

    let Some(center) = altar.center().cloned() else {
        return;
    };

    out_events.push(Event::HeldItemConsumed {
        player: player.id(),
        amount: 1,
    });
    let _ = world.summoning.insert(altar.name().clone());

    let mut ceremony: Vec<CeremonyItem> = Vec::new();
    for placement in world.placements.drain_slots(altar.slots()) {
        let _ = world.ceremony_displays.insert(placement.display());
        ceremony.push(CeremonyItem {
            display: placement.display(),
            item: placement.item().clone(),
            position: placement.position().clone(),
        });
    }

    let display = world.allocate_display();
    let position = center.offset(0.5, 1.0, 0.5);
    let _ = world.ceremony_displays.insert(display);
    out_events.push(Event::DisplaySpawned {
        display,
        item: held.clone(),
        at: position.clone(),
    });
    ceremony.push(CeremonyItem {
        display,
        item: held.clone(),
        position,
    });

    tracing::info!(
        altar = %altar.name(),
        summoner = player.name(),
        items = ceremony.len(),
        "summoning started"
    );
    out_events.push(Event::SummoningStarted {
        altar: altar.name().clone(),
        summoner: player,
        center,
        boss: altar.boss().clone(),
        ceremony,
    });
}

fn place(
    world: &mut World,
    altar: &Altar,
    player: PlayerId,
    location: BlockLocation,
    item: ItemDescriptor,
    out_events: &mut Vec<Event>,
) {
    if let Some(previous) = world.placements.take(&location) {
        out_events.push(Event::DisplayRemoved {
            display: previous.display(),
        });
        out_events.push(Event::ItemReturned {
            player: previous.placer(),
            item: previous.item().clone(),
        });
    }

    let display = world.allocate_display();
    let height = world.settings.effects.heights.pedestal;
    let position = location.offset(0.5, height - 0.2, 0.5);
    let feeds_readiness = altar.required().requires(&item);

    world.placements.insert(
        location.clone(),
        Placement::new(display, item.clone(), player, position.clone()),
    );

    out_events.push(Event::DisplaySpawned {
        display,
        item: item.clone(),
        at: position,
    });
    out_events.push(Event::ItemPlaced {
        altar: altar.name().clone(),
        player,
        location: location.clone(),
        display,
        item,
        feeds_readiness,
    });
    out_events.push(Event::HeldItemConsumed { player, amount: 1 });
    out_events.push(Event::SoundPlayed {
        sound: SoundSpec::new(PLACE_SOUND),
        at: location.offset(0.5, 0.5, 0.5),
    });
}

fn notify(out_events: &mut Vec<Event>, player: PlayerId, notice: Notice) {
    out_events.push(Event::Notified { player, notice });
}
