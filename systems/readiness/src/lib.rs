#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure readiness evaluation for altars.
//!
//! An altar is ready when, for every required item kind, at least the
//! required number of matching items sit on its slots. Matching is exact
//! descriptor equality. The evaluation depends on nothing but its inputs, so
//! adding a placement can never turn a ready altar unready.

use altars_core::{ItemDescriptor, RequiredItems};

/// Unmet portion of one requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortfall {
    item: ItemDescriptor,
    required: u32,
    placed: u32,
}

impl Shortfall {
    /// Required item kind.
    #[must_use]
    pub fn item(&self) -> &ItemDescriptor {
        &self.item
    }

    /// Units the altar needs.
    #[must_use]
    pub const fn required(&self) -> u32 {
        self.required
    }

    /// Matching units currently placed.
    #[must_use]
    pub const fn placed(&self) -> u32 {
        self.placed
    }

    /// Units still missing.
    #[must_use]
    pub const fn missing(&self) -> u32 {
        self.required.saturating_sub(self.placed)
    }
}

/// Lists every requirement that the placed items do not satisfy yet.
#[must_use]
pub fn shortfalls<'a, I>(required: &RequiredItems, placed: I) -> Vec<Shortfall>
where
    I: IntoIterator<Item = &'a ItemDescriptor>,
{
    if required.is_empty() {
        return Vec::new();
    }

    let placed: Vec<&ItemDescriptor> = placed.into_iter().collect();
    required
        .iter()
        .filter_map(|entry| {
            let count = placed.iter().filter(|item| **item == entry.item()).count();
            let count = u32::try_from(count).unwrap_or(u32::MAX);
            (count < entry.amount()).then(|| Shortfall {
                item: entry.item().clone(),
                required: entry.amount(),
                placed: count,
            })
        })
        .collect()
}

/// Reports whether the placed items satisfy every requirement.
#[must_use]
pub fn is_ready<'a, I>(required: &RequiredItems, placed: I) -> bool
where
    I: IntoIterator<Item = &'a ItemDescriptor>,
{
    shortfalls(required, placed).is_empty()
}
