//! The relief coordinator's resource pool.
//!
//! Every allocation moves stock from `available` to `allocated`, so for each
//! resource R the pool always satisfies:
//!
//! ```text
//! available(R) + allocated(R) == initial(R)
//! ```
//!
//! Quantities are unsigned and allocations are capped at what is available,
//! so stock can never go negative. [`ResourcePool::is_balanced`] re-checks the
//! equation for tests and drivers.

use std::collections::BTreeMap;

use relief_types::Resource;
use serde::Serialize;

/// Outcome of one allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Quantity asked for.
    pub requested: u32,
    /// Quantity actually taken from the pool.
    pub granted: u32,
    /// Stock left before the allocation.
    pub available_before: u32,
}

impl Allocation {
    /// Whether the request was cut short.
    pub const fn is_short(&self) -> bool {
        self.granted < self.requested
    }
}

/// Per-resource stock and running allocation totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourcePool {
    initial: BTreeMap<Resource, u32>,
    available: BTreeMap<Resource, u32>,
    allocated: BTreeMap<Resource, u32>,
}

impl ResourcePool {
    /// Create a pool holding `stock`.
    pub fn new(stock: &BTreeMap<Resource, u32>) -> Self {
        Self {
            initial: stock.clone(),
            available: stock.clone(),
            allocated: BTreeMap::new(),
        }
    }

    /// Take `min(requested, available)` of `resource`.
    pub fn allocate(&mut self, resource: Resource, requested: u32) -> Allocation {
        let available = self.available.entry(resource).or_insert(0);
        let available_before = *available;
        let granted = requested.min(available_before);
        *available = available_before.saturating_sub(granted);
        let allocated = self.allocated.entry(resource).or_insert(0);
        *allocated = allocated.saturating_add(granted);
        Allocation {
            requested,
            granted,
            available_before,
        }
    }

    /// Stock of `resource` still unallocated.
    pub fn available(&self, resource: Resource) -> u32 {
        self.available.get(&resource).copied().unwrap_or(0)
    }

    /// Total of `resource` allocated so far.
    pub fn allocated(&self, resource: Resource) -> u32 {
        self.allocated.get(&resource).copied().unwrap_or(0)
    }

    /// Stock of `resource` the pool started with.
    pub fn initial(&self, resource: Resource) -> u32 {
        self.initial.get(&resource).copied().unwrap_or(0)
    }

    /// Check `available + allocated == initial` for every resource.
    pub fn is_balanced(&self) -> bool {
        Resource::ALL.iter().all(|resource| {
            let held = u64::from(self.available(*resource))
                .saturating_add(u64::from(self.allocated(*resource)));
            held == u64::from(self.initial(*resource))
        })
    }
}
