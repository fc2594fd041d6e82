//! Instance records and the fixed-capacity circular pool that owns them

use crate::animation::Lifecycle;

/// One simulated particle, bolt, shape or game entity.
///
/// `Default` must produce a dead record (`lifetime == 0`).
pub trait Instance: Clone + Default + 'static {
    fn lifecycle(&self) -> &Lifecycle;
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    fn is_alive(&self) -> bool {
        self.lifecycle().is_alive()
    }
}

/// Fixed array of instance slots with a circular write cursor.
///
/// Allocation never searches for a free slot: it takes the slot under the
/// cursor and advances it, so under sustained load the oldest instance is
/// overwritten even if it is still alive. Soft caps belong to the spawner.
pub struct InstancePool<T: Instance> {
    slots: Vec<T>,
    next_index: usize,
}

impl<T: Instance> InstancePool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity.max(1)],
            next_index: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot the next allocation will use
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Take the slot under the cursor and advance it
    pub fn allocate_slot(&mut self) -> usize {
        let slot = self.next_index;
        self.next_index = (self.next_index + 1) % self.slots.len();
        slot
    }

    /// Write `instance` into the next slot, returning the slot index
    pub fn spawn(&mut self, instance: T) -> usize {
        let slot = self.allocate_slot();
        self.slots[slot] = instance;
        slot
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot)
    }

    /// Visit every live slot in slot order
    pub fn for_each_live(&self, mut f: impl FnMut(usize, &T)) {
        for (slot, instance) in self.slots.iter().enumerate() {
            if instance.is_alive() {
                f(slot, instance);
            }
        }
    }

    /// Visit every live slot mutably in slot order
    pub fn for_each_live_mut(&mut self, mut f: impl FnMut(usize, &mut T)) {
        for (slot, instance) in self.slots.iter_mut().enumerate() {
            if instance.is_alive() {
                f(slot, instance);
            }
        }
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|i| i.is_alive())
    }

    pub fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|i| i.is_alive())
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|i| i.is_alive()).count()
    }

    /// Kill every instance and rewind the cursor
    pub fn clear(&mut self) {
        self.slots.fill(T::default());
        self.next_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationConfig;
    use proptest::prelude::*;

    #[derive(Clone, Default)]
    struct Dot {
        life: Lifecycle,
        tag: u32,
    }

    impl Instance for Dot {
        fn lifecycle(&self) -> &Lifecycle {
            &self.life
        }
        fn lifecycle_mut(&mut self) -> &mut Lifecycle {
            &mut self.life
        }
    }

    fn dot(lifetime: f32, tag: u32) -> Dot {
        Dot {
            life: Lifecycle::new(lifetime, &AnimationConfig::instant()),
            tag,
        }
    }

    #[test]
    fn allocation_is_circular() {
        let mut pool: InstancePool<Dot> = InstancePool::new(3);
        assert_eq!(pool.allocate_slot(), 0);
        assert_eq!(pool.allocate_slot(), 1);
        assert_eq!(pool.allocate_slot(), 2);
        assert_eq!(pool.allocate_slot(), 0);
        assert_eq!(pool.next_index(), 1);
    }

    #[test]
    fn full_pool_overwrites_oldest_live_slot() {
        let mut pool = InstancePool::new(4);
        for tag in 0..4 {
            pool.spawn(dot(10.0, tag));
        }
        assert_eq!(pool.live_count(), 4);

        let slot = pool.spawn(dot(10.0, 99));
        assert_eq!(slot, 0);
        assert_eq!(pool.live_count(), 4);
        assert_eq!(pool.get(0).map(|d| d.tag), Some(99));
    }

    #[test]
    fn for_each_live_skips_dead_slots() {
        let mut pool = InstancePool::new(5);
        pool.spawn(dot(1.0, 1));
        pool.spawn(dot(0.0, 2));
        pool.spawn(dot(1.0, 3));

        let mut seen = Vec::new();
        pool.for_each_live(|slot, d| seen.push((slot, d.tag)));
        assert_eq!(seen, vec![(0, 1), (2, 3)]);

        pool.for_each_live_mut(|_, d| d.life.kill());
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn clear_rewinds() {
        let mut pool = InstancePool::new(2);
        pool.spawn(dot(1.0, 1));
        pool.clear();
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.next_index(), 0);
    }

    proptest! {
        #[test]
        fn live_count_never_exceeds_capacity(
            capacity in 1usize..64,
            lifetimes in proptest::collection::vec(0.0f32..5.0, 0..300),
        ) {
            let mut pool = InstancePool::new(capacity);
            for (i, lifetime) in lifetimes.iter().enumerate() {
                pool.spawn(dot(*lifetime, i as u32));
                prop_assert!(pool.live_count() <= capacity);
                prop_assert!(pool.next_index() < capacity);
            }
        }
    }
}
