use std::num::NonZeroU64;

/// A slot array handing out generation-checked handles.
///
/// Handles pack `generation << 32 | (index + 1)` so they are never zero. A
/// released slot bumps its generation before reuse, so a stale handle can
/// never reach the new occupant.
pub struct ResourcePool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

impl<T> ResourcePool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> NonZeroU64 {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return pack(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        pack(index, 0)
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        let (index, generation) = unpack(handle)?;
        self.slots
            .get(index)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let (index, generation) = unpack(handle)?;
        self.slots
            .get_mut(index)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_mut())
    }

    /// Take the value out. The handle, and every copy of it, is dead after.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, generation) = unpack(handle)?;
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        self.live -= 1;

        // A slot whose generation would wrap is retired for good
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(index as u32);
        }
        Some(value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Remove every live value, invalidating all handles
    pub fn drain(&mut self) -> Vec<(NonZeroU64, T)> {
        let mut out = Vec::with_capacity(self.live);
        for index in 0..self.slots.len() {
            let handle = pack(index as u32, self.slots[index].generation);
            if let Some(value) = self.remove(handle.get()) {
                out.push((handle, value));
            }
        }
        out
    }
}

fn pack(index: u32, generation: u32) -> NonZeroU64 {
    // index + 1 keeps the low half non-zero
    let raw = (u64::from(generation) << 32) | (u64::from(index) + 1);
    NonZeroU64::MIN.saturating_add(raw - 1)
}

fn unpack(handle: u64) -> Option<(usize, u32)> {
    let index = (handle as u32).checked_sub(1)?;
    Some((index as usize, (handle >> 32) as u32))
}
