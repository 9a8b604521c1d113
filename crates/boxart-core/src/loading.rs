//! Texture load tracking for one asset set
//!
//! Every change of asset set starts a new generation. Fetch results carry the
//! generation they were started for; results from older generations are
//! rejected so a slow fetch can never overwrite newer art.

use crate::image_ref::ImageSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStatus {
    /// No source assigned; settled immediately
    #[default]
    Empty,
    Pending,
    Ready,
    Failed,
}

impl SlotStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SlotStatus::Pending)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSetStatus {
    generation: u64,
    slots: [SlotStatus; 3],
}

fn index(slot: ImageSlot) -> usize {
    match slot {
        ImageSlot::Front => 0,
        ImageSlot::Back => 1,
        ImageSlot::Spine => 2,
    }
}

impl TextureSetStatus {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new generation. `has_source` is indexed front, back, spine.
    pub fn begin(&mut self, has_source: [bool; 3]) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        for (slot, has) in self.slots.iter_mut().zip(has_source) {
            *slot = if has { SlotStatus::Pending } else { SlotStatus::Empty };
        }
        self.generation
    }

    /// Record a fetch outcome. Returns false if the result is stale or unexpected.
    pub fn finish(&mut self, generation: u64, slot: ImageSlot, ok: bool) -> bool {
        if generation != self.generation {
            return false;
        }
        let entry = &mut self.slots[index(slot)];
        if *entry != SlotStatus::Pending {
            return false;
        }
        *entry = if ok { SlotStatus::Ready } else { SlotStatus::Failed };
        true
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn status(&self, slot: ImageSlot) -> SlotStatus {
        self.slots[index(slot)]
    }

    /// All three slots loaded, failed, or empty
    pub fn is_settled(&self) -> bool {
        self.slots.iter().all(SlotStatus::is_settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settles_when_all_done() {
        let mut status = TextureSetStatus::default();
        let generation = status.begin([true, true, false]);
        assert!(!status.is_settled());
        assert_eq!(status.status(ImageSlot::Spine), SlotStatus::Empty);

        assert!(status.finish(generation, ImageSlot::Front, true));
        assert!(!status.is_settled());
        assert!(status.finish(generation, ImageSlot::Back, false));
        assert!(status.is_settled());
    }

    #[test]
    fn test_stale_results_are_rejected() {
        let mut status = TextureSetStatus::default();
        let old = status.begin([true, true, true]);
        let new = status.begin([true, true, true]);
        assert_ne!(old, new);
        assert!(!status.is_current(old));

        assert!(!status.finish(old, ImageSlot::Front, true));
        assert_eq!(status.status(ImageSlot::Front), SlotStatus::Pending);
        assert!(status.finish(new, ImageSlot::Front, true));
    }

    #[test]
    fn test_duplicate_result_is_ignored() {
        let mut status = TextureSetStatus::default();
        let generation = status.begin([true, false, false]);
        assert!(status.finish(generation, ImageSlot::Front, false));
        assert!(!status.finish(generation, ImageSlot::Front, true));
        assert_eq!(status.status(ImageSlot::Front), SlotStatus::Failed);
    }

    #[test]
    fn test_nothing_to_load_is_settled() {
        let mut status = TextureSetStatus::default();
        status.begin([false, false, false]);
        assert!(status.is_settled());
    }
}
