// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine-owned container arena with an inactive pool.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use super::id::ContainerId;
use super::sentinel::Sentinel;
use crate::comment::Comment;
use crate::content::Surface;

/// One slot of the arena: the per-comment display unit.
///
/// A container is owned either by the engine's active list or by the pool's
/// inactive queue, never both. While its hooks run, the comment is
/// temporarily taken out of the slot, so a comment never observes itself as a
/// peer.
#[derive(Debug)]
pub struct Container {
    pub(crate) generation: u32,
    pub(crate) comment: Option<Comment>,
    /// Cleared by a seek or an explicit deactivation; the next tick removes
    /// the container without consulting its comment.
    pub(crate) is_active: bool,
    /// Waiting in the inactive queue.
    pooled: bool,
    pub(crate) sentinel: Sentinel,
    /// The last published draw result.
    pub(crate) surface: Option<Surface>,
    /// Engine time observed on the last refresh.
    pub(crate) engine_time: f64,
}

impl Container {
    fn new() -> Self {
        Self {
            generation: 0,
            comment: None,
            is_active: true,
            pooled: false,
            sentinel: Sentinel::new(),
            surface: None,
            engine_time: 0.0,
        }
    }

    /// Returns the bound comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    /// Returns `false` once the container has been flagged for removal.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the container's cancellation sentinel.
    #[must_use]
    pub const fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    /// Returns the last published surface.
    #[must_use]
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Returns the engine time cached on the last refresh.
    #[must_use]
    pub const fn engine_time(&self) -> f64 {
        self.engine_time
    }
}

/// Arena of containers plus the FIFO queue of recyclable slots.
#[derive(Debug, Default)]
pub struct ContainerPool {
    slots: Vec<Container>,
    inactive: VecDeque<u32>,
}

impl ContainerPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of slots ever allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of slots waiting in the pool.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.inactive.len()
    }

    /// Returns handles to the pooled (inactive) slots, front first.
    pub fn inactive(&self) -> impl Iterator<Item = ContainerId> + '_ {
        self.inactive.iter().map(|&idx| ContainerId {
            idx,
            generation: self.slots[idx as usize].generation,
        })
    }

    /// Takes the front of the inactive queue, or allocates a fresh slot.
    ///
    /// A recycled slot has its generation and sentinel bumped and its
    /// published surface cleared, so nothing from the previous comment leaks
    /// into the new one.
    pub fn acquire(&mut self) -> ContainerId {
        let idx = if let Some(idx) = self.inactive.pop_front() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.sentinel.increase();
            slot.surface = None;
            slot.comment = None;
            slot.is_active = true;
            slot.pooled = false;
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            debug_assert!(idx != u32::MAX, "container arena exhausted");
            self.slots.push(Container::new());
            idx
        };
        ContainerId {
            idx,
            generation: self.slots[idx as usize].generation,
        }
    }

    /// Returns a container to the pool.
    ///
    /// Drops its comment, bumps the generation (stale handles stop resolving)
    /// and the sentinel (in-flight draws become cancelled), and clears the
    /// published surface. Returns `false` for a stale handle.
    pub fn release(&mut self, id: ContainerId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = &mut self.slots[id.idx as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.sentinel.increase();
        slot.surface = None;
        slot.comment = None;
        slot.is_active = false;
        slot.pooled = true;
        self.inactive.push_back(id.idx);
        true
    }

    /// Returns whether the handle refers to a slot that is not pooled and
    /// whose generation still matches.
    #[must_use]
    pub fn is_alive(&self, id: ContainerId) -> bool {
        self.slots
            .get(id.idx as usize)
            .is_some_and(|slot| slot.generation == id.generation && !slot.pooled)
    }

    /// Returns the container for a live handle.
    #[must_use]
    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        if self.is_alive(id) {
            self.slots.get(id.idx as usize)
        } else {
            None
        }
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        if self.is_alive(id) {
            self.slots.get_mut(id.idx as usize)
        } else {
            None
        }
    }

    /// Resolves a raw slot index to the handle of the comment currently
    /// bound there, if the slot is live and bound.
    #[must_use]
    pub fn current(&self, idx: u32) -> Option<ContainerId> {
        let slot = self.slots.get(idx as usize)?;
        let id = ContainerId {
            idx,
            generation: slot.generation,
        };
        (slot.comment.is_some() && self.is_alive(id)).then_some(id)
    }

    /// Records the engine time and returns the container's active flag.
    pub(crate) fn refresh(&mut self, id: ContainerId, time: f64) -> Option<bool> {
        let slot = self.get_mut(id)?;
        slot.engine_time = time;
        Some(slot.is_active)
    }

    /// Moves the comment out of the slot for the duration of a hook.
    pub(crate) fn take_comment(&mut self, id: ContainerId) -> Option<Comment> {
        self.get_mut(id)?.comment.take()
    }

    /// Binds `comment` to the slot.
    pub(crate) fn put_comment(&mut self, id: ContainerId, comment: Comment) {
        if let Some(slot) = self.get_mut(id) {
            slot.comment = Some(comment);
        } else {
            debug_assert!(false, "put_comment on stale handle {id:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use kurbo::Size;

    use super::*;
    use crate::comment::{Comment, Edge};
    use crate::content::{Content, Surface};

    struct Block;

    impl Content for Block {
        fn measure(&self) -> Size {
            Size::new(10.0, 10.0)
        }

        fn draw(&self, _surface: &mut Surface, _size: Size, _is_cancelled: &dyn Fn() -> bool) {}
    }

    fn comment() -> Comment {
        Comment::float(Arc::new(Block), Edge::Top, 3.0)
    }

    #[test]
    fn acquire_allocates_when_pool_is_empty() {
        let mut pool = ContainerPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_ne!(a, b);
        assert_eq!(pool.capacity(), 2);
        assert!(pool.is_alive(a));
        assert!(pool.is_alive(b));
    }

    #[test]
    fn release_invalidates_handle() {
        let mut pool = ContainerPool::new();
        let id = pool.acquire();
        pool.put_comment(id, comment());
        assert!(pool.release(id));
        assert!(!pool.is_alive(id));
        assert!(pool.get(id).is_none());
        assert!(!pool.release(id), "double release must be rejected");
        assert_eq!(pool.pooled(), 1);
    }

    #[test]
    fn recycled_slot_gets_fresh_generation_and_sentinel() {
        let mut pool = ContainerPool::new();
        let first = pool.acquire();
        let token = pool.get(first).map(|c| c.sentinel().token(first));
        pool.release(first);
        let second = pool.acquire();

        assert_eq!(first.index(), second.index(), "slot should be reused");
        assert_ne!(first.generation(), second.generation());
        assert!(token.is_some_and(|t| t.is_cancelled()));
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn pooled_slot_handles_do_not_resolve() {
        let mut pool = ContainerPool::new();
        let ids: Vec<_> = (0..64).map(|_| pool.acquire()).collect();
        for &id in &ids[..63] {
            pool.release(id);
        }
        let pooled: Vec<_> = pool.inactive().collect();
        assert_eq!(pooled.len(), 63);
        assert!(
            pooled.iter().all(|&id| pool.get(id).is_none()),
            "current generation but still pooled"
        );
        assert!(pool.is_alive(ids[63]), "the one live slot");

        let reused = pool.acquire();
        assert_eq!(reused.index(), pooled[0].index(), "front of the queue");
        assert!(pool.get(reused).is_some(), "live again once acquired");
    }

    #[test]
    fn pool_is_fifo() {
        let mut pool = ContainerPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(b);
        pool.release(a);
        assert_eq!(pool.acquire().index(), b.index());
        assert_eq!(pool.acquire().index(), a.index());
    }

    #[test]
    fn current_resolves_only_bound_slots() {
        let mut pool = ContainerPool::new();
        let id = pool.acquire();
        assert_eq!(pool.current(id.index()), None, "unbound slot");
        pool.put_comment(id, comment());
        assert_eq!(pool.current(id.index()), Some(id));
        pool.release(id);
        assert_eq!(pool.current(id.index()), None, "pooled slot");
    }

    #[test]
    fn take_and_put_comment() {
        let mut pool = ContainerPool::new();
        let id = pool.acquire();
        pool.put_comment(id, comment());
        let taken = pool.take_comment(id);
        assert!(taken.is_some());
        assert!(pool.get(id).is_some_and(|c| c.comment().is_none()));
        if let Some(c) = taken {
            pool.put_comment(id, c);
        }
        assert!(pool.get(id).is_some_and(|c| c.comment().is_some()));
    }
}
