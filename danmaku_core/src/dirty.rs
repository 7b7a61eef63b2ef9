// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The [`TransactionBatcher`](crate::batch::TransactionBatcher) keeps its
//! pending `(container, operation)` set in an [`understory_dirty`] tracker,
//! one channel per [`BatchOp`](crate::batch::BatchOp). Marking the same slot
//! twice on a channel is idempotent, which is exactly the deduplication a
//! batch needs. Nothing propagates: containers have no dependency edges.

use understory_dirty::Channel;

/// Surface content must be redrawn.
pub const DISPLAY: Channel = Channel::new(0);
