// Copyright 2026 the Danmaku Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Containers: recyclable per-comment display units.
//!
//! [`ContainerPool`] owns every container ever allocated. Handles are
//! generational [`ContainerId`]s, so a handle kept past removal simply stops
//! resolving. Each container carries a [`Sentinel`] whose [`CancelToken`]s
//! gate asynchronous draws.

mod id;
mod pool;
mod sentinel;

pub use id::ContainerId;
pub use pool::{Container, ContainerPool};
pub use sentinel::{CancelToken, Sentinel};
