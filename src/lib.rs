//! # Surgepool
//!
//! Elastic resource-pool coordination with load-adaptive capacity control.
//!
//! This library models concurrent access to a scarce, elastic pool of
//! resources under variable load. Producers push work items into a shared
//! queue; consumers pop items, lease a resource from the pool, perform
//! service, and return the lease. A load controller watches queue depth and
//! completion counts and reacts at natural checkpoints: it grows the pool
//! when a pressure episode pushes the queue past a high watermark, shrinks
//! it back once depth falls under a (strictly lower) low watermark, and
//! toggles an accelerated "degraded" service mode when completions fall
//! behind. A failure tracker retires resources that break during service
//! and halts the whole system, exactly once, when the last one is gone.
//!
//! ## Core Problem Solved
//!
//! Bounded-resource coordination is easy to get subtly wrong:
//!
//! - **Elastic capacity**: grow/shrink racing acquire/release must never
//!   break the permit invariant `available + in_use == capacity`
//! - **Partial failure**: a resource lost mid-service must retire its
//!   permit without leaking, and the terminal all-broken transition must
//!   fire exactly once under simultaneous failures
//! - **Oscillation**: naive single-threshold scaling flaps; expansion and
//!   contraction need hysteresis
//!
//! ## Key Features
//!
//! - **Free-list permit pool**: `acquire` pops a healthy resource id under
//!   one exclusion domain; a broken resource is structurally unreachable
//! - **Scoped release**: leases are RAII guards, returned on every exit path
//! - **Bounded shrink**: contraction reclaims permits within a bounded wait
//!   or silently skips, never deadlocking against busy resources
//! - **Structured event stream**: domain events (arrivals, service
//!   lifecycle, capacity changes, mode changes, halt) flow over a channel
//!   to pluggable sinks; rendering is not a core concern
//! - **Deterministic testing**: arrival pacing, service timing, and failure
//!   injection sit behind a pluggable stimulus trait
//!
//! ## Example
//!
//! ```rust,ignore
//! use surgepool::builders::CoordinatorBuilder;
//! use surgepool::config::SimConfig;
//!
//! let summary = CoordinatorBuilder::new(SimConfig::loading_bays())
//!     .build()?
//!     .run();
//! println!("completed {} items", summary.completed);
//! ```
//!
//! For complete examples, see the scenario tests under `tests/`.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core coordination components: pool, queue, controller, failure tracking.
pub mod core;
/// Configuration models and scenario presets.
pub mod config;
/// Builders to construct a coordinator from configuration.
pub mod builders;
/// Infrastructure backends for queues and stimulus generators.
pub mod infra;
/// Shared utilities.
pub mod util;
