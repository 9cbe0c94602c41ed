//! Shared test utilities for the PXE provisioning workspace.
//!
//! This crate provides standardised test fixtures so the crate test suites
//! do not each build their own. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`inventory`]: [`FakeInventory`](inventory::FakeInventory), an in-memory
//!   hardware inventory
//! - [`workspace`]: [`TestWorkspace`](workspace::TestWorkspace), a temporary
//!   boot server layout with manifest, templates and dhcpd.conf

pub mod inventory;
pub mod workspace;

pub use inventory::FakeInventory;
pub use workspace::TestWorkspace;
