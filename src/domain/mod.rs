//! Domain layer containing business entities and the scan notification path.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`scan_event`] - Scan notification message
//! - [`notification_hub`] - Live subscriber registry and fan-out
//! - [`notification_worker`] - Background task feeding the hub
//!
//! # Scan Notification Flow
//!
//! 1. [`crate::application::services::ScanService`] increments the counter
//! 2. A [`scan_event::ScanEvent`] is offered to a bounded channel (never awaited)
//! 3. [`notification_worker::run_notification_worker`] drains the channel
//! 4. [`notification_hub::NotificationHub::broadcast`] fans out to live subscribers
//!
//! The redirect response never waits on steps 3-4.

pub mod entities;
pub mod notification_hub;
pub mod notification_worker;
pub mod repositories;
pub mod scan_event;
