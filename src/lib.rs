//! Attendance tracking and payroll for teaching staff.
//!
//! Teachers clock in and out once per day. At the end of each pay window the
//! engine turns the window's attendance into pay statements: regular hours up
//! to a per-day allowance, overtime beyond it at a premium, each priced at the
//! teacher's level. Statements are delivered by email and every run carries
//! an audit trace of how each number was reached.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod notification;
pub mod roster;
pub mod scheduler;
pub mod store;
