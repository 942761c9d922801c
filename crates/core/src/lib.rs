//! Core domain for the rsvp.pizza attendance engine.
//!
//! This crate holds the pieces that do not touch a network or a database:
//! - Friend/Friday data model and visibility rules
//! - Collaborator contracts for the attendance store and the remote calendar
//! - A generic TTL cache used to shield slow lookups
//! - The weekly slot schedule

pub mod cache;
pub mod friday;
pub mod gateway;
pub mod schedule;
pub mod storage;
