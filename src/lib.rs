//! Timetable generation for a multi-day outdoor games event.
//!
//! Groups are assigned to games across the time slots of the event so that
//! every group plays every round of every game exactly once, no group or game
//! is booked twice in a slot, and as few parties as possible are needed.

pub mod config;
pub mod display;
pub mod export;
pub mod parser;
pub mod schedule;
pub mod web;
