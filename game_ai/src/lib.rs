//! Controllable units on top of the body simulation.
//!
//! An [`Actor`] wraps a body with a [`Controller`], an [`Inventory`] and a [`Navigator`]
//! which turns waypoints into move paths through the pathfinder of the world. Walking is
//! done by a [`Gait`] that drives the legs of the actor along their limb paths.

pub mod actor;
pub mod controller;
pub mod gait;
pub mod inventory;
pub mod navigator;
pub mod states;

pub use actor::{Actor, AiMode, Status};
pub use controller::{ControlState, ControlStates, Controller, InputMode};
pub use gait::{CrabGait, Gait, GaitInput, HumanGait, LegDrive, LegPair};
pub use inventory::Inventory;
pub use navigator::{Navigator, OnNewMovePath, Waypoint};
pub use states::LocomotionStates;
