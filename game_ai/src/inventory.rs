use std::collections::VecDeque;

use game_common::UniqueId;
use game_core::Attachable;

/// The devices an actor carries but does not hold.
///
/// Devices are kept in a queue. Swapping to the next device takes it from the front and puts
/// the previously held one at the back, swapping to the previous one works the other way
/// around.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    items: VecDeque<Attachable>,
    mass: f32,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total mass of all devices.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attachable> {
        self.items.iter()
    }

    pub fn contains(&self, id: UniqueId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn get(&self, id: UniqueId) -> Option<&Attachable> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Returns the device that is swapped in next.
    pub fn next(&self) -> Option<&Attachable> {
        self.items.front()
    }

    /// Returns the device that is swapped in when swapping back.
    pub fn prev(&self) -> Option<&Attachable> {
        self.items.back()
    }

    /// Adds a device at the back of the queue.
    pub fn add(&mut self, device: Attachable) {
        self.mass += device.mass();
        self.items.push_back(device);
    }

    /// Adds a device at the front of the queue.
    pub fn add_front(&mut self, device: Attachable) {
        self.mass += device.mass();
        self.items.push_front(device);
    }

    pub fn remove(&mut self, id: UniqueId) -> Option<Attachable> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        let device = self.items.remove(index)?;
        self.mass = (self.mass - device.mass()).max(0.0);
        Some(device)
    }

    /// Takes the next device, putting `current` at the back of the queue.
    ///
    /// With an empty queue `current` is handed back unchanged.
    pub fn swap_next(&mut self, current: Option<Attachable>) -> Option<Attachable> {
        let Some(next) = self.items.pop_front() else {
            return current;
        };

        self.mass = (self.mass - next.mass()).max(0.0);
        if let Some(current) = current {
            self.add(current);
        }

        Some(next)
    }

    /// Takes the previous device, putting `current` at the front of the queue.
    ///
    /// With an empty queue `current` is handed back unchanged.
    pub fn swap_prev(&mut self, current: Option<Attachable>) -> Option<Attachable> {
        let Some(prev) = self.items.pop_back() else {
            return current;
        };

        self.mass = (self.mass - prev.mass()).max(0.0);
        if let Some(current) = current {
            self.add_front(current);
        }

        Some(prev)
    }

    /// Removes all devices.
    pub fn drain(&mut self) -> impl Iterator<Item = Attachable> + '_ {
        self.mass = 0.0;
        self.items.drain(..)
    }
}
