use alloc::vec::Vec;

use crate::{
    chip::{ByteOrder, LittleEndian, Mmio},
    Controller,
};

/// The controllers brought up by one platform, owned by whoever probed them.
pub struct ControllerRegistry<M, O = LittleEndian> {
    controllers: Vec<Controller<M, O>>,
}

impl<M, O> Default for ControllerRegistry<M, O> {
    fn default() -> Self {
        Self {
            controllers: Vec::new(),
        }
    }
}

impl<M: Mmio, O: ByteOrder> ControllerRegistry<M, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a controller and returns its position in the registry.
    pub fn register(&mut self, controller: Controller<M, O>) -> usize {
        self.controllers.push(controller);
        self.controllers.len() - 1
    }

    pub fn get(&self, pos: usize) -> Option<&Controller<M, O>> {
        self.controllers.get(pos)
    }

    pub fn get_mut(&mut self, pos: usize) -> Option<&mut Controller<M, O>> {
        self.controllers.get_mut(pos)
    }

    /// Looks a controller up by its hardware index.
    pub fn find(&mut self, idx: u32) -> Option<&mut Controller<M, O>> {
        self.controllers.iter_mut().find(|c| c.idx() == idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Controller<M, O>> {
        self.controllers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Controller<M, O>> {
        self.controllers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
