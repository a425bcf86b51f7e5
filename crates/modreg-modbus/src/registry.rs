// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Insertion-ordered register registry keyed by name.

use crate::error::{ModbusError, ModbusResult};
use crate::register::Register;

/// Registers of one device, in declaration order.
///
/// Devices rarely hold more than a few dozen registers, so lookups scan.
#[derive(Debug, Clone, Default)]
pub struct RegisterRegistry {
    registers: Vec<Register>,
}

impl RegisterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Appends a register; fails if the name is taken.
    pub fn insert(&mut self, register: Register) -> ModbusResult<()> {
        if self.contains(register.name()) {
            return Err(ModbusError::duplicate_name(register.name()));
        }
        self.registers.push(register);
        Ok(())
    }

    /// Removes and returns the named register.
    pub fn remove(&mut self, name: &str) -> ModbusResult<Register> {
        let index = self
            .position(name)
            .ok_or_else(|| ModbusError::not_found(name))?;
        Ok(self.registers.remove(index))
    }

    /// Looks up a register.
    pub fn get(&self, name: &str) -> ModbusResult<&Register> {
        self.registers
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| ModbusError::not_found(name))
    }

    /// Looks up a register mutably.
    pub fn get_mut(&mut self, name: &str) -> ModbusResult<&mut Register> {
        self.registers
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| ModbusError::not_found(name))
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }

    /// Iterates mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Register> {
        self.registers.iter_mut()
    }

    /// Register names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.registers.iter().map(Register::name).collect()
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Returns `true` if no register is declared.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.registers.iter().position(|r| r.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegisterSpec;

    fn reg(name: &str, address: u16) -> Register {
        Register::new(RegisterSpec::new(name, address)).unwrap()
    }

    #[test]
    fn test_insertion_order() {
        let mut registry = RegisterRegistry::new();
        registry.insert(reg("b", 1)).unwrap();
        registry.insert(reg("a", 0)).unwrap();
        registry.insert(reg("c", 2)).unwrap();

        assert_eq!(registry.names(), vec!["b", "a", "c"]);
        registry.remove("a").unwrap();
        assert_eq!(registry.names(), vec!["b", "c"]);
    }

    #[test]
    fn test_duplicate_and_missing() {
        let mut registry = RegisterRegistry::new();
        registry.insert(reg("a", 0)).unwrap();

        assert!(registry.insert(reg("a", 5)).unwrap_err().is_duplicate_name());
        assert_eq!(registry.get("a").unwrap().address(), 0);

        registry.remove("a").unwrap();
        assert!(registry.remove("a").unwrap_err().is_not_found());
        assert!(registry.get("a").unwrap_err().is_not_found());
        assert!(registry.is_empty());
    }
}
