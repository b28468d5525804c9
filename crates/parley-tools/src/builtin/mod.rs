// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in tools available without any extra registration.

pub mod time;

pub use time::CurrentTimeTool;

use std::sync::Arc;

use crate::ToolRegistry;

/// Registers all built-in tools into the given registry.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(Arc::new(CurrentTimeTool));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_builtins_registers_current_time() {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("current_time").is_some());
    }
}
