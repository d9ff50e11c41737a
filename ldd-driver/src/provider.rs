/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::{DriverRegistry, LogDnaDriver, LogDriver};

pub const DRIVER_NAME: &str = "logdna";

/// Make the `logdna` driver available to the host.
pub fn register(registry: &mut DriverRegistry) -> anyhow::Result<()> {
    registry.extend(DRIVER_NAME, || -> Box<dyn LogDriver> {
        Box::new(LogDnaDriver::default())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered() {
        let mut registry = DriverRegistry::new();
        register(&mut registry).unwrap();
        assert_eq!(registry.keys(), vec![DRIVER_NAME]);

        let a = registry.make(DRIVER_NAME).unwrap();
        let b = registry.make(DRIVER_NAME).unwrap();
        assert!(a.level().is_none());
        assert!(b.level().is_none());
    }
}
