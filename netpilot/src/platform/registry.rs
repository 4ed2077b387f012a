//! Vendor registry mapping canonical vendor tags to driver factories.

use std::collections::HashMap;
use std::fmt;

use super::vendors::{cisco_ios, nokia_sros};
use crate::driver::{Driver, DriverConfig};
use crate::error::{Error, PlatformError, Result};

/// Creates a closed driver from its configuration.
pub type DriverFactory = fn(DriverConfig) -> Result<Box<dyn Driver>>;

/// Registry of driver factories keyed by canonical vendor tag.
///
/// A plain value: build one with [`VendorRegistry::builtin`] and extend it
/// with [`register`](VendorRegistry::register) as needed.
#[derive(Default, Clone)]
pub struct VendorRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl VendorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in vendors (`sros`, `ios`).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .factories
            .insert(nokia_sros::PLATFORM_NAME.to_string(), nokia_sros::SrosDriver::boxed);
        registry
            .factories
            .insert(cisco_ios::PLATFORM_NAME.to_string(), cisco_ios::IosDriver::boxed);
        registry
    }

    /// Register a driver factory under `vendor`.
    pub fn register(&mut self, vendor: impl Into<String>, factory: DriverFactory) -> Result<()> {
        let vendor = vendor.into();
        if self.factories.contains_key(&vendor) {
            return Err(PlatformError::AlreadyRegistered { name: vendor }.into());
        }
        self.factories.insert(vendor, factory);
        Ok(())
    }

    /// Check if a vendor is registered.
    pub fn contains(&self, vendor: &str) -> bool {
        self.factories.contains_key(vendor)
    }

    /// List all registered vendor tags.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.factories.keys()
    }

    /// Create a closed driver for `vendor`.
    pub fn create(&self, vendor: &str, config: DriverConfig) -> Result<Box<dyn Driver>> {
        let factory = self
            .factories
            .get(vendor)
            .ok_or_else(|| Error::UnsupportedVendor {
                vendor: vendor.to_string(),
            })?;
        factory(config)
    }
}

impl fmt::Debug for VendorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("VendorRegistry").field("vendors", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_vendors() {
        let registry = VendorRegistry::builtin();
        assert!(registry.contains("sros"));
        assert!(registry.contains("ios"));
        assert!(!registry.contains("junos"));
        assert_eq!(registry.names().count(), 2);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = VendorRegistry::builtin();
        let err = registry
            .register("ios", cisco_ios::IosDriver::boxed)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::AlreadyRegistered { .. })
        ));

        registry
            .register("ios-lab", cisco_ios::IosDriver::boxed)
            .unwrap();
        assert!(registry.contains("ios-lab"));
    }
}
