use crate::error::{DeviceError, Result};
use std::fmt;
use std::thread;

/// Kinds of compute device a platform can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Host processor, lanes emulated with OS threads.
    Cpu,
    /// Discrete or integrated GPU. Not provided by the host platform.
    Gpu,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Cpu => write!(f, "CPU"),
            DeviceType::Gpu => write!(f, "GPU"),
        }
    }
}

/// A compute device on some platform.
///
/// `compute_units` is the worker parallelism used to spread work-group
/// instances; `max_lanes` caps the lane count of a single work-group
/// (lanes are OS threads on the host platform, so the cap is deliberately
/// modest).
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    device_type: DeviceType,
    compute_units: usize,
    max_lanes: usize,
}

impl Device {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Number of work-group instances the device executes concurrently.
    pub fn compute_units(&self) -> usize {
        self.compute_units
    }

    /// Maximum lanes per work-group accepted at dispatch time.
    pub fn max_lanes(&self) -> usize {
        self.max_lanes
    }
}

/// A compute platform: a named provider of devices.
#[derive(Debug, Clone)]
pub struct Platform {
    name: String,
    devices: Vec<Device>,
}

impl Platform {
    /// Returns the platform name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Devices of the requested type on this platform.
    ///
    /// # Errors
    /// Returns `DeviceNotFound` if the platform has no device of that type.
    pub fn devices(&self, requested: DeviceType) -> Result<Vec<Device>> {
        let found: Vec<Device> = self
            .devices
            .iter()
            .filter(|d| d.device_type == requested)
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(DeviceError::DeviceNotFound {
                requested,
                platform: self.name.clone(),
            });
        }
        Ok(found)
    }
}

/// Maximum lanes per work-group on the host platform. Each lane is a
/// scoped OS thread, so the limit stays well below typical GPU group sizes.
const HOST_MAX_LANES: usize = 64;

/// Enumerate the available compute platforms.
///
/// The host platform is always present, exposing one CPU device whose
/// `compute_units` follows `std::thread::available_parallelism`.
///
/// # Errors
/// Returns `PlatformNotFound` if no platform is available (cannot happen
/// for the host platform, but callers are written against the error).
pub fn platforms() -> Result<Vec<Platform>> {
    let units = thread::available_parallelism().map_or(1, |n| n.get());
    let host = Platform {
        name: "workgrid host".to_string(),
        devices: vec![Device {
            name: format!("host cpu ({units} threads)"),
            device_type: DeviceType::Cpu,
            compute_units: units,
            max_lanes: HOST_MAX_LANES,
        }],
    };
    log::debug!("enumerated 1 platform: '{}' ({units} units)", host.name);
    Ok(vec![host])
}

/// Select a platform whose name contains `preferred`, falling back to the
/// first platform when no name matches.
///
/// # Errors
/// Returns `PlatformNotFound` if the list is empty.
pub fn find_platform<'a>(platforms: &'a [Platform], preferred: &str) -> Result<&'a Platform> {
    platforms
        .iter()
        .find(|p| p.name.contains(preferred))
        .or_else(|| platforms.first())
        .ok_or(DeviceError::PlatformNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_platform_present() {
        let ps = platforms().unwrap();
        assert_eq!(ps.len(), 1);
        assert!(ps[0].name().contains("workgrid"));
    }

    #[test]
    fn test_cpu_device_available() {
        let ps = platforms().unwrap();
        let devices = ps[0].devices(DeviceType::Cpu).unwrap();
        assert_eq!(devices.len(), 1);
        assert!(devices[0].compute_units() >= 1);
        assert!(devices[0].max_lanes() >= 1);
    }

    #[test]
    fn test_gpu_device_not_found() {
        let ps = platforms().unwrap();
        let err = ps[0].devices(DeviceType::Gpu).unwrap_err();
        match err {
            DeviceError::DeviceNotFound { requested, .. } => {
                assert_eq!(requested, DeviceType::Gpu);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_platform_by_name() {
        let ps = platforms().unwrap();
        let p = find_platform(&ps, "workgrid").unwrap();
        assert_eq!(p.name(), ps[0].name());
    }

    #[test]
    fn test_find_platform_falls_back_to_first() {
        let ps = platforms().unwrap();
        let p = find_platform(&ps, "NVIDIA").unwrap();
        assert_eq!(p.name(), ps[0].name());
    }

    #[test]
    fn test_find_platform_empty_list() {
        let err = find_platform(&[], "anything").unwrap_err();
        assert!(matches!(err, DeviceError::PlatformNotFound));
    }
}
