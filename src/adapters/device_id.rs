//! Device identity derived from the ESP32 factory MAC address.
//!
//! `PM-XXYYZZ` (last 3 MAC bytes, uppercase hex) is printed in the startup
//! banner and becomes part of the MQTT client-id seed.

use core::fmt::Write;

pub type DeviceIdString = heapless::String<16>;

pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: a fixed fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x24, 0x6F, 0x28, 0x1A, 0x2B, 0x3C]
}

pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "PM-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// Seed for the client-id generator.  Mixes the hardware RNG with the MAC
/// so two boards never share a sequence.
#[cfg(target_os = "espidf")]
pub fn rng_seed(mac: &MacAddress) -> u64 {
    let hi = u64::from(unsafe { esp_idf_svc::sys::esp_random() });
    let lo = u64::from(unsafe { esp_idf_svc::sys::esp_random() });
    ((hi << 32) | lo) ^ mac_bits(mac)
}

#[cfg(not(target_os = "espidf"))]
pub fn rng_seed(mac: &MacAddress) -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64);
    nanos ^ mac_bits(mac)
}

fn mac_bits(mac: &MacAddress) -> u64 {
    mac.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}
