//! Wireless station adapter.
//!
//! Implements [`WifiPort`] — store credentials, watch association,
//! sweep the neighbourhood, forget everything.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: raw ESP-IDF sys calls against the STA
//!   interface (`esp_wifi_set_config`, `esp_wifi_connect`,
//!   `esp_wifi_scan_start`, `esp_wifi_sta_get_ap_info`).  The driver
//!   itself (netif, event loop, `esp_wifi_start`) is brought up once in
//!   `main` before the adapter is used.
//! - **all other targets**: a simulated neighbourhood with configurable
//!   association latency, so the connectivity check exercises its full
//!   poll/scan/forget path on a workstation.

use log::info;

use crate::app::ports::{
    ConnectedNetwork, ScanList, ScannedNetwork, StoreOutcome, WifiPort, MAX_SSID_LEN,
};
use crate::error::WifiError;

pub struct WifiAdapter {
    ssid: heapless::String<MAX_SSID_LEN>,
    #[cfg(not(target_os = "espidf"))]
    sim: sim::SimRadio,
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            #[cfg(not(target_os = "espidf"))]
            sim: sim::SimRadio::new(),
        }
    }
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Device implementation
// ───────────────────────────────────────────────────────────────

/// The running station driver.  Written once during [`start_station`]
/// and kept alive for the process lifetime; the adapter then talks to
/// the started driver through the raw `esp_wifi_*` calls.
#[cfg(target_os = "espidf")]
static mut STATION: Option<esp_idf_svc::wifi::EspWifi<'static>> = None;

/// One-shot STA bring-up.  Call once from `main` before the first
/// connectivity check; the modem peripheral is consumed here.
#[cfg(target_os = "espidf")]
pub fn start_station() -> Result<(), WifiError> {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};

    let rc = |e: esp_idf_svc::sys::EspError| WifiError::StoreFailed { rc: e.code() };

    let peripherals = Peripherals::take().map_err(rc)?;
    let sysloop = EspSystemEventLoop::take().map_err(rc)?;

    let mut wifi = EspWifi::new(peripherals.modem, sysloop, None).map_err(rc)?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))
        .map_err(rc)?;
    wifi.start().map_err(rc)?;

    // SAFETY: written once at boot from the single main task, before the
    // dispatch loop starts; never written again.
    unsafe {
        STATION = Some(wifi);
    }
    info!("wifi: station interface up");
    Ok(())
}

#[cfg(target_os = "espidf")]
impl WifiPort for WifiAdapter {
    fn store_network(&mut self, ssid: &str, key: &str) -> Result<StoreOutcome, WifiError> {
        use esp_idf_svc::sys::*;

        self.ssid.clear();
        let _ = self.ssid.push_str(ssid);

        // SAFETY: wifi_config_t is a C union; zero-init then fill the STA
        // view.  SSID/key are truncated to the driver's fixed fields.
        let mut cfg: wifi_config_t = unsafe { core::mem::zeroed() };
        let sta = unsafe { &mut cfg.sta };
        let ssid_bytes = ssid.as_bytes();
        let n = ssid_bytes.len().min(sta.ssid.len());
        sta.ssid[..n].copy_from_slice(&ssid_bytes[..n]);
        let key_bytes = key.as_bytes();
        let k = key_bytes.len().min(sta.password.len() - 1);
        sta.password[..k].copy_from_slice(&key_bytes[..k]);

        // SAFETY: driver started in main before the first check runs.
        unsafe {
            let ret = esp_wifi_set_config(wifi_interface_t_WIFI_IF_STA, &mut cfg);
            if ret == ESP_ERR_WIFI_CONN {
                return Ok(StoreOutcome::AlreadyStored);
            }
            if ret != ESP_OK {
                return Err(WifiError::StoreFailed { rc: ret });
            }
            // Kick off association; a refusal here shows up later as an
            // association timeout, which is the check's concern.
            let _ = esp_wifi_connect();
        }
        Ok(StoreOutcome::Stored)
    }

    fn current_network(&mut self) -> Option<ConnectedNetwork> {
        use esp_idf_svc::sys::*;

        // SAFETY: esp_wifi_sta_get_ap_info fills the record only while
        // associated; any error means "not connected yet".
        let mut ap: wifi_ap_record_t = unsafe { core::mem::zeroed() };
        let ret = unsafe { esp_wifi_sta_get_ap_info(&mut ap) };
        if ret != ESP_OK {
            return None;
        }

        let mut network = ConnectedNetwork::default();
        let len = ap.ssid.iter().position(|&b| b == 0).unwrap_or(ap.ssid.len());
        if let Ok(s) = core::str::from_utf8(&ap.ssid[..len]) {
            let _ = network.ssid.push_str(s);
        }
        network.bssid = ap.bssid;
        network.frequency_mhz = channel_to_mhz(ap.primary);
        Some(network)
    }

    fn scan(&mut self) -> Result<usize, WifiError> {
        use esp_idf_svc::sys::*;

        // SAFETY: blocking all-channel active scan from the main task.
        unsafe {
            let ret = esp_wifi_scan_start(core::ptr::null(), true);
            if ret != ESP_OK {
                return Err(WifiError::ScanFailed { rc: ret });
            }
            let mut count: u16 = 0;
            let ret = esp_wifi_scan_get_ap_num(&mut count);
            if ret != ESP_OK {
                return Err(WifiError::ScanFailed { rc: ret });
            }
            Ok(count as usize)
        }
    }

    fn scanned_networks(&mut self) -> Result<ScanList, WifiError> {
        use esp_idf_svc::sys::*;

        let mut records: [wifi_ap_record_t; crate::app::ports::MAX_SCAN_RESULTS] =
            unsafe { core::mem::zeroed() };
        let mut count = records.len() as u16;

        // SAFETY: records table sized to `count`; the driver copies at
        // most that many entries and updates `count`.
        let ret = unsafe { esp_wifi_scan_get_ap_records(&mut count, records.as_mut_ptr()) };
        if ret != ESP_OK {
            return Err(WifiError::ScanFailed { rc: ret });
        }

        let mut list = ScanList::new();
        for ap in records.iter().take(count as usize) {
            let len = ap.ssid.iter().position(|&b| b == 0).unwrap_or(ap.ssid.len());
            let mut entry = ScannedNetwork {
                ssid: heapless::String::new(),
                rssi_dbm: i32::from(ap.rssi),
                frequency_mhz: channel_to_mhz(ap.primary),
            };
            if let Ok(s) = core::str::from_utf8(&ap.ssid[..len]) {
                let _ = entry.ssid.push_str(s);
            }
            let _ = list.push(entry);
        }
        Ok(list)
    }

    fn forget_all(&mut self) -> Result<(), WifiError> {
        use esp_idf_svc::sys::*;

        self.ssid.clear();
        // SAFETY: disconnect then blank the stored STA config.
        unsafe {
            esp_wifi_disconnect();
            let mut cfg: wifi_config_t = core::mem::zeroed();
            let ret = esp_wifi_set_config(wifi_interface_t_WIFI_IF_STA, &mut cfg);
            if ret != ESP_OK {
                return Err(WifiError::ForgetFailed { rc: ret });
            }
        }
        Ok(())
    }
}

/// 2.4 GHz channel number → centre frequency.
#[cfg(target_os = "espidf")]
fn channel_to_mhz(channel: u8) -> u32 {
    match channel {
        14 => 2484,
        c @ 1..=13 => 2407 + u32::from(c) * 5,
        _ => 0,
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation — host targets
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    /// Simulated radio: associates after a couple of polls, sees the
    /// stored SSID at a healthy level plus one unrelated neighbour.
    pub struct SimRadio {
        pub polls_until_associated: u32,
        pub polls: u32,
        pub stored: bool,
    }

    impl SimRadio {
        pub fn new() -> Self {
            Self {
                polls_until_associated: 2,
                polls: 0,
                stored: false,
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiPort for WifiAdapter {
    fn store_network(&mut self, ssid: &str, _key: &str) -> Result<StoreOutcome, WifiError> {
        self.ssid.clear();
        let _ = self.ssid.push_str(ssid);
        self.sim.polls = 0;
        let outcome = if self.sim.stored {
            StoreOutcome::AlreadyStored
        } else {
            StoreOutcome::Stored
        };
        self.sim.stored = true;
        info!("wifi(sim): stored \"{ssid}\"");
        Ok(outcome)
    }

    fn current_network(&mut self) -> Option<ConnectedNetwork> {
        if !self.sim.stored {
            return None;
        }
        self.sim.polls += 1;
        if self.sim.polls <= self.sim.polls_until_associated {
            return None;
        }
        let mut network = ConnectedNetwork::default();
        let _ = network.ssid.push_str(self.ssid.as_str());
        network.bssid = [0x3a, 0x71, 0x0c, 0x42, 0x18, 0x9e];
        network.frequency_mhz = 2437;
        Some(network)
    }

    fn scan(&mut self) -> Result<usize, WifiError> {
        Ok(2)
    }

    fn scanned_networks(&mut self) -> Result<ScanList, WifiError> {
        let mut list = ScanList::new();
        let mut own = ScannedNetwork {
            ssid: heapless::String::new(),
            rssi_dbm: -58,
            frequency_mhz: 2437,
        };
        let _ = own.ssid.push_str(self.ssid.as_str());
        let _ = list.push(own);
        let mut other = ScannedNetwork {
            ssid: heapless::String::new(),
            rssi_dbm: -83,
            frequency_mhz: 2462,
        };
        let _ = other.ssid.push_str("warehouse-guest");
        let _ = list.push(other);
        Ok(list)
    }

    fn forget_all(&mut self) -> Result<(), WifiError> {
        self.sim.stored = false;
        self.ssid.clear();
        info!("wifi(sim): forgot all networks");
        Ok(())
    }
}
