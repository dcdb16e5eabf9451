//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                    |
//! |------------|-------------------|--------------------------------|
//! | `hardware` | GpioPort          | ESP32 GPIO matrix / sim bench  |
//! |            | SerialPort        | ESP32 UART driver / sim echo   |
//! | `log_sink` | EventSink         | Serial log output              |
//! | `time`     | TimePort          | esp_timer / std Instant        |
//! | `wifi`     | WifiPort          | ESP-IDF STA stack / sim radio  |

pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod wifi;
