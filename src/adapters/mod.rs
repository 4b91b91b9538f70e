//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements                         | Connects to                  |
//! |------------|------------------------------------|------------------------------|
//! | `hal`      | LaserOutputPort                    | embedded-hal pin + PWM, board timer |
//! | `sim`      | LaserOutputPort, PulseOutputPort   | In-memory timer registers    |
//! | `log_sink` | EventSink                          | `log` output                 |
//! | `nvs`      | SettingsStore                      | In-memory settings blob      |

pub mod hal;
pub mod log_sink;
pub mod nvs;
pub mod sim;
