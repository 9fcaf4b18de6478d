use serde::{Deserialize, Serialize};

/// Main configuration file, loaded (and written back with defaults filled
/// in on first run) by `confy`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP endpoint exposing the read-only device registry query surface.
    pub http_server: Option<HttpServer>,

    /// Simulated devices the discovery plugin brings up on startup, in
    /// place of real USB/PCI/DMI enumeration.
    #[serde(rename = "simulated_device")]
    pub simulated_devices: Vec<SimulatedDevice>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_server: Some(HttpServer {
                bind_address: Some("127.0.0.1:5390".to_string()),
            }),
            simulated_devices: vec![SimulatedDevice {
                id: "deadbeef00".to_string(),
                name: "Example Device".to_string(),
                guid: Some("6c35f197-7123-4c0e-9d1f-7a3b6e9f6a2e".to_string()),
                remove_delay_secs: 5,
            }],
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServer {
    /// Address used to bind the listening socket accepting HTTP connections.
    pub bind_address: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedDevice {
    /// Primary device id reported by the discovery plugin.
    pub id: String,

    pub name: String,

    /// GUID this device carries, if any.
    pub guid: Option<String>,

    /// How long the registry waits after this device is "unplugged"
    /// before treating it as truly gone.
    pub remove_delay_secs: u64,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            guid: None,
            remove_delay_secs: 0,
        }
    }
}
