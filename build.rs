fn main() {
    load_env_config();

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

/// Expose WiFi credentials and broker address to the firmware via `env!`.
/// Environment variables take priority over `.env` file values.
fn load_env_config() {
    println!("cargo:rerun-if-changed=.env");
    for key in ["WIFI_SSID", "WIFI_PASSWORD", "MQTT_BROKER"] {
        println!("cargo:rerun-if-env-changed={key}");
    }

    if std::path::Path::new(".env").exists() {
        if let Err(e) = dotenvy::dotenv() {
            println!("cargo:warning=Failed to load .env file: {e}");
        }
    }

    let read = |key: &str| {
        std::env::var(key)
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    let ssid = read("WIFI_SSID");
    let password = read("WIFI_PASSWORD");
    let mut broker = read("MQTT_BROKER");
    if broker.is_empty() {
        broker = "192.168.1.30".to_string();
    }

    println!("cargo:rustc-env=WIFI_SSID={ssid}");
    println!("cargo:rustc-env=WIFI_PASSWORD={password}");
    println!("cargo:rustc-env=MQTT_BROKER={broker}");

    if ssid.is_empty() {
        println!("cargo:warning=WIFI_SSID is empty - WiFi bring-up will fail at boot");
    }
}
