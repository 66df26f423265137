use serde::Deserialize;

use crate::client::SkyFiClientBuilder;

/// Device entry as it appears in a host's configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceConfig {
    pub host: String,
    pub password: String,
    #[serde(default)]
    pub outside_temperature: Option<f64>,
}

impl DeviceConfig {
    pub fn into_builder(self) -> SkyFiClientBuilder {
        let builder = SkyFiClientBuilder::new(self.host).password(self.password);
        match self.outside_temperature {
            Some(temp) => builder.outside_temperature(temp),
            None => builder,
        }
    }
}
