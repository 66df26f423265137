use std::time::Duration;

use tracing::{debug, trace};

use crate::diff::diff_state;
use crate::error::{BuildError, CommandError, RefreshError};
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    DEVICE_PORT, decode_status, parse_status_body, redact, set_fan_mode_query,
    set_hvac_mode_query, set_temperature_query, status_query,
};
use crate::transport::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT, HttpTransport};
use crate::types::*;

const DEFAULT_NAME: &str = "Daikin";
const DEFAULT_CURRENT_TEMPERATURE: f64 = 22.0;
const DEFAULT_TARGET_TEMPERATURE: f64 = 20.0;
const DEFAULT_OUTSIDE_TEMPERATURE: f64 = 20.0;

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;
type StateCallback = Box<dyn Fn(&ClimateState) + Send + Sync>;

pub struct SkyFiClientBuilder {
    host: String,
    port: u16,
    password: String,
    name: String,
    outside_temperature: Option<f64>,
    target_temperature: Option<f64>,
    fan_mode: Option<FanMode>,
    hvac_mode: HvacMode,
    hvac_modes: Vec<HvacMode>,
    max_attempts: u32,
    retry_delay: Duration,
    timeout: Duration,
    event_callbacks: Vec<EventCallback>,
    state_callbacks: Vec<StateCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl SkyFiClientBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEVICE_PORT,
            password: String::new(),
            name: DEFAULT_NAME.to_string(),
            outside_temperature: None,
            target_temperature: Some(DEFAULT_TARGET_TEMPERATURE),
            fan_mode: Some(FanMode::Low),
            hvac_mode: HvacMode::Cool,
            hvac_modes: HvacMode::ALL.to_vec(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
            event_callbacks: Vec::new(),
            state_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Only useful for reaching something other than a real unit.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Initial outside temperature, also used when a status omits `outsidetemp`.
    pub fn outside_temperature(mut self, temp: f64) -> Self {
        self.outside_temperature = Some(temp);
        self
    }

    /// `None` drops the target temperature feature.
    pub fn target_temperature(mut self, temp: Option<f64>) -> Self {
        self.target_temperature = temp;
        self
    }

    /// `None` drops the fan mode feature.
    pub fn fan_mode(mut self, mode: Option<FanMode>) -> Self {
        self.fan_mode = mode;
        self
    }

    pub fn hvac_mode(mut self, mode: HvacMode) -> Self {
        self.hvac_mode = mode;
        self
    }

    pub fn hvac_modes(mut self, modes: Vec<HvacMode>) -> Self {
        self.hvac_modes = modes;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    /// Called after every successful refresh and command.
    pub fn on_state_change(mut self, f: impl Fn(&ClimateState) + Send + Sync + 'static) -> Self {
        self.state_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SkyFiClient, BuildError> {
        let transport = HttpTransport::new(
            &self.host,
            self.port,
            self.timeout,
            self.max_attempts,
            self.retry_delay,
        )?
        .with_password(self.password.clone());

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        let mut features = SupportedFeatures::NONE;
        if self.target_temperature.is_some() {
            features = features | SupportedFeatures::TARGET_TEMPERATURE;
        }
        if self.fan_mode.is_some() {
            features = features | SupportedFeatures::FAN_MODE;
        }
        if self.hvac_modes.contains(&HvacMode::Auto) {
            features = features | SupportedFeatures::TARGET_TEMPERATURE_RANGE;
        }

        let state = ClimateState {
            current_temperature: DEFAULT_CURRENT_TEMPERATURE,
            target_temperature: self.target_temperature,
            target_temperature_low: None,
            target_temperature_high: None,
            outside_temperature: self
                .outside_temperature
                .unwrap_or(DEFAULT_OUTSIDE_TEMPERATURE),
            hvac_mode: self.hvac_mode,
            fan_mode: self.fan_mode.unwrap_or(FanMode::Low),
            supported_features: features,
        };

        debug!(host = %self.host, port = self.port, name = %self.name, "configured SkyFi client");

        Ok(SkyFiClient {
            transport,
            password: self.password,
            name: self.name,
            outside_override: self.outside_temperature,
            hvac_modes: self.hvac_modes,
            state,
            event_callbacks: self.event_callbacks,
            state_callbacks: self.state_callbacks,
            logger,
        })
    }
}

/// One SkyFi unit. Operations take `&mut self`, so calls against a client
/// are serialized by construction.
pub struct SkyFiClient {
    transport: HttpTransport,
    password: String,
    name: String,
    outside_override: Option<f64>,
    hvac_modes: Vec<HvacMode>,
    state: ClimateState,
    event_callbacks: Vec<EventCallback>,
    state_callbacks: Vec<StateCallback>,
    logger: Option<MessageLogger>,
}

impl SkyFiClient {
    pub fn builder(host: impl Into<String>) -> SkyFiClientBuilder {
        SkyFiClientBuilder::new(host)
    }

    /// Poll `/ac.cgi` and overwrite temperatures, mode and fan speed.
    ///
    /// Nothing is changed unless the whole status body decodes.
    pub async fn refresh(&mut self) -> Result<(), RefreshError> {
        let path = status_query(&self.password);
        if let Some(ref mut logger) = self.logger {
            logger.log_request(&redact(&path, Some(&self.password)));
        }

        let body = self.transport.query(&path).await?;
        trace!(body = %body, "status body");

        let fields = parse_status_body(&body)?;
        if let Some(ref mut logger) = self.logger {
            logger.log_status(&fields);
        }
        let status = decode_status(&fields, self.outside_override)?;

        let mut next = self.state.clone();
        next.current_temperature = status.room_temperature;
        next.target_temperature = Some(status.set_temperature);
        next.outside_temperature = status.outside_temperature;
        next.hvac_mode = status.hvac_mode;
        next.fan_mode = status.fan_mode;
        self.apply(next);
        Ok(())
    }

    pub fn snapshot(&self) -> ClimateState {
        self.state.clone()
    }

    pub fn state(&self) -> &ClimateState {
        &self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supported_features(&self) -> SupportedFeatures {
        self.state.supported_features
    }

    pub fn hvac_modes(&self) -> &[HvacMode] {
        &self.hvac_modes
    }

    pub fn fan_modes(&self) -> &'static [FanMode] {
        &FanMode::ALL
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        TemperatureUnit::CELSIUS
    }

    /// The unit never pushes updates.
    pub fn should_poll(&self) -> bool {
        true
    }

    // -- Command methods --

    /// Send a new setpoint. The response body is not checked.
    pub async fn set_target_temperature(&mut self, temp: f64) -> Result<(), CommandError> {
        let path = set_temperature_query(&self.password, temp);
        self.send_command("set_target_temperature", &path).await?;

        let mut next = self.state.clone();
        next.target_temperature = Some(temp);
        self.apply(next);
        Ok(())
    }

    /// Accepted in any mode; the unit keeps it for the next power-on.
    pub async fn set_fan_mode(&mut self, mode: FanMode) -> Result<(), CommandError> {
        let path = set_fan_mode_query(&self.password, mode);
        self.send_command("set_fan_mode", &path).await?;

        let mut next = self.state.clone();
        next.fan_mode = mode;
        self.apply(next);
        Ok(())
    }

    pub async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<(), CommandError> {
        let path = set_hvac_mode_query(&self.password, mode);
        self.send_command("set_hvac_mode", &path).await?;

        let mut next = self.state.clone();
        next.hvac_mode = mode;
        self.apply(next);
        Ok(())
    }

    // -- Helpers --

    async fn send_command(&mut self, action: &str, path: &str) -> Result<(), CommandError> {
        let redacted = redact(path, Some(&self.password));
        debug!(action, path = %redacted, "sending command");
        if let Some(ref mut logger) = self.logger {
            logger.log_command(action, &redacted);
        }

        self.transport.query(path).await?;
        Ok(())
    }

    fn apply(&mut self, next: ClimateState) {
        let events = diff_state(&self.state, &next);
        self.state = next;

        for event in &events {
            for cb in &self.event_callbacks {
                cb(event);
            }
        }
        for cb in &self.state_callbacks {
            cb(&self.state);
        }

        if !events.is_empty() {
            debug!(count = events.len(), "state changed");
        }
    }
}
