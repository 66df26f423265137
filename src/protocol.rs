use std::collections::BTreeMap;

use crate::error::MalformedResponse;
use crate::types::{FanMode, HvacMode};

/// The unit only listens here.
pub const DEVICE_PORT: u16 = 2000;

pub const STATUS_PATH: &str = "/ac.cgi";
pub const SET_PATH: &str = "/set.cgi";

const KEY_ROOM_TEMP: &str = "roomtemp";
const KEY_SET_TEMP: &str = "settemp";
const KEY_OUTSIDE_TEMP: &str = "outsidetemp";
const KEY_OP_MODE: &str = "opmode";
const KEY_AC_MODE: &str = "acmode";
const KEY_FAN_SPEED: &str = "fanspeed";

/// Raw `key=value` pairs of a status body, values left undecoded.
pub type StatusFields = BTreeMap<String, String>;

/// Numeric view of a status body.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub room_temperature: f64,
    pub set_temperature: f64,
    pub outside_temperature: f64,
    pub hvac_mode: HvacMode,
    pub fan_mode: FanMode,
}

pub fn status_query(password: &str) -> String {
    format!("{STATUS_PATH}?pass={password}")
}

pub fn set_temperature_query(password: &str, temp: f64) -> String {
    format!("{SET_PATH}?pass={password}&t={temp:.5}")
}

pub fn set_fan_mode_query(password: &str, mode: FanMode) -> String {
    format!("{SET_PATH}?pass={password}&f={}", mode.to_wire())
}

pub fn set_hvac_mode_query(password: &str, mode: HvacMode) -> String {
    let (power, bits) = mode.to_wire();
    format!("{SET_PATH}?pass={password}&p={power}&m={bits}")
}

/// Mask the `pass` parameter so queries can be logged.
///
/// With the password known, exactly that text is masked, so a password
/// containing `&` does not leak its tail. Without it, the value runs to the next `&`.
pub fn redact(path_and_query: &str, password: Option<&str>) -> String {
    let Some(start) = path_and_query.find("pass=").map(|i| i + "pass=".len()) else {
        return path_and_query.to_string();
    };
    let rest = &path_and_query[start..];
    let len = match password {
        Some(pw) if rest.starts_with(pw) => pw.len(),
        _ => rest.find('&').unwrap_or(rest.len()),
    };
    format!("{}***{}", &path_and_query[..start], &rest[len..])
}

/// Split `k1=v1&k2=v2` into a map. Later duplicates win; empty tokens are skipped.
pub fn parse_status_body(body: &str) -> Result<StatusFields, MalformedResponse> {
    let mut fields = StatusFields::new();
    for token in body.trim().split('&').filter(|t| !t.is_empty()) {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| MalformedResponse::MissingSeparator(token.to_string()))?;
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

/// `outside_fallback` stands in for a missing `outsidetemp` key.
pub fn decode_status(
    fields: &StatusFields,
    outside_fallback: Option<f64>,
) -> Result<DeviceStatus, MalformedResponse> {
    let room_temperature = float_field(fields, KEY_ROOM_TEMP)?;
    let set_temperature = float_field(fields, KEY_SET_TEMP)?;
    let outside_temperature = match (fields.contains_key(KEY_OUTSIDE_TEMP), outside_fallback) {
        (false, Some(fallback)) => fallback,
        _ => float_field(fields, KEY_OUTSIDE_TEMP)?,
    };

    let opmode = int_field(fields, KEY_OP_MODE)?;
    let acmode = int_field(fields, KEY_AC_MODE)?;
    let hvac_mode = HvacMode::from_wire(opmode, acmode);

    let fanspeed = int_field(fields, KEY_FAN_SPEED)?;
    let fan_mode =
        FanMode::from_wire(fanspeed).ok_or(MalformedResponse::FanSpeedOutOfRange(fanspeed))?;

    Ok(DeviceStatus {
        room_temperature,
        set_temperature,
        outside_temperature,
        hvac_mode,
        fan_mode,
    })
}

fn raw_field<'a>(
    fields: &'a StatusFields,
    key: &'static str,
) -> Result<&'a str, MalformedResponse> {
    fields
        .get(key)
        .map(|v| v.trim())
        .ok_or(MalformedResponse::MissingKey(key))
}

fn float_field(fields: &StatusFields, key: &'static str) -> Result<f64, MalformedResponse> {
    let raw = raw_field(fields, key)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MalformedResponse::InvalidNumber {
            key,
            value: raw.to_string(),
        })
}

fn int_field(fields: &StatusFields, key: &'static str) -> Result<i64, MalformedResponse> {
    let raw = raw_field(fields, key)?;
    raw.parse::<i64>()
        .map_err(|_| MalformedResponse::InvalidNumber {
            key,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "opmode=1&units=.&settemp=24.0&fanspeed=2&fanflags=1&acmode=8\
        &tonact=0&toffact=0&prog=0&time=13:37&day=3&roomtemp=25&outsidetemp=31&louvre=1\
        &zone=0&flt=0&test=0&errcode=&sensors=1";

    fn fields(body: &str) -> StatusFields {
        parse_status_body(body).unwrap()
    }

    #[test]
    fn status_query_embeds_password() {
        assert_eq!(status_query("s3cret"), "/ac.cgi?pass=s3cret");
    }

    #[test]
    fn temperature_uses_five_decimals() {
        assert_eq!(
            set_temperature_query("pw", 21.5),
            "/set.cgi?pass=pw&t=21.50000"
        );
        assert_eq!(set_temperature_query("pw", 18.0), "/set.cgi?pass=pw&t=18.00000");
    }

    #[test]
    fn fan_and_mode_queries() {
        assert_eq!(set_fan_mode_query("pw", FanMode::High), "/set.cgi?pass=pw&f=3");
        assert_eq!(set_hvac_mode_query("pw", HvacMode::Cool), "/set.cgi?pass=pw&p=1&m=8");
        assert_eq!(set_hvac_mode_query("pw", HvacMode::Off), "/set.cgi?pass=pw&p=0&m=1");
        assert_eq!(
            set_hvac_mode_query("pw", HvacMode::FanOnly),
            "/set.cgi?pass=pw&p=1&m=16"
        );
    }

    #[test]
    fn redact_masks_password() {
        assert_eq!(redact("/set.cgi?pass=hunter2&f=1", None), "/set.cgi?pass=***&f=1");
        assert_eq!(redact("/ac.cgi?pass=hunter2", None), "/ac.cgi?pass=***");
        assert_eq!(redact("/ac.cgi", None), "/ac.cgi");
    }

    #[test]
    fn redact_masks_whole_password_containing_ampersand() {
        let pw = "ab&secretpart";
        let masked = redact(&set_fan_mode_query(pw, FanMode::Low), Some(pw));
        assert_eq!(masked, "/set.cgi?pass=***&f=1");
        assert!(!masked.contains("secretpart"));

        let masked = redact(&status_query(pw), Some(pw));
        assert_eq!(masked, "/ac.cgi?pass=***");
    }

    #[test]
    fn redact_with_empty_password() {
        assert_eq!(
            redact(&set_temperature_query("", 20.0), Some("")),
            "/set.cgi?pass=***&t=20.00000"
        );
    }

    #[test]
    fn parse_sample_body() {
        let f = fields(SAMPLE);
        assert_eq!(f["roomtemp"], "25");
        assert_eq!(f["time"], "13:37");
        assert_eq!(f["errcode"], "");
    }

    #[test]
    fn parse_last_duplicate_wins() {
        let f = fields("opmode=0&opmode=1");
        assert_eq!(f["opmode"], "1");
    }

    #[test]
    fn parse_keeps_values_undecoded() {
        let f = fields("name=Living%20Room&x=a=b");
        assert_eq!(f["name"], "Living%20Room");
        assert_eq!(f["x"], "a=b");
    }

    #[test]
    fn parse_rejects_token_without_separator() {
        let err = parse_status_body("roomtemp=25&garbage").unwrap_err();
        assert_eq!(err, MalformedResponse::MissingSeparator("garbage".to_string()));
    }

    #[test]
    fn parse_tolerates_trailing_newline_and_ampersand() {
        let f = fields("roomtemp=25&\r\n");
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn decode_sample_body() {
        let status = decode_status(&fields(SAMPLE), None).unwrap();
        assert_eq!(status.room_temperature, 25.0);
        assert_eq!(status.set_temperature, 24.0);
        assert_eq!(status.outside_temperature, 31.0);
        assert_eq!(status.hvac_mode, HvacMode::Cool);
        assert_eq!(status.fan_mode, FanMode::Medium);
    }

    #[test]
    fn power_off_overrides_mode_bits() {
        for acmode in [0, 1, 2, 4, 8, 16, 99] {
            assert_eq!(HvacMode::from_wire(0, acmode), HvacMode::Off);
        }
    }

    #[test]
    fn mode_bits_decode() {
        assert_eq!(HvacMode::from_wire(1, 1), HvacMode::Auto);
        assert_eq!(HvacMode::from_wire(1, 2), HvacMode::Heat);
        assert_eq!(HvacMode::from_wire(1, 4), HvacMode::Dry);
        assert_eq!(HvacMode::from_wire(1, 8), HvacMode::Cool);
        assert_eq!(HvacMode::from_wire(1, 16), HvacMode::FanOnly);
        assert_eq!(HvacMode::from_wire(1, 3), HvacMode::Off);
        assert_eq!(HvacMode::from_wire(1, 32), HvacMode::Off);
    }

    #[test]
    fn encoded_mode_decodes_back() {
        for mode in HvacMode::ALL {
            let (p, m) = mode.to_wire();
            assert_eq!(HvacMode::from_wire(p.into(), m.into()), mode);
        }
    }

    #[test]
    fn fan_speed_out_of_range_is_malformed() {
        for speed in ["0", "4", "-1"] {
            let body = SAMPLE.replace("fanspeed=2", &format!("fanspeed={speed}"));
            let err = decode_status(&fields(&body), None).unwrap_err();
            assert!(matches!(err, MalformedResponse::FanSpeedOutOfRange(_)), "{speed}: {err:?}");
        }
    }

    #[test]
    fn missing_key_is_malformed() {
        let body = SAMPLE.replace("fanspeed=2&", "");
        let err = decode_status(&fields(&body), None).unwrap_err();
        assert_eq!(err, MalformedResponse::MissingKey("fanspeed"));
    }

    #[test]
    fn non_numeric_temperature_is_malformed() {
        let body = SAMPLE.replace("roomtemp=25", "roomtemp=--");
        let err = decode_status(&fields(&body), None).unwrap_err();
        assert_eq!(
            err,
            MalformedResponse::InvalidNumber {
                key: "roomtemp",
                value: "--".to_string()
            }
        );
    }

    #[test]
    fn outside_fallback_only_when_key_absent() {
        let without = SAMPLE.replace("&outsidetemp=31", "");
        let status = decode_status(&fields(&without), Some(12.5)).unwrap();
        assert_eq!(status.outside_temperature, 12.5);

        let status = decode_status(&fields(SAMPLE), Some(12.5)).unwrap();
        assert_eq!(status.outside_temperature, 31.0);

        let err = decode_status(&fields(&without), None).unwrap_err();
        assert_eq!(err, MalformedResponse::MissingKey("outsidetemp"));
    }

    #[test]
    fn fractional_temperatures_parse_exactly() {
        let body = SAMPLE.replace("roomtemp=25", "roomtemp=23.75");
        let status = decode_status(&fields(&body), None).unwrap();
        assert_eq!(status.room_temperature, 23.75);
    }
}
