use crate::protocol::StatusFields;
use crate::types::{ClimateState, Event};

/// Key-level changes between two status bodies as `(key, old, new)`.
pub(crate) fn diff_fields(
    previous: &StatusFields,
    current: &StatusFields,
) -> Vec<(String, Option<String>, Option<String>)> {
    let mut changes = Vec::new();
    for (key, value) in current {
        match previous.get(key) {
            Some(old) if old == value => {}
            old => changes.push((key.clone(), old.cloned(), Some(value.clone()))),
        }
    }
    for (key, old) in previous {
        if !current.contains_key(key) {
            changes.push((key.clone(), Some(old.clone()), None));
        }
    }
    changes
}

pub(crate) fn diff_state(previous: &ClimateState, current: &ClimateState) -> Vec<Event> {
    let mut events = Vec::new();

    if previous.current_temperature != current.current_temperature {
        events.push(Event::CurrentTemperatureChanged {
            temp: current.current_temperature,
        });
    }
    if previous.target_temperature != current.target_temperature {
        events.push(Event::TargetTemperatureChanged {
            temp: current.target_temperature,
        });
    }
    if previous.outside_temperature != current.outside_temperature {
        events.push(Event::OutsideTemperatureChanged {
            temp: current.outside_temperature,
        });
    }
    if previous.hvac_mode != current.hvac_mode {
        events.push(Event::HvacModeChanged {
            mode: current.hvac_mode,
        });
    }
    if previous.fan_mode != current.fan_mode {
        events.push(Event::FanModeChanged {
            mode: current.fan_mode,
        });
    }

    events
}
