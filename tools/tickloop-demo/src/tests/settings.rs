use tickloop::Millis;

use crate::{Settings, SettingsError};

#[test]
fn defaults_are_valid() {
    assert_eq!(Settings::default().validate(), Ok(()));
}

#[test]
fn zero_periods_are_rejected() {
    let settings = Settings {
        blink: Millis::ZERO,
        ..Settings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::ZeroPeriod { option: "blink-ms" })
    );

    let settings = Settings {
        link_poll: Millis::ZERO,
        ..Settings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::ZeroPeriod { option: "link-poll-ms" })
    );
}

#[test]
fn deadline_must_cover_one_poll() {
    let settings = Settings {
        link_poll: Millis::from_millis(200),
        deadline: Millis::from_millis(150),
        ..Settings::default()
    };
    let err = settings.validate().unwrap_err();

    assert_eq!(
        err,
        SettingsError::DeadlineBeforeFirstPoll {
            deadline: 150,
            poll: 200
        }
    );
    assert!(err.to_string().contains("--deadline-ms (150)"));
}

#[test]
fn heartbeat_count_must_be_positive() {
    let settings = Settings {
        heartbeats: 0,
        ..Settings::default()
    };
    assert_eq!(settings.validate(), Err(SettingsError::NoHeartbeats));
}
