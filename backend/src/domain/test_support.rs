//! Fixtures shared by the domain service tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::ReferCodeSource;
use crate::domain::{DisplayName, EmailAddress, ReferCode, Role, User, UserId};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

/// Hands out a fixed sequence of refer codes, then repeats the last one.
pub(crate) struct ScriptedCodes {
    codes: Mutex<VecDeque<&'static str>>,
    last: &'static str,
}

impl ScriptedCodes {
    pub(crate) fn new(codes: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            codes: Mutex::new(codes.iter().copied().collect()),
            last: codes.last().copied().unwrap_or("ZZZZZZZZ"),
        })
    }
}

impl ReferCodeSource for ScriptedCodes {
    fn next_code(&self) -> ReferCode {
        let next = self
            .codes
            .lock()
            .expect("codes lock")
            .pop_front()
            .unwrap_or(self.last);
        ReferCode::from_trusted(next)
    }
}

pub(crate) fn make_user(email: &str, name: &str, code: &str, referrer: Option<&str>) -> User {
    User {
        id: UserId::random(),
        email: EmailAddress::new(email).expect("fixture email"),
        display_name: DisplayName::new(name).expect("fixture name"),
        role: Role::Member,
        refer_code: ReferCode::from_trusted(code),
        referrer_code: referrer.map(ReferCode::from_trusted),
        created_at: fixture_timestamp(),
    }
}
