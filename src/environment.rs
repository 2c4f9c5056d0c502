//! Facts about the environment the lights are running in.
//!
//! Two collaborators feed the standing policy: a day/night oracle computed
//! from the configured location, and a probe telling whether another host
//! on the network is up.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::runtime::{self, BoxFuture};

type Result<T> = std::result::Result<T, Error>;

/// Answers whether the sun is up.
pub trait DayNight: Send + Sync {
    fn is_day(&self) -> bool;

    fn is_night(&self) -> bool {
        !self.is_day()
    }
}

/// Answers whether a host is up, given `host` (ping) or `host:port` (TCP connect).
pub trait HostProbe: Send + Sync {
    fn is_up<'a>(&'a self, address: &'a str) -> BoxFuture<'a, bool>;
}

/// Geographic location of the lights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees, north positive
    pub latitude: f64,
    /// Longitude in decimal degrees, east positive
    pub longitude: f64,
    /// IANA time zone name, e.g. `Europe/Berlin`
    pub timezone: String,
    /// Elevation in meters
    #[serde(default)]
    pub elevation: f64,
}

/// Sun altitude below the horizon at sunrise and sunset, with refraction.
const SUNRISE_ALTITUDE: f64 = -0.833;
/// Sun altitude at civil dawn and dusk.
const CIVIL_TWILIGHT_ALTITUDE: f64 = -6.0;
const J2000: f64 = 2451545.0;
const UNIX_EPOCH_JD: f64 = 2440587.5;
/// 2000-01-01 counted from 0001-01-01 as day 1.
const J2000_DAYS_FROM_CE: i32 = 730120;

/// Day/night oracle based on the computed sunrise and sunset of the current date.
#[derive(Debug, Clone)]
pub struct SolarDayNight {
    location: Location,
    timezone: Tz,
}

/// Sun events of one date. `None` when the event does not happen that day
/// (polar day or night).
#[derive(Debug, Clone)]
pub struct SunTimes {
    pub dawn: Option<DateTime<Tz>>,
    pub sunrise: Option<DateTime<Tz>>,
    pub noon: Option<DateTime<Tz>>,
    pub sunset: Option<DateTime<Tz>>,
    pub dusk: Option<DateTime<Tz>>,
}

enum HourAngle {
    /// The sun stays above the altitude all day
    AlwaysAbove,
    /// The sun stays below the altitude all day
    AlwaysBelow,
    /// Half the time between crossing the altitude upwards and downwards, in degrees
    Degrees(f64),
}

struct SolarDay {
    transit: f64,
    declination: f64,
}

impl SolarDayNight {
    pub fn new(location: Location) -> Result<Self> {
        let timezone = location.timezone.parse::<Tz>().map_err(|_| {
            Error::invalid_parameter("timezone", "an IANA time zone name", &location.timezone)
        })?;
        if !(-90.0..=90.0).contains(&location.latitude) {
            return Err(Error::invalid_parameter(
                "latitude",
                "degrees between -90 and 90",
                location.latitude,
            ));
        }
        if !(-180.0..=180.0).contains(&location.longitude) {
            return Err(Error::invalid_parameter(
                "longitude",
                "degrees between -180 and 180",
                location.longitude,
            ));
        }
        Ok(SolarDayNight { location, timezone })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Day means strictly between sunrise and sunset of the local date.
    pub fn is_day_at(&self, at: DateTime<Utc>) -> bool {
        let date = at.with_timezone(&self.timezone).date_naive();
        let day = self.solar_day(date);
        match self.hour_angle(&day, self.horizon_altitude()) {
            HourAngle::AlwaysAbove => true,
            HourAngle::AlwaysBelow => false,
            HourAngle::Degrees(omega) => {
                let at_jd = at.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD;
                day.transit - omega / 360.0 < at_jd && at_jd < day.transit + omega / 360.0
            }
        }
    }

    pub fn sun_times(&self, date: NaiveDate) -> SunTimes {
        let day = self.solar_day(date);
        let event = |altitude: f64, rising: bool| match self.hour_angle(&day, altitude) {
            HourAngle::Degrees(omega) => {
                let offset = omega / 360.0;
                let jd = if rising {
                    day.transit - offset
                } else {
                    day.transit + offset
                };
                self.from_julian(jd)
            }
            HourAngle::AlwaysAbove | HourAngle::AlwaysBelow => None,
        };

        SunTimes {
            dawn: event(CIVIL_TWILIGHT_ALTITUDE, true),
            sunrise: event(self.horizon_altitude(), true),
            noon: self.from_julian(day.transit),
            sunset: event(self.horizon_altitude(), false),
            dusk: event(CIVIL_TWILIGHT_ALTITUDE, false),
        }
    }

    /// Sun times of today in the configured time zone.
    pub fn overview(&self) -> SunTimes {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        self.sun_times(today)
    }

    /// Observers above sea level see the sun earlier.
    fn horizon_altitude(&self) -> f64 {
        SUNRISE_ALTITUDE - 2.076 * self.location.elevation.max(0.0).sqrt() / 60.0
    }

    fn solar_day(&self, date: NaiveDate) -> SolarDay {
        let n = (date.num_days_from_ce() - J2000_DAYS_FROM_CE) as f64;
        let mean_solar_noon = n - self.location.longitude / 360.0;
        let anomaly = (357.5291 + 0.98560028 * mean_solar_noon).rem_euclid(360.0);
        let m = anomaly.to_radians();
        let center = 1.9148 * m.sin() + 0.0200 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin();
        let ecliptic_longitude = (anomaly + center + 180.0 + 102.9372).rem_euclid(360.0);
        let lambda = ecliptic_longitude.to_radians();
        let transit = J2000 + mean_solar_noon + 0.0053 * m.sin() - 0.0069 * (2.0 * lambda).sin();
        let declination = (lambda.sin() * 23.4397_f64.to_radians().sin()).asin();
        SolarDay {
            transit,
            declination,
        }
    }

    fn hour_angle(&self, day: &SolarDay, altitude: f64) -> HourAngle {
        let phi = self.location.latitude.to_radians();
        let cos_omega = (altitude.to_radians().sin() - phi.sin() * day.declination.sin())
            / (phi.cos() * day.declination.cos());
        if cos_omega < -1.0 {
            HourAngle::AlwaysAbove
        } else if cos_omega > 1.0 {
            HourAngle::AlwaysBelow
        } else {
            HourAngle::Degrees(cos_omega.acos().to_degrees())
        }
    }

    fn from_julian(&self, jd: f64) -> Option<DateTime<Tz>> {
        let millis = ((jd - UNIX_EPOCH_JD) * 86_400_000.0).round() as i64;
        DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(&self.timezone))
    }
}

impl DayNight for SolarDayNight {
    fn is_day(&self) -> bool {
        self.is_day_at(Utc::now())
    }
}

impl fmt::Display for SunTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |time: Option<&DateTime<Tz>>| {
            time.map_or_else(
                || "-".to_string(),
                |t| t.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
            )
        };
        writeln!(f, "Dawn:    {}", show(self.dawn.as_ref()))?;
        writeln!(f, "Sunrise: {}", show(self.sunrise.as_ref()))?;
        writeln!(f, "Noon:    {}", show(self.noon.as_ref()))?;
        writeln!(f, "Sunset:  {}", show(self.sunset.as_ref()))?;
        write!(f, "Dusk:    {}", show(self.dusk.as_ref()))
    }
}

/// Probes hosts with a TCP connect (`host:port`) or one ICMP echo (`host`).
///
/// ICMP goes through the system `ping` utility, so no raw socket privileges
/// are needed.
#[derive(Debug, Clone)]
pub struct AddressProbe {
    timeout: Duration,
}

impl Default for AddressProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    pub fn new() -> Self {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        AddressProbe { timeout }
    }

    /// Whether a TCP connection to `host:port` can be opened.
    pub async fn open_port(&self, host: &str, port: u16) -> bool {
        let connect = tokio::net::TcpStream::connect((host, port));
        matches!(runtime::timeout(self.timeout, connect).await, Ok(Ok(_)))
    }

    /// Whether `host` answers one ping.
    pub async fn ping(&self, host: &str) -> bool {
        let wait = self.timeout.as_secs().max(1).to_string();
        let status = tokio::process::Command::new("ping")
            .args(["-c", "1", "-W", &wait, host])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        match runtime::timeout(self.timeout + Duration::from_secs(1), status).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!("failed to run ping: {e}");
                false
            }
            Err(_) => false,
        }
    }
}

/// `host:port` when the part after the last colon is a port number and the
/// host is not a bare IPv6 address.
fn split_port(address: &str) -> Option<(&str, u16)> {
    let (host, port) = address.rsplit_once(':')?;
    if host.is_empty() || host.contains(':') {
        return None;
    }
    port.parse().ok().map(|port| (host, port))
}

impl HostProbe for AddressProbe {
    fn is_up<'a>(&'a self, address: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let up = match split_port(address) {
                Some((host, port)) => self.open_port(host, port).await,
                None => self.ping(address).await,
            };
            debug!("host {address} is {}", if up { "up" } else { "down" });
            up
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn nuremberg() -> SolarDayNight {
        SolarDayNight::new(Location {
            latitude: 49.455556,
            longitude: 11.078611,
            timezone: "Europe/Berlin".to_string(),
            elevation: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn test_is_day_and_night() {
        let day_night = nuremberg();
        let noon = Utc.with_ymd_and_hms(2000, 1, 1, 11, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2000, 1, 1, 22, 0, 0).unwrap();
        assert!(day_night.is_day_at(noon));
        assert!(!day_night.is_day_at(late));
    }

    #[test]
    fn test_sunrise_close_to_reference() {
        let times = nuremberg().sun_times(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let sunrise = times.sunrise.unwrap().with_timezone(&Utc);
        let reference = Utc.with_ymd_and_hms(2000, 1, 1, 7, 11, 49).unwrap();
        assert!((sunrise - reference).num_seconds().abs() < 300, "{sunrise}");

        let sunset = times.sunset.unwrap().with_timezone(&Utc);
        let reference = Utc.with_ymd_and_hms(2000, 1, 1, 15, 25, 40).unwrap();
        assert!((sunset - reference).num_seconds().abs() < 300, "{sunset}");

        assert!(times.dawn.unwrap() < times.sunrise.unwrap());
        assert!(times.dusk.unwrap() > times.sunset.unwrap());
    }

    #[test]
    fn test_polar_night() {
        let tromso = SolarDayNight::new(Location {
            latitude: 69.65,
            longitude: 18.96,
            timezone: "Europe/Oslo".to_string(),
            elevation: 0.0,
        })
        .unwrap();
        let noon = Utc.with_ymd_and_hms(2000, 12, 21, 11, 0, 0).unwrap();
        assert!(!tromso.is_day_at(noon));
        assert!(tromso.sun_times(noon.date_naive()).sunrise.is_none());
    }

    #[test]
    fn test_overview_format() {
        let text = nuremberg()
            .sun_times(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
            .to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("Sunrise: 2000-01-01 08:"));
        assert!(lines[1].ends_with("+01:00"));
    }

    #[test]
    fn test_invalid_timezone() {
        let err = SolarDayNight::new(Location {
            latitude: 0.0,
            longitude: 0.0,
            timezone: "Mars/Olympus".to_string(),
            elevation: 0.0,
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref field, .. } if field == "timezone"));
    }

    #[test]
    fn test_split_port() {
        assert_eq!(split_port("192.168.3.11:22"), Some(("192.168.3.11", 22)));
        assert_eq!(split_port("192.168.3.11"), None);
        assert_eq!(split_port("fe80::1"), None);
        assert_eq!(split_port("host:http"), None);
    }

    #[tokio::test]
    async fn test_open_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let probe = AddressProbe::with_timeout(Duration::from_secs(1));
        assert!(probe.is_up(&format!("127.0.0.1:{port}")).await);

        drop(listener);
        assert!(!probe.is_up(&format!("127.0.0.1:{port}")).await);
    }
}
