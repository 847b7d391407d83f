//! Conversion of raw configuration text into typed values.

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use url::Url;
use uuid::Uuid;

use super::Configuration;
use crate::{DiError, DiResult};

const TICKS_PER_SECOND: u64 = 10_000_000;
const NANOS_PER_TICK: u64 = 100;

/// A type converted from a single raw configuration value.
///
/// Implemented for strings, primitives and the structured types the crate
/// knows. User types opt in with [`config_scalar!`](crate::config_scalar)
/// (through `FromStr`) or [`config_enum!`](crate::config_enum) (by variant
/// name).
pub trait ConfigScalar: Sized + Send + Sync + 'static {
    fn from_config_str(raw: &str) -> DiResult<Self>;
}

/// A type bound from a configuration key.
///
/// Scalars read the key's value; `Option<T>` tolerates a missing value;
/// sequences read the indexed children of the key.
pub trait ConfigBindable: Sized + Send + Sync + 'static {
    fn bind(configuration: &dyn Configuration, key: &str) -> DiResult<Self>;
}

fn conversion_error<T>(raw: &str) -> DiError {
    DiError::Conversion {
        target: std::any::type_name::<T>(),
        value: raw.to_string(),
    }
}

/// Binds a scalar, failing when the key has no value.
pub fn bind_scalar<T: ConfigScalar>(configuration: &dyn Configuration, key: &str) -> DiResult<T> {
    match configuration.get(key) {
        Some(raw) => T::from_config_str(&raw),
        None => Err(DiError::MissingConfiguration {
            key: key.to_string(),
            target: std::any::type_name::<T>(),
        }),
    }
}

fn bind_sequence<T: ConfigScalar>(configuration: &dyn Configuration, key: &str) -> DiResult<Vec<T>> {
    configuration
        .children(key)
        .into_iter()
        .map(|child| match child.value {
            Some(raw) => T::from_config_str(&raw),
            None => Err(DiError::MissingConfiguration {
                key: child.path,
                target: std::any::type_name::<T>(),
            }),
        })
        .collect()
}

/// Implements [`ConfigBindable`] for scalar types through [`bind_scalar`].
#[doc(hidden)]
#[macro_export]
macro_rules! __bindable_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::ConfigBindable for $ty {
            fn bind(configuration: &dyn $crate::Configuration, key: &str) -> $crate::DiResult<Self> {
                $crate::config::bind_scalar(configuration, key)
            }
        }
    )*};
}

/// Makes a `FromStr` type bindable from configuration.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{config_scalar, ConfigBindable, MemoryConfiguration};
/// use std::str::FromStr;
///
/// #[derive(Debug, PartialEq)]
/// struct Port(u16);
///
/// impl FromStr for Port {
///     type Err = std::num::ParseIntError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Port)
///     }
/// }
///
/// config_scalar!(Port);
///
/// let config = MemoryConfiguration::from_pairs([("Port", "8080")]);
/// assert_eq!(Port::bind(&config, "port").unwrap(), Port(8080));
/// ```
#[macro_export]
macro_rules! config_scalar {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::ConfigScalar for $ty {
            fn from_config_str(raw: &str) -> $crate::DiResult<Self> {
                <$ty as ::std::str::FromStr>::from_str(raw).map_err(|_| $crate::DiError::Conversion {
                    target: ::std::any::type_name::<$ty>(),
                    value: raw.to_string(),
                })
            }
        }

        $crate::__bindable_scalar!($ty);
    )+};
}

/// Makes a field-less enum bindable from configuration by variant name.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{config_enum, ConfigBindable, MemoryConfiguration};
///
/// #[derive(Debug, PartialEq)]
/// enum Level { Low, High }
///
/// config_enum!(Level { Low, High });
///
/// let config = MemoryConfiguration::from_pairs([("Level", "High")]);
/// assert_eq!(Level::bind(&config, "Level").unwrap(), Level::High);
/// ```
#[macro_export]
macro_rules! config_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::ConfigScalar for $ty {
            fn from_config_str(raw: &str) -> $crate::DiResult<Self> {
                match raw.trim() {
                    $(stringify!($variant) => Ok($ty::$variant),)+
                    _ => Err($crate::DiError::Conversion {
                        target: ::std::any::type_name::<$ty>(),
                        value: raw.to_string(),
                    }),
                }
            }
        }

        $crate::__bindable_scalar!($ty);
    };
}

impl ConfigScalar for String {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        Ok(raw.to_string())
    }
}

impl ConfigScalar for bool {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(conversion_error::<bool>(raw))
        }
    }
}

impl ConfigScalar for char {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(conversion_error::<char>(raw)),
        }
    }
}

macro_rules! trimmed_from_str {
    ($($ty:ty),* $(,)?) => {$(
        impl ConfigScalar for $ty {
            fn from_config_str(raw: &str) -> DiResult<Self> {
                raw.trim().parse::<$ty>().map_err(|_| conversion_error::<$ty>(raw))
            }
        }
    )*};
}

trimmed_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl ConfigScalar for PathBuf {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        Ok(PathBuf::from(raw))
    }
}

impl ConfigScalar for Duration {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        parse_time_span(raw).ok_or_else(|| conversion_error::<Duration>(raw))
    }
}

impl ConfigScalar for Url {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        Url::parse(raw.trim()).map_err(|_| conversion_error::<Url>(raw))
    }
}

impl ConfigScalar for Uuid {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        Uuid::parse_str(raw.trim()).map_err(|_| conversion_error::<Uuid>(raw))
    }
}

impl ConfigScalar for NaiveDate {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| conversion_error::<NaiveDate>(raw))
    }
}

impl ConfigScalar for NaiveTime {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        let trimmed = raw.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|_| conversion_error::<NaiveTime>(raw))
    }
}

impl ConfigScalar for NaiveDateTime {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        let trimmed = raw.trim();
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
            .or_else(|_| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .map_err(|_| conversion_error::<NaiveDateTime>(raw))
    }
}

impl ConfigScalar for DateTime<FixedOffset> {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| conversion_error::<DateTime<FixedOffset>>(raw))
    }
}

impl ConfigScalar for DateTime<Utc> {
    fn from_config_str(raw: &str) -> DiResult<Self> {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| conversion_error::<DateTime<Utc>>(raw))
    }
}

__bindable_scalar!(
    String, bool, char, PathBuf, Duration, Url, Uuid,
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr,
    NaiveDate, NaiveTime, NaiveDateTime, DateTime<FixedOffset>, DateTime<Utc>,
);

impl<T: ConfigScalar> ConfigBindable for Option<T> {
    fn bind(configuration: &dyn Configuration, key: &str) -> DiResult<Self> {
        configuration
            .get(key)
            .map(|raw| T::from_config_str(&raw))
            .transpose()
    }
}

impl<T: ConfigScalar> ConfigBindable for Vec<T> {
    fn bind(configuration: &dyn Configuration, key: &str) -> DiResult<Self> {
        bind_sequence(configuration, key)
    }
}

impl<T: ConfigScalar> ConfigBindable for Arc<[T]> {
    fn bind(configuration: &dyn Configuration, key: &str) -> DiResult<Self> {
        bind_sequence(configuration, key).map(Arc::from)
    }
}

impl<T: ConfigScalar> ConfigBindable for VecDeque<T> {
    fn bind(configuration: &dyn Configuration, key: &str) -> DiResult<Self> {
        bind_sequence(configuration, key).map(VecDeque::from)
    }
}

/// Parses the time-span format `[-][d.]hh:mm[:ss[.fffffff]]`, or a whole
/// number of days.
///
/// Negative spans are rejected: `Duration` cannot hold them.
pub fn parse_time_span(raw: &str) -> Option<Duration> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('-') {
        return None;
    }

    if !text.contains(':') {
        let days: u64 = parse_digits(text)?;
        return days.checked_mul(86_400).map(Duration::from_secs);
    }

    let mut parts = text.split(':');
    let head = parts.next()?;
    let minutes_part = parts.next()?;
    let seconds_part = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let (days, hours) = match head.split_once('.') {
        Some((d, h)) => (parse_digits(d)?, parse_digits(h)?),
        None => (0, parse_digits(head)?),
    };
    let minutes = parse_digits(minutes_part)?;

    let (seconds, ticks) = match seconds_part {
        None => (0, 0),
        Some(part) => match part.split_once('.') {
            Some((s, fraction)) => (parse_digits(s)?, parse_fraction(fraction)?),
            None => (parse_digits(part)?, 0),
        },
    };

    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let total_seconds = days
        .checked_mul(86_400)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    let nanos = u32::try_from(ticks * NANOS_PER_TICK).ok()?;
    Some(Duration::new(total_seconds, nanos))
}

fn parse_digits(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

// Up to seven fractional digits, in 100ns ticks
fn parse_fraction(text: &str) -> Option<u64> {
    if text.is_empty() || text.len() > 7 {
        return None;
    }
    let value = parse_digits(text)?;
    Some(value * 10u64.pow(7 - text.len() as u32))
}

/// Formats a duration as `[d.]hh:mm:ss[.fffffff]`.
pub fn format_time_span(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let ticks = u64::from(duration.subsec_nanos()) / NANOS_PER_TICK;

    let mut text = String::new();
    if days > 0 {
        text.push_str(&format!("{}.", days));
    }
    text.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if ticks > 0 {
        text.push_str(&format!(".{:07}", ticks % TICKS_PER_SECOND));
    }
    text
}
