//! Field-level preconditions checked before any endpoint work. Every check is
//! pure and the first failure wins.

use chrono::{DateTime, Duration, Utc};
use ras_error::RasValidationError;
use ras_types::{DbmsKind, DropMode};
use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

pub const MAX_NAME_CHARS: usize = 64;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}_-]+$").expect("The infobase name regex should be valid")
});

fn invalid(field: &'static str, message: impl Into<String>) -> RasValidationError {
    let message: String = message.into();
    ValidationError::new(field).with_message(message.into()).into()
}

fn require_id(field: &'static str, value: &str) -> Result<(), RasValidationError> {
    if value.trim().is_empty() {
        return Err(invalid(field, format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_cluster_id(cluster_id: &str) -> Result<(), RasValidationError> {
    require_id("cluster_id", cluster_id)
}

pub fn validate_infobase_id(infobase_id: &str) -> Result<(), RasValidationError> {
    require_id("infobase_id", infobase_id)
}

pub fn validate_session_id(session_id: &str) -> Result<(), RasValidationError> {
    require_id("session_id", session_id)
}

pub fn validate_user(user: Option<&str>) -> Result<(), RasValidationError> {
    require_id("user", user.unwrap_or_default())
}

/// Names are up to 64 code points of Unicode letters, Unicode digits, `_`
/// and `-`.
pub fn validate_name(name: &str) -> Result<(), RasValidationError> {
    if name.is_empty() {
        return Err(invalid("name", "name is required"));
    }
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(invalid(
            "name",
            format!("name must not exceed {MAX_NAME_CHARS} characters, got {chars}"),
        ));
    }
    if !NAME_RE.is_match(name) {
        return Err(invalid(
            "name",
            "name may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

pub fn validate_dbms(dbms: Option<DbmsKind>) -> Result<DbmsKind, RasValidationError> {
    dbms.ok_or_else(|| invalid("dbms", "dbms is required"))
}

/// Every supported DBMS is server based, so a create needs both the server
/// and the database name.
pub fn validate_server_fields(
    dbms: DbmsKind,
    db_server: &str,
    db_name: &str,
) -> Result<(), RasValidationError> {
    if db_server.trim().is_empty() {
        return Err(invalid(
            "db_server",
            format!("db_server is required for {dbms} infobases"),
        ));
    }
    if db_name.trim().is_empty() {
        return Err(invalid(
            "db_name",
            format!("db_name is required for {dbms} infobases"),
        ));
    }
    Ok(())
}

pub fn validate_drop_mode(mode: Option<DropMode>) -> Result<DropMode, RasValidationError> {
    mode.ok_or_else(|| invalid("drop_mode", "drop_mode is required"))
}

/// Checks an optional deny window against `now`. Windows shorter than a
/// minute are accepted but logged.
pub fn validate_lock_schedule(
    denied_from: Option<DateTime<Utc>>,
    denied_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), RasValidationError> {
    let (from, to) = match (denied_from, denied_to) {
        (None, None) => return Ok(()),
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Err(invalid(
                "denied_from",
                "denied_from and denied_to must be set together",
            ))
        }
    };
    if to <= from {
        return Err(invalid("denied_to", "denied_to must be after denied_from"));
    }
    if to < now {
        return Err(invalid("denied_to", "denied_to must not be in the past"));
    }
    if to - from < Duration::minutes(1) {
        tracing::warn!(
            denied_from = %from,
            denied_to = %to,
            "lock window is shorter than one minute"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    #[test]
    fn test_ids_must_not_be_blank() {
        assert!(validate_cluster_id("c1").is_ok());
        let err = validate_cluster_id("   ").unwrap_err();
        assert_eq!(err.field(), "cluster_id");
        assert_eq!(err.to_string(), "cluster_id is required");
        assert_eq!(validate_infobase_id("").unwrap_err().field(), "infobase_id");
        assert_eq!(validate_session_id("\t").unwrap_err().field(), "session_id");
        assert!(validate_user(Some("admin")).is_ok());
        assert_eq!(validate_user(None).unwrap_err().to_string(), "user is required");
    }

    #[test]
    fn test_names_in_several_scripts_are_accepted() {
        for name in ["accounting_2024", "Бухгалтерия-2", "会計システム", "a"] {
            assert!(validate_name(name).is_ok(), "{name} should be accepted");
        }
        assert!(validate_name(&"я".repeat(MAX_NAME_CHARS)).is_ok());
    }

    #[test]
    fn test_bad_names_are_rejected() {
        for name in ["", "has space", "dot.name", "emoji😀", "semi;colon", "sum+sign"] {
            assert!(validate_name(name).is_err(), "{name:?} should be rejected");
        }
        assert!(validate_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_server_fields_are_required() {
        assert!(validate_server_fields(DbmsKind::PostgreSql, "pg01", "acc").is_ok());
        let err = validate_server_fields(DbmsKind::PostgreSql, " ", "acc").unwrap_err();
        assert_eq!(err.field(), "db_server");
        assert_eq!(err.to_string(), "db_server is required for PostgreSQL infobases");
        assert_eq!(
            validate_server_fields(DbmsKind::MssqlServer, "sql01", "")
                .unwrap_err()
                .field(),
            "db_name"
        );
    }

    #[test]
    fn test_dbms_and_drop_mode_are_required() {
        assert_eq!(validate_dbms(Some(DbmsKind::IbmDb2)).unwrap(), DbmsKind::IbmDb2);
        assert_eq!(validate_dbms(None).unwrap_err().to_string(), "dbms is required");
        assert_eq!(
            validate_drop_mode(None).unwrap_err().to_string(),
            "drop_mode is required"
        );
    }

    #[test]
    fn test_lock_schedule_rules() {
        let now = Utc::now();
        let hour = Duration::hours(1);
        assert!(validate_lock_schedule(None, None, now).is_ok());
        assert!(validate_lock_schedule(Some(now), Some(now + hour), now).is_ok());
        assert!(validate_lock_schedule(Some(now), None, now).is_err());
        assert!(validate_lock_schedule(None, Some(now + hour), now).is_err());
        assert!(validate_lock_schedule(Some(now + hour), Some(now), now).is_err());
        assert!(validate_lock_schedule(Some(now), Some(now), now).is_err());
        let err =
            validate_lock_schedule(Some(now - hour - hour), Some(now - hour), now).unwrap_err();
        assert_eq!(err.to_string(), "denied_to must not be in the past");
    }

    #[traced_test]
    #[test]
    fn test_short_lock_window_is_accepted_with_warning() {
        let now = Utc::now();
        assert!(validate_lock_schedule(Some(now), Some(now + Duration::seconds(30)), now).is_ok());
        assert!(logs_contain("lock window is shorter than one minute"));
    }

    proptest! {
        #[test]
        fn names_from_the_allowed_alphabet_pass(name in r"[\p{L}\p{N}_-]{1,64}") {
            prop_assert!(validate_name(&name).is_ok());
        }

        #[test]
        fn names_with_a_space_fail(prefix in "[a-z]{0,10}", suffix in "[a-z]{0,10}") {
            let name = format!("{prefix} {suffix}");
            prop_assert!(validate_name(&name).is_err());
        }

        #[test]
        fn names_over_the_limit_fail(extra in 1usize..32) {
            let name = "ж".repeat(MAX_NAME_CHARS + extra);
            prop_assert!(validate_name(&name).is_err());
        }
    }
}
