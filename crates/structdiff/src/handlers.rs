//! Pluggable type handlers for opaque and special types.
//!
//! Handlers form an ordered registry: the first handler claiming a type
//! takes exclusive responsibility for comparing its values. A handler error
//! aborts the whole comparison.

use chrono::{DateTime, Utc};

use structdiff_value::{TypeTag, Value, CALLABLE_TYPE, CHANNEL_TYPE, TIMESTAMP_TYPE};

use crate::record::DiffRecord;

/// A pluggable comparison strategy claiming exclusive responsibility for a
/// specific type.
pub trait TypeHandler {
    /// Handler name, used in error reports.
    fn name(&self) -> &'static str;

    /// Whether this handler claims values of the given type.
    fn can_handle(&self, tag: &TypeTag<'_>) -> bool;

    /// Compare two claimed values, appending any differences.
    fn compare(
        &self,
        path: &str,
        left: &Value,
        right: &Value,
        records: &mut Vec<DiffRecord>,
    ) -> Result<(), String>;
}

/// The stock handler registry: timestamps, callables, channels.
pub fn default_type_handlers() -> Vec<Box<dyn TypeHandler>> {
    vec![
        Box::new(TimestampHandler),
        Box::new(CallableHandler),
        Box::new(ChannelHandler),
    ]
}

/// Compares timestamp opaques by instant.
#[derive(Debug, Default)]
pub struct TimestampHandler;

impl TypeHandler for TimestampHandler {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn can_handle(&self, tag: &TypeTag<'_>) -> bool {
        matches!(tag, TypeTag::Opaque(name) if *name == TIMESTAMP_TYPE)
    }

    fn compare(
        &self,
        path: &str,
        left: &Value,
        right: &Value,
        records: &mut Vec<DiffRecord>,
    ) -> Result<(), String> {
        let left_instant = instant_of(left)?;
        let right_instant = instant_of(right)?;
        if left_instant != right_instant {
            records.push(DiffRecord::Value {
                path: path.to_string(),
                left: Some(left.clone()),
                right: Some(right.clone()),
            });
        }
        Ok(())
    }
}

fn instant_of(value: &Value) -> Result<DateTime<Utc>, String> {
    let Value::Opaque(opaque) = value else {
        return Err(format!("expected a timestamp opaque, got {value}"));
    };
    opaque
        .downcast_ref::<DateTime<Utc>>()
        .copied()
        .ok_or_else(|| "timestamp payload is not a DateTime<Utc>".to_string())
}

/// Compares callables by identity.
#[derive(Debug, Default)]
pub struct CallableHandler;

impl TypeHandler for CallableHandler {
    fn name(&self) -> &'static str {
        "callable"
    }

    fn can_handle(&self, tag: &TypeTag<'_>) -> bool {
        matches!(tag, TypeTag::Opaque(name) if *name == CALLABLE_TYPE)
    }

    fn compare(
        &self,
        path: &str,
        left: &Value,
        right: &Value,
        records: &mut Vec<DiffRecord>,
    ) -> Result<(), String> {
        compare_by_identity(self.name(), path, left, right, records)
    }
}

/// Compares channels by identity.
#[derive(Debug, Default)]
pub struct ChannelHandler;

impl TypeHandler for ChannelHandler {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn can_handle(&self, tag: &TypeTag<'_>) -> bool {
        matches!(tag, TypeTag::Opaque(name) if *name == CHANNEL_TYPE)
    }

    fn compare(
        &self,
        path: &str,
        left: &Value,
        right: &Value,
        records: &mut Vec<DiffRecord>,
    ) -> Result<(), String> {
        compare_by_identity(self.name(), path, left, right, records)
    }
}

fn compare_by_identity(
    handler: &str,
    path: &str,
    left: &Value,
    right: &Value,
    records: &mut Vec<DiffRecord>,
) -> Result<(), String> {
    let (Value::Opaque(l), Value::Opaque(r)) = (left, right) else {
        return Err(format!("{handler} handler received non-opaque values"));
    };
    if !l.same_identity(r) {
        records.push(DiffRecord::Value {
            path: path.to_string(),
            left: Some(left.clone()),
            right: Some(right.clone()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn timestamp_handler_compares_instants() {
        let handler = TimestampHandler;
        let a = Value::timestamp(utc(1_700_000_000));
        let b = Value::timestamp(utc(1_700_000_000));
        let c = Value::timestamp(utc(1_700_000_001));

        let mut records = Vec::new();
        handler.compare("created", &a, &b, &mut records).unwrap();
        assert!(records.is_empty());

        handler.compare("created", &a, &c, &mut records).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path(), "created");
    }

    #[test]
    fn timestamp_handler_rejects_foreign_payloads() {
        let handler = TimestampHandler;
        let bogus = Value::Opaque(structdiff_value::OpaqueValue::new(
            TIMESTAMP_TYPE,
            std::rc::Rc::new(42i64),
            "42",
        ));
        let ok = Value::timestamp(utc(0));

        let mut records = Vec::new();
        let err = handler.compare("t", &bogus, &ok, &mut records);
        assert!(err.is_err());
        assert!(records.is_empty());
    }

    #[test]
    fn callable_handler_compares_by_identity() {
        let handler = CallableHandler;
        let f = Value::callable("run");
        let same = f.clone();
        let other = Value::callable("run");

        let mut records = Vec::new();
        handler.compare("hook", &f, &same, &mut records).unwrap();
        assert!(records.is_empty());

        handler.compare("hook", &f, &other, &mut records).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn channel_handler_compares_by_identity() {
        let handler = ChannelHandler;
        let c = Value::channel("jobs");
        let other = Value::channel("jobs");

        let mut records = Vec::new();
        handler.compare("queue", &c, &c.clone(), &mut records).unwrap();
        assert!(records.is_empty());

        handler.compare("queue", &c, &other, &mut records).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn claims_are_type_name_exact() {
        let ts = Value::timestamp(utc(0));
        let chan = Value::channel("jobs");
        assert!(TimestampHandler.can_handle(&ts.type_tag()));
        assert!(!TimestampHandler.can_handle(&chan.type_tag()));
        assert!(ChannelHandler.can_handle(&chan.type_tag()));
        assert!(!CallableHandler.can_handle(&Value::from(1i64).type_tag()));
    }
}
