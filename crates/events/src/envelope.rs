use serde::{Deserialize, Serialize};
use uuid::Uuid;

use feira_core::AggregateId;

use crate::event::Event;

/// A committed event plus the stream metadata needed to replay or audit it.
///
/// `sequence_number` is 1-based and strictly increasing per aggregate stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    aggregate_id: AggregateId,
    aggregate_type: String,
    sequence_number: u64,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    /// JSON summary used by audit listings.
    pub fn summary(&self) -> serde_json::Value
    where
        E: Serialize,
    {
        serde_json::json!({
            "event_id": self.event_id.to_string(),
            "event_type": self.payload.event_type(),
            "schema_version": self.payload.version(),
            "aggregate_type": self.aggregate_type,
            "aggregate_id": self.aggregate_id.to_string(),
            "sequence_number": self.sequence_number,
            "occurred_at": self.payload.occurred_at(),
            "payload": serde_json::to_value(&self.payload).unwrap_or(serde_json::Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Clone, Serialize)]
    struct Ping {
        at: DateTime<Utc>,
    }

    impl Event for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    #[test]
    fn summary_exposes_stream_metadata() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let agg = AggregateId::new();
        let env = EventEnvelope::new(agg, "test.stream", 3, Ping { at });

        assert_eq!(env.event_type(), "test.ping");
        let summary = env.summary();
        assert_eq!(summary["sequence_number"], 3);
        assert_eq!(summary["aggregate_id"], agg.to_string());
        assert_eq!(summary["event_type"], "test.ping");
    }
}
