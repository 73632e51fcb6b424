use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

/// Source of identifiers for new documents.
pub trait IdGenerator {
    fn next_id(&mut self) -> ObjectId;
}

/// Fresh random object ids, as the database driver would generate them.
#[derive(Debug, Default)]
pub struct ObjectIdGenerator;

impl IdGenerator for ObjectIdGenerator {
    fn next_id(&mut self) -> ObjectId {
        ObjectId::new()
    }
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic ids `000000000000000000000001`, `...02`, ...
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequenceIdGenerator {
    issued: u64,
}

#[cfg(test)]
impl SequenceIdGenerator {
    pub fn nth(n: u64) -> ObjectId {
        let mut bytes = [0u8; 12];
        bytes[4..].copy_from_slice(&n.to_be_bytes());
        ObjectId::from_bytes(bytes)
    }
}

#[cfg(test)]
impl IdGenerator for SequenceIdGenerator {
    fn next_id(&mut self) -> ObjectId {
        self.issued += 1;
        Self::nth(self.issued)
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
