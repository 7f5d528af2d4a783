//! Record - the unit flowing through the router
//!
//! End of stream is a variant of the record type itself, so a dispatcher cannot
//! route a poison record by content by accident.

/// A record travelling from producers to consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<T> {
    /// Regular payload, routed by content
    Data(T),
    /// End-of-stream signal, delivered to every consumer
    Poison,
}

impl<T> Record<T> {
    /// Wrap a payload
    #[inline]
    pub fn data(payload: T) -> Self {
        Self::Data(payload)
    }

    /// Whether this is the end-of-stream signal
    #[inline]
    pub fn is_poison(&self) -> bool {
        matches!(self, Self::Poison)
    }

    /// Borrow the payload, `None` for poison
    #[inline]
    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Data(payload) => Some(payload),
            Self::Poison => None,
        }
    }

    /// Take the payload, `None` for poison
    #[inline]
    pub fn into_payload(self) -> Option<T> {
        match self {
            Self::Data(payload) => Some(payload),
            Self::Poison => None,
        }
    }

    /// Transform the payload, keeping poison as poison
    pub fn map<U, F>(self, f: F) -> Record<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Data(payload) => Record::Data(f(payload)),
            Self::Poison => Record::Poison,
        }
    }
}
