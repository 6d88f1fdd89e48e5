//! Tri-state attribute values.
//!
//! Configuration attributes distinguish three states: the user left the
//! attribute out (`Absent`), the value will only be known after apply
//! (`Unknown`), or a concrete value is set (`Present`). A zero value is
//! never used as a stand-in for "not set".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<T> {
    Absent,
    Unknown,
    Present(T),
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Value::Absent
    }
}

impl<T> Value<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Value::Present(_))
    }

    /// Present value, if any. Unknown and absent both yield `None`.
    pub fn get(&self) -> Option<&T> {
        match self {
            Value::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Value::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Value::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Value<&T> {
        match self {
            Value::Absent => Value::Absent,
            Value::Unknown => Value::Unknown,
            Value::Present(v) => Value::Present(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Value<U> {
        match self {
            Value::Absent => Value::Absent,
            Value::Unknown => Value::Unknown,
            Value::Present(v) => Value::Present(f(v)),
        }
    }

    /// Replace an absent value with the produced default. Unknown values
    /// are left alone; they are resolved by the server.
    pub fn or_default_with<F: FnOnce() -> T>(&mut self, f: F) -> &mut Self {
        if self.is_absent() {
            *self = Value::Present(f());
        }
        self
    }
}

impl<T: Copy> Value<T> {
    pub fn copied(&self) -> Option<T> {
        self.get().copied()
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Value::Present(v),
            None => Value::Absent,
        }
    }
}

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Present(v) => v.serialize(serializer),
            Value::Absent | Value::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Value<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Holder {
        count: Value<i32>,
        name: Value<String>,
    }

    #[test]
    fn test_missing_and_null_deserialize_to_absent() {
        let h: Holder = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert!(h.count.is_absent());
        assert!(h.name.is_absent());

        let h: Holder = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert_eq!(h.count, Value::Present(0));
    }

    #[test]
    fn test_default_only_fills_absent() {
        let mut absent: Value<i32> = Value::Absent;
        absent.or_default_with(|| 5);
        assert_eq!(absent, Value::Present(5));

        let mut unknown: Value<i32> = Value::Unknown;
        unknown.or_default_with(|| 5);
        assert!(unknown.is_unknown());

        let mut set = Value::Present(1);
        set.or_default_with(|| 5);
        assert_eq!(set, Value::Present(1));
    }

    #[test]
    fn test_unknown_serializes_as_null() {
        let h = Holder {
            count: Value::Unknown,
            name: Value::Present("x".into()),
        };
        assert_eq!(
            serde_json::to_string(&h).unwrap(),
            r#"{"count":null,"name":"x"}"#
        );
    }
}
