//! Tri-state field used by partial updates.
//!
//! JSON cannot distinguish "leave unchanged" from "clear" with a plain
//! `Option<T>`. Fields typed as [`Patch<T>`] and marked `#[serde(default)]`
//! deserialise a missing key as [`Patch::Absent`], an explicit `null` as
//! [`Patch::Clear`] and any other value as [`Patch::Set`].

use serde::{Deserialize, Deserializer};

/// Partial-update instruction for a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Key not supplied; keep the stored value.
    #[default]
    Absent,
    /// Key supplied as `null`; clear the stored value.
    Clear,
    /// Key supplied with a value.
    Set(T),
}

impl<T> Patch<T> {
    /// Whether the key was present in the request at all.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Resolve the patch against the current value.
    ///
    /// # Examples
    /// ```
    /// use brewlog::domain::Patch;
    ///
    /// assert_eq!(Patch::Absent.apply(Some(1)), Some(1));
    /// assert_eq!(Patch::<i32>::Clear.apply(Some(1)), None);
    /// assert_eq!(Patch::Set(2).apply(Some(1)), Some(2));
    /// ```
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Absent => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Transform the carried value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Clear => Patch::Clear,
            Self::Set(value) => Patch::Set(f(value)),
        }
    }

    /// Borrowing view of the patch.
    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Clear => Patch::Clear,
            Self::Set(value) => Patch::Set(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        notes: Patch<String>,
    }

    #[rstest]
    #[case(json!({}), Patch::Absent)]
    #[case(json!({ "notes": null }), Patch::Clear)]
    #[case(json!({ "notes": "oat milk" }), Patch::Set("oat milk".to_owned()))]
    fn distinguishes_missing_null_and_value(
        #[case] input: serde_json::Value,
        #[case] expected: Patch<String>,
    ) {
        let body: Body = serde_json::from_value(input).expect("deserialise");
        assert_eq!(body.notes, expected);
    }

    #[rstest]
    fn presence_tracks_key_not_value() {
        assert!(!Patch::<u8>::Absent.is_present());
        assert!(Patch::<u8>::Clear.is_present());
        assert!(Patch::Set(1_u8).is_present());
    }
}
