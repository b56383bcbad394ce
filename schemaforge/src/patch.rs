use serde::{Deserialize, Deserializer};

/// One attribute of a partial update.
///
/// A key missing from the request body deserializes to [`Patch::Unset`]
/// (the field must carry `#[serde(default)]`). Any present value, including
/// `null` for a `Patch<Option<T>>`, becomes [`Patch::Set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the stored value unchanged.
    #[default]
    Unset,
    /// Overwrite the stored value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
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
        T::deserialize(deserializer).map(Patch::Set)
    }
}

/// Deserializer for attributes that cannot be NULL: an explicit `null`
/// leaves the stored value unchanged, like a missing key.
///
/// ```rust,ignore
/// #[serde(default, deserialize_with = "patch::skip_null")]
/// pub name: Patch<String>,
/// ```
pub fn skip_null<'de, D, T>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.map_or(Patch::Unset, Patch::Set))
}
