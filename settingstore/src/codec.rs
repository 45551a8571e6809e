//! Conversion between stored scalars and typed field values, with encryption
//! of sensitive fields.

use serde::{Deserialize, Serialize};
use settingstore_crypto::EncryptionProvider;
use settingstore_model::{FieldDescriptor, FieldType, FieldValue, StoredValue};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::{SettingsError, SettingsResult};

/// What to do with a sensitive field when no encryption provider is
/// configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveFieldPolicy {
    /// Store the value in clear text and log a warning.
    #[default]
    Permissive,
    /// Refuse to store it.
    Strict,
}

/// Encodes field values for storage and decodes them back.
///
/// Conversions are culture-invariant. Decoding accepts any stored scalar that
/// converts losslessly enough to the declared type (integers from decimals
/// round half to even); enumerations only accept an exact member name.
#[derive(Clone, Default)]
pub struct ValueCodec {
    provider: Option<Arc<dyn EncryptionProvider>>,
    policy: SensitiveFieldPolicy,
}

impl fmt::Debug for ValueCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCodec")
            .field("encrypted", &self.provider.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ValueCodec {
    pub fn new(provider: Option<Arc<dyn EncryptionProvider>>, policy: SensitiveFieldPolicy) -> Self {
        Self { provider, policy }
    }

    /// Codec that never encrypts, with the permissive policy.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Codec encrypting sensitive fields with `provider`.
    pub fn encrypted(provider: Arc<dyn EncryptionProvider>) -> Self {
        Self::new(Some(provider), SensitiveFieldPolicy::default())
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn policy(&self) -> SensitiveFieldPolicy {
        self.policy
    }

    /// Turns a field value into the scalar stored in its column.
    pub fn encode(&self, value: &FieldValue, field: &FieldDescriptor) -> SettingsResult<StoredValue> {
        if field.sensitive && !field.field_type.supports_encryption() {
            return Err(SettingsError::Configuration(format!(
                "field `{}` is marked sensitive but has type {}",
                field.name, field.field_type
            )));
        }
        if value.field_type() != field.field_type {
            return Err(SettingsError::conversion(
                value.field_type().as_str(),
                field.field_type.as_str(),
                format!("value does not match the declared type of field `{}`", field.name),
            ));
        }

        let stored = match value {
            FieldValue::Integer(i) => StoredValue::Integer(*i),
            FieldValue::Decimal(d) if !d.is_finite() => {
                // JSON and SQL both turn these into null
                return Err(SettingsError::conversion(
                    "decimal",
                    "decimal",
                    format!("field `{}` cannot store non-finite value {d}", field.name),
                ));
            }
            FieldValue::Decimal(d) => StoredValue::Decimal(*d),
            FieldValue::Boolean(b) => StoredValue::Boolean(*b),
            FieldValue::Text(s) => StoredValue::Text(s.clone()),
            FieldValue::Enumeration(name) => {
                if !field.has_member(name) {
                    return Err(SettingsError::conversion(
                        "enumeration",
                        "text",
                        format!("`{name}` is not a member of field `{}`", field.name),
                    ));
                }
                StoredValue::Text(name.clone())
            }
        };

        if !field.sensitive {
            return Ok(stored);
        }
        let StoredValue::Text(plain) = stored else {
            return Ok(stored);
        };
        match (&self.provider, self.policy) {
            (Some(provider), _) => Ok(StoredValue::Text(provider.encrypt(&plain)?)),
            (None, SensitiveFieldPolicy::Permissive) => {
                warn!("sensitive field `{}` stored in clear text: no encryption provider", field.name);
                Ok(StoredValue::Text(plain))
            }
            (None, SensitiveFieldPolicy::Strict) => Err(SettingsError::Configuration(format!(
                "sensitive field `{}` needs an encryption provider",
                field.name
            ))),
        }
    }

    /// Turns a stored scalar back into a field value. `Null` decodes to
    /// `None`, meaning the field keeps its default.
    pub fn decode(&self, stored: &StoredValue, field: &FieldDescriptor) -> SettingsResult<Option<FieldValue>> {
        if stored.is_null() {
            return Ok(None);
        }
        if field.sensitive && field.field_type.supports_encryption() {
            if let Some(provider) = &self.provider {
                let cipher = stored.as_text().ok_or_else(|| {
                    SettingsError::conversion(
                        stored.type_name(),
                        "encrypted text",
                        format!("sensitive field `{}` does not hold text", field.name),
                    )
                })?;
                let plain = StoredValue::Text(provider.decrypt(cipher)?);
                return convert(&plain, field).map(Some);
            }
        }
        convert(stored, field).map(Some)
    }
}

fn convert(stored: &StoredValue, field: &FieldDescriptor) -> SettingsResult<FieldValue> {
    let fail = |detail: String| {
        SettingsError::conversion(stored.type_name(), field.field_type.as_str(), detail)
    };
    let value = match (field.field_type, stored) {
        (FieldType::Integer, StoredValue::Integer(i)) => FieldValue::Integer(*i),
        (FieldType::Integer, StoredValue::Decimal(d)) => {
            FieldValue::Integer(decimal_to_integer(*d).ok_or_else(|| fail(format!("{d} is out of range")))?)
        }
        (FieldType::Integer, StoredValue::Boolean(b)) => FieldValue::Integer(i64::from(*b)),
        (FieldType::Integer, StoredValue::Text(s)) => FieldValue::Integer(
            s.trim()
                .parse::<i64>()
                .map_err(|e| fail(format!("`{s}`: {e}")))?,
        ),

        (FieldType::Decimal, StoredValue::Decimal(d)) => FieldValue::Decimal(*d),
        (FieldType::Decimal, StoredValue::Integer(i)) => FieldValue::Decimal(*i as f64),
        (FieldType::Decimal, StoredValue::Boolean(b)) => FieldValue::Decimal(if *b { 1.0 } else { 0.0 }),
        (FieldType::Decimal, StoredValue::Text(s)) => FieldValue::Decimal(
            s.trim()
                .parse::<f64>()
                .map_err(|e| fail(format!("`{s}`: {e}")))?,
        ),

        (FieldType::Boolean, StoredValue::Boolean(b)) => FieldValue::Boolean(*b),
        (FieldType::Boolean, StoredValue::Integer(i)) => FieldValue::Boolean(*i != 0),
        (FieldType::Boolean, StoredValue::Decimal(d)) => FieldValue::Boolean(*d != 0.0),
        (FieldType::Boolean, StoredValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
                FieldValue::Boolean(true)
            } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
                FieldValue::Boolean(false)
            } else {
                return Err(fail(format!("`{s}` is not true, false, 1 or 0")));
            }
        }

        (FieldType::Text, StoredValue::Text(s)) => FieldValue::Text(s.clone()),
        (FieldType::Text, StoredValue::Integer(i)) => FieldValue::Text(i.to_string()),
        (FieldType::Text, StoredValue::Decimal(d)) => FieldValue::Text(d.to_string()),
        (FieldType::Text, StoredValue::Boolean(b)) => FieldValue::Text(b.to_string()),

        (FieldType::Enumeration, StoredValue::Text(s)) => {
            if !field.has_member(s) {
                return Err(fail(format!("`{s}` is not a member of field `{}`", field.name)));
            }
            FieldValue::Enumeration(s.clone())
        }

        (_, other) => return Err(fail(format!("unsupported stored value {other}"))),
    };
    Ok(value)
}

/// Rounds half to even; `None` when not finite or outside `i64`.
fn decimal_to_integer(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round_ties_even();
    // i64::MAX as f64 is 2^63, one past the largest i64
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}
