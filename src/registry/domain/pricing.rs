//! Pricing value object.

use super::RegistryDomainError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Price of a server package.
///
/// The default value, `{currency: "", amount: 0}`, marks a free package and
/// is what legacy records without pricing are listed with. The amount keeps
/// the JSON number it was submitted as, so `5` is never listed as `5.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    currency: String,
    amount: Number,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            currency: String::new(),
            amount: Number::from(0_u8),
        }
    }
}

impl Pricing {
    /// Creates a validated price.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidField`] when `amount` is negative
    /// or not finite.
    pub fn new(currency: impl Into<String>, amount: Number) -> Result<Self, RegistryDomainError> {
        let valid = amount
            .as_f64()
            .is_some_and(|value| value.is_finite() && !value.is_sign_negative());
        if !valid {
            return Err(RegistryDomainError::InvalidField {
                field: "pricing",
                reason: format!("amount must be a non-negative number, got {amount}"),
            });
        }
        Ok(Self {
            currency: currency.into(),
            amount,
        })
    }

    /// Parses the optional `pricing` payload value.
    ///
    /// `null` and absence both yield the free default.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidField`] when the value is not an
    /// object with a string `currency` and a numeric `amount`.
    pub fn from_payload(value: Option<&Value>) -> Result<Self, RegistryDomainError> {
        let Some(fields) = value.filter(|candidate| !candidate.is_null()) else {
            return Ok(Self::default());
        };
        let invalid = |reason: &str| RegistryDomainError::InvalidField {
            field: "pricing",
            reason: reason.to_owned(),
        };
        let object = fields
            .as_object()
            .ok_or_else(|| invalid("expected an object with currency and amount"))?;
        let currency = object
            .get("currency")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("currency must be a string"))?;
        let amount = match object.get("amount") {
            Some(Value::Number(number)) => number.clone(),
            _ => return Err(invalid("amount must be a number")),
        };
        Self::new(currency, amount)
    }

    /// Returns the currency code as submitted.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns the amount as submitted.
    #[must_use]
    pub const fn amount(&self) -> &Number {
        &self.amount
    }

    /// Returns whether the package is free.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.amount.as_f64().is_some_and(|value| value == 0.0)
    }
}

/// Deserializes `null` pricing in stored documents as the free default.
pub(crate) fn null_as_free<'de, D>(deserializer: D) -> Result<Pricing, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Pricing>::deserialize(deserializer)?.unwrap_or_default())
}
