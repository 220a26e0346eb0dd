//! Field-level validation for the checkout forms.
//!
//! Each schema is a declarative table of per-field rules. Validation is pure:
//! it reads a map of raw form values and reports one message per failing
//! field, keyed by the form's field name. There are no cross-field checks
//! (an expiry date in the past or a card number failing a Luhn check both
//! pass).

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::ShippingMethod;

static ZIP_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("Invalid regex"));

static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("Invalid regex"));

static EXPIRY_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("Invalid regex"));

static CVC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("Invalid regex"));

const SHIPPING_METHODS: &[&str] = &["standard", "express"];

/// Named validation schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    Shipping,
    Payment,
}

impl Schema {
    fn rules(self) -> &'static [FieldRule] {
        match self {
            Self::Shipping => SHIPPING_RULES,
            Self::Payment => PAYMENT_RULES,
        }
    }

    /// Field names covered by this schema, in form order.
    pub fn fields(self) -> impl Iterator<Item = &'static str> {
        self.rules().iter().map(|r| r.field)
    }
}

impl std::str::FromStr for Schema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shipping" => Ok(Self::Shipping),
            "payment" => Ok(Self::Payment),
            _ => Err(format!("unknown schema: {s}")),
        }
    }
}

/// A single constraint on a field value.
#[derive(Debug)]
enum Rule {
    /// At least this many characters.
    MinLen(usize),
    /// Must match the whole pattern.
    Pattern(Pattern),
    /// Must be one of the listed values. Absence is an error.
    OneOf(&'static [&'static str]),
}

impl Rule {
    fn check(&self, value: Option<&str>) -> bool {
        match self {
            Self::MinLen(min) => value.unwrap_or_default().chars().count() >= *min,
            Self::Pattern(pattern) => pattern.regex().is_match(value.unwrap_or_default()),
            Self::OneOf(allowed) => value.is_some_and(|v| allowed.contains(&v)),
        }
    }
}

/// Anchored patterns used by the schemas.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    ZipCode,
    CardNumber,
    ExpiryDate,
    Cvc,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Self::ZipCode => &ZIP_CODE_RE,
            Self::CardNumber => &CARD_NUMBER_RE,
            Self::ExpiryDate => &EXPIRY_DATE_RE,
            Self::Cvc => &CVC_RE,
        }
    }
}

#[derive(Debug)]
struct FieldRule {
    field: &'static str,
    rule: Rule,
    message: &'static str,
}

const SHIPPING_RULES: &[FieldRule] = &[
    FieldRule {
        field: "fullName",
        rule: Rule::MinLen(2),
        message: "Full name must be at least 2 characters.",
    },
    FieldRule {
        field: "address",
        rule: Rule::MinLen(5),
        message: "Address is required.",
    },
    FieldRule {
        field: "city",
        rule: Rule::MinLen(2),
        message: "City is required.",
    },
    FieldRule {
        field: "zipCode",
        rule: Rule::Pattern(Pattern::ZipCode),
        message: "Invalid ZIP code.",
    },
    FieldRule {
        field: "shippingMethod",
        rule: Rule::OneOf(SHIPPING_METHODS),
        message: "You need to select a shipping method.",
    },
];

const PAYMENT_RULES: &[FieldRule] = &[
    FieldRule {
        field: "cardholderName",
        rule: Rule::MinLen(2),
        message: "Cardholder name is required.",
    },
    FieldRule {
        field: "cardNumber",
        rule: Rule::Pattern(Pattern::CardNumber),
        message: "Invalid card number. Must be 16 digits.",
    },
    FieldRule {
        field: "expiryDate",
        rule: Rule::Pattern(Pattern::ExpiryDate),
        message: "Invalid expiry date (MM/YY).",
    },
    FieldRule {
        field: "cvc",
        rule: Rule::Pattern(Pattern::Cvc),
        message: "Invalid CVC.",
    },
];

/// Per-field error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Message for `field`, or an empty string. Convenient in templates.
    #[must_use]
    pub fn message(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Result of validating a form against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: FieldErrors,
}

/// Validate raw form values against a schema.
///
/// Missing fields are validated as empty strings, except for `OneOf` rules
/// where absence is itself the error.
#[must_use]
pub fn validate(schema: Schema, values: &HashMap<String, String>) -> Validation {
    let mut errors = FieldErrors::default();
    for rule in schema.rules() {
        let value = values.get(rule.field).map(String::as_str);
        if !rule.rule.check(value) {
            errors.insert(rule.field, rule.message);
        }
    }
    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

// =============================================================================
// Typed Forms
// =============================================================================

/// Raw shipping form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingForm {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub shipping_method: Option<String>,
}

impl ShippingForm {
    fn values(&self) -> HashMap<String, String> {
        let mut values = HashMap::from([
            ("fullName".to_string(), self.full_name.clone()),
            ("address".to_string(), self.address.clone()),
            ("city".to_string(), self.city.clone()),
            ("zipCode".to_string(), self.zip_code.clone()),
        ]);
        if let Some(method) = &self.shipping_method {
            values.insert("shippingMethod".to_string(), method.clone());
        }
        values
    }

    /// Validate and convert into [`ShippingInfo`].
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any rule fails.
    pub fn validate(&self) -> Result<ShippingInfo, FieldErrors> {
        let validation = validate(Schema::Shipping, &self.values());
        if !validation.valid {
            return Err(validation.errors);
        }
        let shipping_method = self
            .shipping_method
            .as_deref()
            .unwrap_or_default()
            .parse::<ShippingMethod>()
            .unwrap_or_default();
        Ok(ShippingInfo {
            full_name: self.full_name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            shipping_method,
        })
    }
}

impl From<&ShippingInfo> for ShippingForm {
    fn from(info: &ShippingInfo) -> Self {
        Self {
            full_name: info.full_name.clone(),
            address: info.address.clone(),
            city: info.city.clone(),
            zip_code: info.zip_code.clone(),
            shipping_method: Some(info.shipping_method.as_str().to_string()),
        }
    }
}

/// Validated shipping details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub shipping_method: ShippingMethod,
}

/// Raw payment form as submitted.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentForm {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvc: String,
}

impl std::fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentForm")
            .field("cardholder_name", &self.cardholder_name)
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

impl PaymentForm {
    fn values(&self) -> HashMap<String, String> {
        HashMap::from([
            ("cardholderName".to_string(), self.cardholder_name.clone()),
            ("cardNumber".to_string(), self.card_number.clone()),
            ("expiryDate".to_string(), self.expiry_date.clone()),
            ("cvc".to_string(), self.cvc.clone()),
        ])
    }

    /// Validate and convert into [`PaymentInfo`].
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any rule fails.
    pub fn validate(&self) -> Result<PaymentInfo, FieldErrors> {
        let validation = validate(Schema::Payment, &self.values());
        if !validation.valid {
            return Err(validation.errors);
        }
        Ok(PaymentInfo {
            cardholder_name: self.cardholder_name.clone(),
            card_number: self.card_number.clone(),
            expiry_date: self.expiry_date.clone(),
            cvc: self.cvc.clone(),
        })
    }

    /// Copy of the form safe to echo back into a page: card number and CVC
    /// are cleared.
    #[must_use]
    pub fn redisplay(&self) -> Self {
        Self {
            cardholder_name: self.cardholder_name.clone(),
            card_number: String::new(),
            expiry_date: self.expiry_date.clone(),
            cvc: String::new(),
        }
    }
}

/// Validated payment details.
///
/// Implements `Debug` manually to redact the card number and CVC.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvc: String,
}

impl PaymentInfo {
    /// Card number with all but the last four digits hidden.
    #[must_use]
    pub fn masked_card_number(&self) -> String {
        let last_four: String = self
            .card_number
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("•••• {last_four}")
    }
}

impl std::fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("cardholder_name", &self.cardholder_name)
            .field("card_number", &self.masked_card_number())
            .field("expiry_date", &self.expiry_date)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}
