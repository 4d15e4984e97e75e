//! Wire types for the storefront REST contract
//!
//! Numeric columns are accepted both as JSON numbers and as numeric strings,
//! since SQL `DECIMAL` and `BIGINT` values commonly arrive as strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// Money
// ═══════════════════════════════════════════════════════════════════════

/// A server-supplied money amount, held exactly in cents
///
/// The client only displays amounts; totals and line prices always come from
/// the server. Decimal text is parsed digit by digit so `"19.99"` stays
/// exactly 1999 cents. Digits past the second fractional place are rounded
/// half away from zero. Displays with two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Wrap an amount given in cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in cents
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }
}

/// Rejected decimal text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount: {0:?}")]
pub struct ParseMoneyError(String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseMoneyError(text.to_string());

        let trimmed = text.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut cents: i64 = 0;
        for b in whole.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(b - b'0')))
                .ok_or_else(invalid)?;
        }
        let mut places = fraction.bytes();
        for _ in 0..2 {
            let digit = places.next().map_or(0, |b| i64::from(b - b'0'));
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(digit))
                .ok_or_else(invalid)?;
        }
        if places.next().is_some_and(|b| b >= b'5') {
            cents = cents.checked_add(1).ok_or_else(invalid)?;
        }

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(Number),
            Text(String),
            Null,
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(number) => number.to_string(),
            Raw::Text(text) => text,
            Raw::Null => return Ok(Self::ZERO),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Lenient integer decoding shared by counts and identifiers
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
        Null,
    }

    fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid integer: {text:?}"))),
            Raw::Null => Ok(0),
        }
    }

    pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        integer(deserializer)
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = integer(deserializer)?;
        u32::try_from(value)
            .map_err(|_| serde::de::Error::custom(format!("count out of range: {value}")))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════════════════════════════════

/// An account as the server describes it
///
/// Fields this client does not model are kept in `extra` so the record
/// written to durable storage round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Account id
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any other server fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// A user with just an id and a name
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            extra: Map::new(),
        }
    }

    /// Set the email address
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Login request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

/// Successful login/register response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    /// Bearer token
    pub token: String,
    /// The authenticated account
    pub user: User,
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog
// ═══════════════════════════════════════════════════════════════════════

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id (the `item_id` used by the cart)
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    /// Product name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price
    #[serde(default)]
    pub price: Money,
    /// Units available
    #[serde(default, deserialize_with = "lenient::count")]
    pub stock: u32,
    /// Image location
    #[serde(default)]
    pub image_url: Option<String>,
    /// Name of the product's category
    #[serde(default)]
    pub category_name: Option<String>,
}

impl Product {
    /// Whether at least one unit can be added to a cart
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A catalog category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    /// Category name
    pub name: String,
}

/// Catalog listing filter
///
/// Values are kept as entered; empty values are left out of the query and
/// `search` is trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Free-text search
    pub search: String,
    /// Category id or name, as the backend expects it
    pub category: String,
    /// Lower price bound
    pub min_price: String,
    /// Upper price bound
    pub max_price: String,
}

impl ProductFilter {
    /// Set the search text
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the price bounds
    #[must_use]
    pub fn with_price_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min_price = min.into();
        self.max_price = max.into();
        self
    }

    /// Query parameters for `GET /items`
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let search = self.search.trim();
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }
        if !self.category.is_empty() {
            query.push(("category", self.category.clone()));
        }
        if !self.min_price.is_empty() {
            query.push(("minPrice", self.min_price.clone()));
        }
        if !self.max_price.is_empty() {
            query.push(("maxPrice", self.max_price.clone()));
        }
        query
    }

    /// Number of active category/price filters (search is not counted)
    #[must_use]
    pub fn active_count(&self) -> usize {
        [&self.category, &self.min_price, &self.max_price]
            .iter()
            .filter(|value| !value.is_empty())
            .count()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cart
// ═══════════════════════════════════════════════════════════════════════

/// One product entry within a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line id, distinct from the product id
    #[serde(deserialize_with = "lenient::id")]
    pub cart_id: i64,
    /// Product id
    #[serde(deserialize_with = "lenient::id")]
    pub item_id: i64,
    /// Product name
    #[serde(default)]
    pub name: String,
    /// Unit price
    #[serde(default)]
    pub price: Money,
    /// Units in the cart
    #[serde(deserialize_with = "lenient::count")]
    pub quantity: u32,
    /// Maximum quantity allowed
    #[serde(default, deserialize_with = "lenient::count")]
    pub stock: u32,
    /// Image location
    #[serde(default)]
    pub image_url: Option<String>,
    /// Line total as computed by the server
    #[serde(default)]
    pub total_price: Money,
}

impl CartLine {
    /// Whether `quantity` is within `1..=stock`
    ///
    /// Bounds are the caller's responsibility; the cart store forwards
    /// whatever it is given.
    #[must_use]
    pub const fn accepts_quantity(&self, quantity: u32) -> bool {
        quantity >= 1 && quantity <= self.stock
    }
}

/// The full authoritative cart as returned by `GET /cart`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Cart lines
    #[serde(default)]
    pub items: Vec<CartLine>,
    /// Sum of line totals, computed by the server
    #[serde(default)]
    pub total_amount: Money,
    /// Sum of line quantities, computed by the server
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_items: u32,
}

/// `{ "data": T }` response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_money_accepts_numbers_strings_and_null() {
        let line: CartSnapshot = serde_json::from_value(json!({
            "items": [],
            "total_amount": "30.50",
            "total_items": 0
        }))
        .unwrap();
        assert_eq!(line.total_amount, Money::from_cents(3050));

        let numeric: Money = serde_json::from_value(json!(12)).unwrap();
        assert_eq!(numeric.to_string(), "12.00");

        let missing: Money = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(missing, Money::ZERO);

        assert!(serde_json::from_value::<Money>(json!("ten")).is_err());
    }

    #[test]
    fn test_money_keeps_decimal_text_exact() {
        let text: Money = serde_json::from_value(json!("19.99")).unwrap();
        assert_eq!(text.cents(), 1999);
        assert_eq!(text.to_string(), "19.99");

        let number: Money = serde_json::from_value(json!(0.29)).unwrap();
        assert_eq!(number.cents(), 29);

        let large: Money = "12345678901234.57".parse().unwrap();
        assert_eq!(large.to_string(), "12345678901234.57");

        assert_eq!("5".parse::<Money>().unwrap(), Money::from_cents(500));
        assert_eq!(".5".parse::<Money>().unwrap(), Money::from_cents(50));
        assert_eq!("-3.10".parse::<Money>().unwrap().to_string(), "-3.10");
        assert_eq!("1.005".parse::<Money>().unwrap(), Money::from_cents(101));
        assert_eq!("1.004".parse::<Money>().unwrap(), Money::from_cents(100));

        for bad in ["", ".", "-", "1.2.3", "1e3", "99999999999999999999"] {
            assert!(bad.parse::<Money>().is_err(), "{bad:?} parsed");
        }

        assert_eq!(serde_json::to_value(text).unwrap(), json!("19.99"));
    }

    #[test]
    fn test_cart_line_accepts_string_counts() {
        let line: CartLine = serde_json::from_value(json!({
            "cart_id": "7",
            "item_id": 3,
            "name": "Lamp",
            "price": "10.00",
            "quantity": "3",
            "stock": 5,
            "image_url": null,
            "total_price": "30.00"
        }))
        .unwrap();

        assert_eq!(line.cart_id, 7);
        assert_eq!(line.quantity, 3);
        assert_eq!(line.total_price, Money::from_cents(3000));
        assert!(line.accepts_quantity(5));
        assert!(!line.accepts_quantity(0));
        assert!(!line.accepts_quantity(6));
    }

    #[test]
    fn test_user_keeps_unmodelled_fields() {
        let raw = json!({ "id": 1, "name": "A", "role": "customer" });
        let user: User = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.extra.get("role"), Some(&json!("customer")));
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_filter_query_skips_blank_values_and_trims_search() {
        let filter = ProductFilter::default()
            .with_search("  desk lamp ")
            .with_price_range("", "50");

        assert_eq!(
            filter.query(),
            vec![("search", "desk lamp".to_string()), ("maxPrice", "50".to_string())]
        );
        assert_eq!(filter.active_count(), 1);
        assert!(ProductFilter::default().with_search("   ").query().is_empty());
    }
}
