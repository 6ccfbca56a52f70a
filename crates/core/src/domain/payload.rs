// Item-Creation Payload + form-urlencoded codec

use super::check::IterationContext;
use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Form keys in wire order
pub const FIELD_NAMES: [&str; 6] = [
    "shop_id",
    "name",
    "description",
    "category",
    "price",
    "quantity",
];

pub const DEFAULT_SHOP_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
pub const DEFAULT_ITEM_NAME: &str = "Test Bouquet";
pub const DEFAULT_NAME_PREFIX: &str = "Bouquet";
pub const DEFAULT_DESCRIPTION: &str = "Load test flower set";
pub const DEFAULT_CATEGORY: &str = "Stress";
pub const DEFAULT_PRICE: &str = "15.99";
pub const DEFAULT_QUANTITY: &str = "10";

/// Body of one `POST /items/` call.
///
/// Every value is kept as a string, exactly as it goes on the wire; the
/// service does its own parsing of `price` and `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub shop_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub quantity: String,
}

impl ItemPayload {
    /// `(key, value)` pairs in wire order
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("shop_id", self.shop_id.as_str()),
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
            ("category", self.category.as_str()),
            ("price", self.price.as_str()),
            ("quantity", self.quantity.as_str()),
        ]
    }

    /// All six fields must be non-empty
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.fields() {
            if value.is_empty() {
                return Err(DomainError::EmptyField(key));
            }
        }
        Ok(())
    }

    /// Encode as `application/x-www-form-urlencoded`.
    ///
    /// Reserved characters are percent-escaped and spaces become `+`, the
    /// same encoding HTML forms and `reqwest::RequestBuilder::form` use.
    pub fn to_form(&self) -> Result<String> {
        self.validate()?;
        serde_urlencoded::to_string(self).map_err(|e| DomainError::Encoding(e.to_string()))
    }

    /// Decode a form body back into a payload.
    ///
    /// Strict: every key must appear exactly once, unknown keys and empty
    /// values are rejected.
    pub fn from_form(body: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(body).map_err(|e| DomainError::Encoding(e.to_string()))?;

        let mut slots: [Option<String>; 6] = Default::default();
        for (key, value) in pairs {
            let index = FIELD_NAMES
                .iter()
                .position(|field| *field == key)
                .ok_or_else(|| DomainError::UnknownField(key.clone()))?;
            if slots[index].is_some() {
                return Err(DomainError::DuplicateField(key));
            }
            slots[index] = Some(value);
        }

        let [shop_id, name, description, category, price, quantity] = slots;
        let payload = Self {
            shop_id: shop_id.ok_or(DomainError::MissingField("shop_id"))?,
            name: name.ok_or(DomainError::MissingField("name"))?,
            description: description.ok_or(DomainError::MissingField("description"))?,
            category: category.ok_or(DomainError::MissingField("category"))?,
            price: price.ok_or(DomainError::MissingField("price"))?,
            quantity: quantity.ok_or(DomainError::MissingField("quantity"))?,
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// How the `name` field is derived for each iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStrategy {
    /// Same name on every iteration
    Fixed(String),
    /// `"{prefix} {worker}-{iteration}"`, unique per (worker, iteration)
    PerIteration { prefix: String },
}

impl NameStrategy {
    pub fn name_for(&self, ctx: IterationContext) -> String {
        match self {
            NameStrategy::Fixed(name) => name.clone(),
            NameStrategy::PerIteration { prefix } => {
                format!("{} {}-{}", prefix, ctx.worker_id, ctx.iteration)
            }
        }
    }
}

/// Recipe for the payload a scenario sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadTemplate {
    pub shop_id: String,
    pub name: NameStrategy,
    pub description: String,
    pub category: String,
    pub price: String,
    pub quantity: String,
}

impl PayloadTemplate {
    /// Template with a fixed `name` ("Test Bouquet")
    pub fn fixed_name() -> Self {
        Self::with_name(NameStrategy::Fixed(DEFAULT_ITEM_NAME.to_string()))
    }

    /// Template with a per-iteration `name` ("Bouquet {worker}-{iteration}")
    pub fn per_iteration_name() -> Self {
        Self::with_name(NameStrategy::PerIteration {
            prefix: DEFAULT_NAME_PREFIX.to_string(),
        })
    }

    fn with_name(name: NameStrategy) -> Self {
        Self {
            shop_id: DEFAULT_SHOP_ID.to_string(),
            name,
            description: DEFAULT_DESCRIPTION.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            price: DEFAULT_PRICE.to_string(),
            quantity: DEFAULT_QUANTITY.to_string(),
        }
    }

    /// Replace the shop id, which must be a UUID
    pub fn with_shop_id(mut self, shop_id: impl Into<String>) -> Result<Self> {
        let shop_id = shop_id.into();
        uuid::Uuid::parse_str(&shop_id).map_err(|e| {
            DomainError::ValidationError(format!("shop_id '{}' is not a UUID: {}", shop_id, e))
        })?;
        self.shop_id = shop_id;
        Ok(self)
    }

    /// Check that every payload built from this template would be valid
    pub fn validate(&self) -> Result<()> {
        self.build(IterationContext::new(1, 0)).validate()?;
        if let NameStrategy::PerIteration { prefix } = &self.name {
            if prefix.trim().is_empty() {
                return Err(DomainError::EmptyField("name"));
            }
        }
        Ok(())
    }

    /// Build a fresh payload for one invocation
    pub fn build(&self, ctx: IterationContext) -> ItemPayload {
        ItemPayload {
            shop_id: self.shop_id.clone(),
            name: self.name.name_for(ctx),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price.clone(),
            quantity: self.quantity.clone(),
        }
    }
}
