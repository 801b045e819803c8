use thiserror::Error;

use crate::model::{
    positive_number, strip_rate_separators, Color, Product, RecordId, Supplier,
    DEFAULT_BATTERY, DEFAULT_MIN_QUANTITY, DEFAULT_STORAGE, IPHONE_MODELS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("supplier needs a name and a dollar rate")]
    SupplierIncomplete,
    #[error("dollar rate must be a positive number, got {0:?}")]
    InvalidRate(String),
    #[error("product needs a supplier and a price")]
    ProductIncomplete,
    #[error("price must be a positive number of dollars, got {0:?}")]
    InvalidPrice(String),
    #[error("minimum quantity must be at least 1")]
    InvalidMinQuantity,
}

/// Manually entered supplier fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierForm {
    pub name: String,
    pub contact: String,
    pub dollar_rate: String,
    pub min_purchase: String,
    pub location: String,
}

impl SupplierForm {
    /// Check the form and return the record fields as they will be stored
    /// (rate digits only, blank optionals dropped). The id is left at 0.
    pub fn validate(&self) -> Result<Supplier, ValidationError> {
        let name = self.name.trim();
        let raw_rate = self.dollar_rate.trim();
        if name.is_empty() || raw_rate.is_empty() {
            return Err(ValidationError::SupplierIncomplete);
        }
        let dollar_rate = strip_rate_separators(raw_rate);
        if positive_number(&dollar_rate).is_none() {
            return Err(ValidationError::InvalidRate(raw_rate.to_string()));
        }
        Ok(Supplier {
            id: 0,
            name: name.to_string(),
            contact: non_blank(&self.contact),
            dollar_rate,
            min_purchase: non_blank(&self.min_purchase),
            location: non_blank(&self.location),
        })
    }
}

impl From<&Supplier> for SupplierForm {
    fn from(s: &Supplier) -> Self {
        SupplierForm {
            name: s.name.clone(),
            contact: s.contact.clone().unwrap_or_default(),
            dollar_rate: s.dollar_rate.clone(),
            min_purchase: s.min_purchase.clone().unwrap_or_default(),
            location: s.location.clone().unwrap_or_default(),
        }
    }
}

/// Manually entered product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub model: String,
    pub storage: String,
    pub color: Color,
    pub battery: String,
    pub details: String,
    pub supplier_id: Option<RecordId>,
    pub price_usd: String,
    pub min_quantity: u32,
}

impl Default for ProductForm {
    fn default() -> Self {
        ProductForm {
            model: IPHONE_MODELS[0].to_string(),
            storage: DEFAULT_STORAGE.to_string(),
            color: Color::default(),
            battery: DEFAULT_BATTERY.to_string(),
            details: String::new(),
            supplier_id: None,
            price_usd: String::new(),
            min_quantity: DEFAULT_MIN_QUANTITY,
        }
    }
}

impl ProductForm {
    /// Id is left at 0. Whether the supplier exists is the store's concern.
    pub fn validate(&self) -> Result<Product, ValidationError> {
        let price = self.price_usd.trim();
        let Some(supplier_id) = self.supplier_id.filter(|_| !price.is_empty()) else {
            return Err(ValidationError::ProductIncomplete);
        };
        if positive_number(price).is_none() {
            return Err(ValidationError::InvalidPrice(price.to_string()));
        }
        if self.min_quantity == 0 {
            return Err(ValidationError::InvalidMinQuantity);
        }
        Ok(Product {
            id: 0,
            model: self.model.trim().to_string(),
            storage: self.storage.trim().to_string(),
            color: self.color,
            battery: self.battery.trim().to_string(),
            details: non_blank(&self.details),
            supplier_id,
            price_usd: price.to_string(),
            min_quantity: self.min_quantity,
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        ProductForm {
            model: p.model.clone(),
            storage: p.storage.clone(),
            color: p.color,
            battery: p.battery.clone(),
            details: p.details.clone().unwrap_or_default(),
            supplier_id: Some(p.supplier_id),
            price_usd: p.price_usd.clone(),
            min_quantity: p.min_quantity,
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    Some(s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_needs_name_and_rate() {
        let form = SupplierForm {
            dollar_rate: "1455".into(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::SupplierIncomplete));

        let form = SupplierForm {
            name: "Juan".into(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::SupplierIncomplete));
    }

    #[test]
    fn supplier_rate_is_normalized() {
        let form = SupplierForm {
            name: " Juan ".into(),
            dollar_rate: "1.455".into(),
            location: "  ".into(),
            ..Default::default()
        };
        let s = form.validate().unwrap();
        assert_eq!(s.name, "Juan");
        assert_eq!(s.dollar_rate, "1455");
        assert_eq!(s.location, None);
    }

    #[test]
    fn supplier_rate_must_be_numeric() {
        let form = SupplierForm {
            name: "Juan".into(),
            dollar_rate: "mil".into(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidRate("mil".into())));
    }

    #[test]
    fn product_needs_supplier_and_price() {
        let form = ProductForm {
            price_usd: "500".into(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::ProductIncomplete));

        let form = ProductForm {
            supplier_id: Some(1),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::ProductIncomplete));
    }

    #[test]
    fn product_defaults() {
        let form = ProductForm {
            supplier_id: Some(3),
            price_usd: "480.50".into(),
            ..Default::default()
        };
        let p = form.validate().unwrap();
        assert_eq!(p.model, "iPhone 11");
        assert_eq!(p.storage, "128GB");
        assert_eq!(p.color, Color::Black);
        assert_eq!(p.battery, "100%");
        assert_eq!(p.price_usd, "480.50");
        assert_eq!(p.min_quantity, 1);
    }

    #[test]
    fn product_rejects_bad_price_and_quantity() {
        let mut form = ProductForm {
            supplier_id: Some(3),
            price_usd: "-5".into(),
            ..Default::default()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidPrice("-5".into())));
        form.price_usd = "5".into();
        form.min_quantity = 0;
        assert_eq!(form.validate(), Err(ValidationError::InvalidMinQuantity));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ValidationError::SupplierIncomplete.to_string(),
            "supplier needs a name and a dollar rate"
        );
    }
}
