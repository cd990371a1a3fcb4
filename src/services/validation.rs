use crate::error::FieldErrors;
use crate::types::{CreateProduct, UpdateProduct};

const NON_EMPTY: &str = "must be a non-empty string";
const NON_NEGATIVE: &str = "must be greater than or equal to 0";

/// Field-level checks for a single create. Returns every failing field.
pub fn validate_create(input: &CreateProduct) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "name", Some(&input.name));
    check_price(&mut errors, Some(input.price));
    check_stock(&mut errors, Some(input.stock));
    check_text(&mut errors, "category", Some(&input.category));
    errors
}

/// Field-level checks for a patch; absent fields are not checked
pub fn validate_update(patch: &UpdateProduct) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "name", patch.name.as_deref());
    check_price(&mut errors, patch.price);
    check_stock(&mut errors, patch.stock);
    check_text(&mut errors, "category", patch.category.as_deref());
    errors
}

fn check_text(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if value.trim().is_empty() {
            errors.insert(field.to_string(), NON_EMPTY.to_string());
        }
    }
}

fn check_price(errors: &mut FieldErrors, price: Option<f64>) {
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            errors.insert("price".to_string(), NON_NEGATIVE.to_string());
        }
    }
}

fn check_stock(errors: &mut FieldErrors, stock: Option<i64>) {
    if let Some(stock) = stock {
        if stock < 0 {
            errors.insert("stock".to_string(), NON_NEGATIVE.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> CreateProduct {
        CreateProduct {
            id: None,
            name: "Widget".to_string(),
            price: 9.99,
            stock: 3,
            category: "Tools".to_string(),
            stock_visible: None,
        }
    }

    #[test]
    fn valid_create_has_no_errors() {
        assert!(validate_create(&widget()).is_empty());
    }

    #[test]
    fn create_reports_every_bad_field() {
        let input = CreateProduct {
            name: "   ".to_string(),
            price: -1.0,
            stock: -2,
            category: String::new(),
            ..widget()
        };
        let errors = validate_create(&input);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["price"], NON_NEGATIVE);
        assert_eq!(errors["name"], NON_EMPTY);
    }

    #[test]
    fn zero_values_are_valid_for_single_create() {
        let input = CreateProduct { price: 0.0, stock: 0, ..widget() };
        assert!(validate_create(&input).is_empty());
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(validate_update(&UpdateProduct::default()).is_empty());
        let patch = UpdateProduct { stock: Some(-1), ..Default::default() };
        assert_eq!(validate_update(&patch).keys().collect::<Vec<_>>(), vec!["stock"]);
    }
}
