//! The garment record and the payloads that create or modify one.

use serde::{Deserialize, Serialize};

/// One garment in the `prendas` collection.
///
/// Field names on the wire and in the database are the Spanish ones the
/// collection was created with; the English names are accepted on input.
/// Extra document fields such as `_id` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garment {
    #[serde(rename = "codigo", alias = "code")]
    pub code: i64,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "categoria", alias = "category")]
    pub category: String,
    #[serde(rename = "precio", alias = "price")]
    pub price: f64,
}

impl Garment {
    pub fn new(code: i64, name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self { code, name: name.into(), category: category.into(), price }
    }

    /// Boundary checks serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        validate_price(self.price)
    }
}

/// Body of `PATCH /prendas/{codigo}`: only the price can change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePatch {
    #[serde(rename = "precio", alias = "price")]
    pub price: f64,
}

impl PricePatch {
    pub fn validate(&self) -> Result<(), String> {
        validate_price(self.price)
    }
}

fn validate_price(price: f64) -> Result<(), String> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(format!("precio must be a non-negative number, got {price}"))
    }
}

/// Best-effort integer parse of a path segment.
///
/// Skips leading whitespace, takes an optional sign and then as many digits
/// as follow: `"12abc"` is 12, `"7.9"` is 7. Returns `None` when no digit
/// leads the text or the value overflows.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_spanish_and_english_field_names() {
        let spanish: Garment = serde_json::from_str(
            r#"{"codigo":1,"nombre":"Camisa Azul","categoria":"Camisas","precio":20}"#,
        )
        .unwrap();
        let english: Garment = serde_json::from_str(
            r#"{"code":1,"name":"Camisa Azul","category":"Camisas","price":20.0}"#,
        )
        .unwrap();
        assert_eq!(spanish, english);
        assert_eq!(spanish, Garment::new(1, "Camisa Azul", "Camisas", 20.0));
    }

    #[test]
    fn writes_spanish_field_names() {
        let value = serde_json::to_value(Garment::new(3, "Falda", "Faldas", 12.5)).unwrap();
        assert_eq!(value["codigo"], 3);
        assert_eq!(value["nombre"], "Falda");
        assert_eq!(value["categoria"], "Faldas");
        assert_eq!(value["precio"], 12.5);
    }

    #[test]
    fn ignores_document_id_and_rejects_missing_fields() {
        let with_id: Result<Garment, _> = serde_json::from_str(
            r#"{"_id":"65a1","codigo":2,"nombre":"Bufanda","categoria":"Accesorios","precio":8}"#,
        );
        assert!(with_id.is_ok());

        let partial: Result<Garment, _> = serde_json::from_str(r#"{"codigo":2}"#);
        assert!(partial.is_err());
    }

    #[test]
    fn negative_price_fails_validation() {
        assert!(Garment::new(1, "a", "b", -1.0).validate().is_err());
        assert!(PricePatch { price: 0.0 }.validate().is_ok());
        assert!(PricePatch { price: -0.5 }.validate().is_err());
    }

    #[test]
    fn integer_prefix_parse() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  -7"), Some(-7));
        assert_eq!(parse_int_prefix("+3"), Some(3));
        assert_eq!(parse_int_prefix("12abc"), Some(12));
        assert_eq!(parse_int_prefix("7.9"), Some(7));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999999999999"), None);
    }
}
