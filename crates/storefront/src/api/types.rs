//! Request and response types for the REST backend.
//!
//! Field names on the wire are the backend's (`nombre`, `precio`,
//! `usuarioId`, ...); Rust-side names are English. Product responses are
//! first decoded into the permissive [`ProductDto`] and then validated into a
//! [`ProductSnapshot`], which fails closed on missing or out-of-range fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use food_cart_core::{
    CategoryId, Email, OrderId, OrderLineId, OrderStatus, Price, ProductId, Quantity, Role, UserId,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DecodeError;

// =============================================================================
// Products
// =============================================================================

/// Product as the backend sends it. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDto {
    pub id: Option<ProductId>,
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "precio")]
    pub price: Option<Price>,
    pub stock: Option<i64>,
    #[serde(rename = "categoriaId")]
    pub category_id: Option<CategoryId>,
    /// Some backend versions nest the category instead of sending its ID.
    #[serde(rename = "categoria")]
    pub category: Option<CategoryRef>,
    #[serde(rename = "imagenURL")]
    pub image_url: Option<String>,
    #[serde(rename = "disponible")]
    pub available: Option<bool>,
}

/// Nested category reference inside a [`ProductDto`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRef {
    pub id: Option<CategoryId>,
}

/// Validated view of a product, fetched fresh from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Price,
    pub available_stock: u32,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
}

impl ProductSnapshot {
    /// Full product body with `stock` replaced, as expected by
    /// `PUT /productos/{id}`.
    #[must_use]
    pub fn with_stock(&self, stock: u32) -> ProductUpsert {
        ProductUpsert {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.unit_price,
            stock,
            category_id: self.category_id,
            image_url: self.image_url.clone(),
        }
    }
}

impl TryFrom<ProductDto> for ProductSnapshot {
    type Error = DecodeError;

    fn try_from(dto: ProductDto) -> Result<Self, Self::Error> {
        let id = dto.id.ok_or(DecodeError::MissingField("id"))?;

        let name = dto
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or(DecodeError::MissingField("nombre"))?;

        let unit_price = dto.price.ok_or(DecodeError::MissingField("precio"))?;
        if unit_price.is_negative() {
            return Err(DecodeError::invalid("precio", format!("{unit_price} is negative")));
        }
        if unit_price > Price::MAX_UNIT {
            return Err(DecodeError::invalid(
                "precio",
                format!("{unit_price} exceeds {}", Price::MAX_UNIT),
            ));
        }

        let stock = dto.stock.ok_or(DecodeError::MissingField("stock"))?;
        let available_stock = u32::try_from(stock)
            .map_err(|_| DecodeError::invalid("stock", format!("{stock} is out of range")))?;

        Ok(Self {
            id,
            name,
            description: dto.description,
            unit_price,
            available_stock,
            category_id: dto.category_id.or_else(|| dto.category.and_then(|c| c.id)),
            image_url: dto.image_url.filter(|url| !url.is_empty()),
            available: dto.available,
        })
    }
}

/// Body for creating or fully replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductUpsert {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "precio")]
    pub price: Price,
    pub stock: u32,
    #[serde(rename = "categoriaId")]
    pub category_id: Option<CategoryId>,
    #[serde(rename = "imagenURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// =============================================================================
// Categories
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

/// Body for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUpsert {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// A registered user, as returned by login/registration and kept in the
/// session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: Email,
    #[serde(rename = "rol")]
    pub role: Role,
}

/// Registration request.
#[derive(Debug, Serialize)]
pub struct NewUser {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    #[serde(rename = "rol")]
    pub role: Role,
}

/// Login request.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

// =============================================================================
// Orders
// =============================================================================

/// Contact and payment details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetails {
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "metodoPago")]
    pub payment_method: String,
    #[serde(rename = "notas", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One line of an order being placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineRequest {
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "productoNombre")]
    pub product_name: String,
    #[serde(rename = "productoImagen", skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(rename = "cantidad")]
    pub quantity: Quantity,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Price,
}

impl OrderLineRequest {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity.get()
    }
}

/// An order ready for submission.
///
/// The total is computed on construction as the sum of line totals plus the
/// shipping cost, and the request cannot be modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    #[serde(rename = "usuarioId")]
    user_id: UserId,
    #[serde(flatten)]
    contact: ContactDetails,
    #[serde(rename = "estado")]
    status: OrderStatus,
    #[serde(rename = "detalles")]
    lines: Vec<OrderLineRequest>,
    #[serde(rename = "costoEnvio")]
    shipping_cost: Price,
    total: Price,
}

impl OrderRequest {
    /// Build a pending order for `user_id`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        contact: ContactDetails,
        lines: Vec<OrderLineRequest>,
        shipping_cost: Price,
    ) -> Self {
        let subtotal: Price = lines.iter().map(OrderLineRequest::line_total).sum();
        Self {
            user_id,
            contact,
            status: OrderStatus::Pending,
            lines,
            shipping_cost,
            total: subtotal + shipping_cost,
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub const fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    #[must_use]
    pub fn lines(&self) -> &[OrderLineRequest] {
        &self.lines
    }

    #[must_use]
    pub const fn shipping_cost(&self) -> Price {
        self.shipping_cost
    }

    /// Sum of line totals, without shipping.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(OrderLineRequest::line_total).sum()
    }

    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(rename = "usuarioId")]
    pub user_id: UserId,
    #[serde(rename = "fecha", default, deserialize_with = "order_date")]
    pub placed_at: Option<NaiveDateTime>,
    /// Orders the backend has not assigned a status to are pending.
    #[serde(rename = "estado", default, deserialize_with = "status_or_pending")]
    pub status: OrderStatus,
    pub total: Price,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "metodoPago")]
    pub payment_method: String,
    #[serde(rename = "notas", default)]
    pub notes: Option<String>,
    #[serde(rename = "detalles")]
    pub lines: Vec<OrderLineRecord>,
}

impl OrderRecord {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of line totals, without shipping.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(OrderLineRecord::line_total).sum()
    }
}

/// One line of a persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderLineRecord {
    #[serde(default)]
    pub id: Option<OrderLineId>,
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "productoNombre")]
    pub product_name: String,
    #[serde(rename = "productoImagen", default)]
    pub product_image: Option<String>,
    #[serde(rename = "cantidad")]
    pub quantity: Quantity,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Price,
}

impl OrderLineRecord {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity.get()
    }
}

/// Body of `PUT /pedidos/{id}/estado`.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct StatusUpdate {
    #[serde(rename = "estado")]
    pub status: OrderStatus,
}

fn status_or_pending<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OrderStatus, D::Error> {
    Ok(Option::<OrderStatus>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `2024-05-01T12:30:00[.fff]`, RFC 3339 timestamps and bare dates.
fn order_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.naive_utc()))
        .or_else(|_| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid order date: {raw}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dto(value: serde_json::Value) -> ProductDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_snapshot_decodes_full_product() {
        let snapshot = ProductSnapshot::try_from(dto(json!({
            "id": 1,
            "nombre": "Empanada",
            "descripcion": "Carne",
            "precio": 10.5,
            "stock": 5,
            "categoria": {"id": 3, "nombre": "Horno"},
            "imagenURL": "https://img.test/e.jpg",
            "disponible": true
        })))
        .unwrap();

        assert_eq!(snapshot.id, ProductId::new(1));
        assert_eq!(snapshot.unit_price, Price::from_cents(1050));
        assert_eq!(snapshot.available_stock, 5);
        assert_eq!(snapshot.category_id, Some(CategoryId::new(3)));
        assert_eq!(snapshot.available, Some(true));
    }

    #[test]
    fn test_snapshot_fails_closed_on_missing_stock() {
        let err = ProductSnapshot::try_from(dto(json!({
            "id": 1, "nombre": "Empanada", "precio": 10
        })))
        .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("stock")));
    }

    #[test]
    fn test_snapshot_rejects_negative_stock_and_price() {
        let err = ProductSnapshot::try_from(dto(json!({
            "id": 1, "nombre": "Empanada", "precio": 10, "stock": -1
        })))
        .unwrap_err();
        assert!(matches!(err, DecodeError::Invalid { field: "stock", .. }));

        let err = ProductSnapshot::try_from(dto(json!({
            "id": 1, "nombre": "Empanada", "precio": -10, "stock": 1
        })))
        .unwrap_err();
        assert!(matches!(err, DecodeError::Invalid { field: "precio", .. }));
    }

    #[test]
    fn test_snapshot_rejects_price_above_max_unit() {
        let err = ProductSnapshot::try_from(dto(json!({
            "id": 1, "nombre": "Empanada", "precio": 1e28, "stock": 10
        })))
        .unwrap_err();
        assert!(matches!(err, DecodeError::Invalid { field: "precio", .. }));

        let snapshot = ProductSnapshot::try_from(dto(json!({
            "id": 1, "nombre": "Empanada", "precio": 1_000_000_000, "stock": 10
        })))
        .unwrap();
        assert_eq!(snapshot.unit_price, Price::MAX_UNIT);
    }

    #[test]
    fn test_non_numeric_stock_is_a_decode_error() {
        let result = serde_json::from_value::<ProductDto>(json!({
            "id": 1, "nombre": "Empanada", "precio": 10, "stock": "lots"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_stock_keeps_other_fields() {
        let snapshot = ProductSnapshot::try_from(dto(json!({
            "id": 4, "nombre": "Flan", "precio": 3, "stock": 9, "categoriaId": 2
        })))
        .unwrap();

        let body = serde_json::to_value(snapshot.with_stock(6)).unwrap();
        assert_eq!(
            body,
            json!({"nombre": "Flan", "precio": 3.0, "stock": 6, "categoriaId": 2})
        );
    }

    #[test]
    fn test_order_request_total_and_wire_shape() {
        let order = OrderRequest::new(
            UserId::new(8),
            ContactDetails {
                phone: "555-0101".to_string(),
                address: "Calle 1".to_string(),
                payment_method: "cash".to_string(),
                notes: None,
            },
            vec![OrderLineRequest {
                product_id: ProductId::new(1),
                product_name: "Empanada".to_string(),
                product_image: None,
                quantity: Quantity::new(2).unwrap(),
                unit_price: Price::from_cents(1000),
            }],
            Price::from_cents(50_000),
        );

        assert_eq!(order.subtotal(), Price::from_cents(2000));
        assert_eq!(order.total(), Price::from_cents(52_000));

        let body = serde_json::to_value(&order).unwrap();
        assert_eq!(
            body,
            json!({
                "usuarioId": 8,
                "telefono": "555-0101",
                "direccion": "Calle 1",
                "metodoPago": "cash",
                "estado": "pending",
                "detalles": [{
                    "productoId": 1,
                    "productoNombre": "Empanada",
                    "cantidad": 2,
                    "precioUnitario": 10.0
                }],
                "costoEnvio": 500.0,
                "total": 520.0
            })
        );
    }

    #[test]
    fn test_order_record_defaults_status_and_parses_dates() {
        let record: OrderRecord = serde_json::from_value(json!({
            "id": 12,
            "usuarioId": 8,
            "fecha": "2025-03-01T20:15:00.123",
            "estado": null,
            "total": 520,
            "telefono": "555-0101",
            "direccion": "Calle 1",
            "metodoPago": "cash",
            "detalles": [
                {"productoId": 1, "productoNombre": "Empanada", "cantidad": 2, "precioUnitario": 10}
            ]
        }))
        .unwrap();

        assert_eq!(record.status, OrderStatus::Pending);
        assert_eq!(record.unit_count(), 2);
        assert_eq!(record.subtotal(), Price::from_cents(2000));
        assert_eq!(
            record.placed_at.unwrap().to_string(),
            "2025-03-01 20:15:00.123"
        );

        let rfc: OrderRecord = serde_json::from_value(json!({
            "id": 13, "usuarioId": 8, "fecha": "2025-03-01T20:15:00Z", "estado": "completed",
            "total": 1, "telefono": "", "direccion": "", "metodoPago": "", "detalles": []
        }))
        .unwrap();
        assert_eq!(rfc.status, OrderStatus::Completed);
        assert!(rfc.placed_at.is_some());
    }

    #[test]
    fn test_login_request_exposes_password_only_on_the_wire() {
        let login = LoginRequest {
            email: Email::parse("chef@food.test").unwrap(),
            password: SecretString::from("hunter2"),
        };
        assert!(!format!("{login:?}").contains("hunter2"));
        let body = serde_json::to_value(&login).unwrap();
        assert_eq!(body, json!({"email": "chef@food.test", "password": "hunter2"}));
    }
}
