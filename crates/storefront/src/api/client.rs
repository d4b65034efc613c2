//! `reqwest`-based implementation of the backend client.

use food_cart_core::{CategoryId, OrderId, OrderStatus, ProductId, UserId};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::types::{
    Category, CategoryUpsert, LoginRequest, NewUser, OrderRecord, OrderRequest, ProductDto,
    ProductSnapshot, ProductUpsert, StatusUpdate, User,
};
use super::{ApiError, Backend, DecodeError};
use crate::config::ClientConfig;

/// HTTP client for the food-ordering REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(http, config.api_url.clone()))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(http: reqwest::Client, mut base: Url) -> Self {
        // Url::join replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { http, base }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or any product fails validation.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductSnapshot>, ApiError> {
        let dtos: Vec<ProductDto> = self.fetch(self.http.get(self.url("productos")?)).await?;
        dtos.into_iter()
            .map(|dto| ProductSnapshot::try_from(dto).map_err(ApiError::from))
            .collect()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response fails validation.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &ProductUpsert) -> Result<ProductSnapshot, ApiError> {
        let dto: ProductDto = self
            .fetch(self.http.post(self.url("productos")?).json(product))
            .await?;
        Ok(ProductSnapshot::try_from(dto)?)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.execute::<serde_json::Value>(self.http.delete(self.url(&format!("productos/{id}"))?))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch(self.http.get(self.url("categorias")?)).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self, category), fields(name = %category.name))]
    pub async fn create_category(&self, category: &CategoryUpsert) -> Result<Category, ApiError> {
        self.fetch(self.http.post(self.url("categorias")?).json(category))
            .await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self, category))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        category: &CategoryUpsert,
    ) -> Result<Option<Category>, ApiError> {
        self.execute(
            self.http
                .put(self.url(&format!("categorias/{id}"))?)
                .json(category),
        )
        .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.execute::<serde_json::Value>(
            self.http.delete(self.url(&format!("categorias/{id}"))?),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List every order (admin view).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, ApiError> {
        self.fetch(self.http.get(self.url("pedidos")?)).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn fetch_order(&self, id: OrderId) -> Result<OrderRecord, ApiError> {
        self.fetch(self.http.get(self.url(&format!("pedidos/{id}"))?))
            .await
    }

    /// List the orders placed by one user.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderRecord>, ApiError> {
        self.fetch(
            self.http
                .get(self.url(&format!("pedidos/usuario/{user_id}"))?),
        )
        .await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, ApiError> {
        self.execute(
            self.http
                .put(self.url(&format!("pedidos/{id}/estado"))?)
                .json(&StatusUpdate { status }),
        )
        .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        self.fetch(self.http.post(self.url("usuarios")?).json(user))
            .await
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected, the request fails, or
    /// the response cannot be decoded.
    #[instrument(skip(self, login), fields(email = %login.email))]
    pub async fn login(&self, login: &LoginRequest) -> Result<User, ApiError> {
        self.fetch(self.http.post(self.url("usuarios/login")?).json(login))
            .await
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    #[instrument(skip(self))]
    pub async fn fetch_user(&self, id: UserId) -> Result<User, ApiError> {
        self.fetch(self.http.get(self.url(&format!("usuarios/{id}"))?))
            .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    /// Send a request and require a decoded body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.execute(request)
            .await?
            .ok_or_else(|| DecodeError::EmptyBody.into())
    }

    /// Send a request; `None` for 204 No Content or an empty body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                text
            };
            warn!(status = status.as_u16(), %message, "Backend request failed");
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Backend response");
        let value = serde_json::from_slice(&body).map_err(DecodeError::from)?;
        Ok(Some(value))
    }
}

impl Backend for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_product(&self, id: ProductId) -> Result<ProductSnapshot, ApiError> {
        let dto: ProductDto = self
            .fetch(self.http.get(self.url(&format!("productos/{id}"))?))
            .await?;
        Ok(ProductSnapshot::try_from(dto)?)
    }

    #[instrument(skip(self, order), fields(user_id = %order.user_id(), total = %order.total()))]
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderRecord, ApiError> {
        self.fetch(self.http.post(self.url("pedidos")?).json(order))
            .await
    }

    #[instrument(skip(self, product), fields(stock = product.stock))]
    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductUpsert,
    ) -> Result<Option<ProductSnapshot>, ApiError> {
        let dto: Option<ProductDto> = self
            .execute(
                self.http
                    .put(self.url(&format!("productos/{id}"))?)
                    .json(product),
            )
            .await?;
        Ok(dto.map(ProductSnapshot::try_from).transpose()?)
    }
}
