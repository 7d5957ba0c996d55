use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response,
};
use crate::{
    errors::ApiError,
    services::products::{ImageUpload, ProductInput},
    AppState,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::header,
    routing::get,
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Multipart part carrying the product JSON
const PRODUCT_PART: &str = "product";
/// Multipart part carrying the binary image
const IMAGE_FILE_PART: &str = "imageFile";
/// Upper bound for multipart bodies (image uploads)
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/product", axum::routing::post(add_product))
        .route(
            "/product/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/product/:id/image", get(get_product_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// List all products
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Products retrieved", body = [ProductResponse])
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list_products()
        .await
        .map_err(map_service_error)?;

    let products: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();

    Ok(success_response(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/product/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product retrieved", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductResponse::from(product)))
}

/// Add a new product
///
/// Expects a multipart body with a `product` JSON part and an optional
/// `imageFile` binary part.
#[utoipa::path(
    post,
    path = "/api/product",
    request_body(
        content = ProductPayload,
        content_type = "multipart/form-data",
        description = "JSON part 'product' plus optional binary part 'imageFile'"
    ),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Malformed multipart payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn add_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (payload, image) = read_product_multipart(multipart).await?;

    let product = state
        .services
        .products
        .create_product(payload.into(), image)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(ProductResponse::from(product)))
}

/// Replace a product
///
/// Non-image fields are overwritten from the `product` part; the stored image
/// is replaced only when a non-empty `imageFile` part is present.
#[utoipa::path(
    put,
    path = "/api/product/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body(
        content = ProductPayload,
        content_type = "multipart/form-data",
        description = "JSON part 'product' plus optional binary part 'imageFile'"
    ),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Malformed multipart payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (payload, image) = read_product_multipart(multipart).await?;

    let product = state
        .services
        .products
        .update_product(id, payload.into(), image)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductResponse::from(product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/product/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted")
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Search products by keyword
///
/// Case-insensitive substring match over name, brand, category and
/// description. A blank keyword returns every product.
#[utoipa::path(
    get,
    path = "/api/products/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Products search results", body = [ProductResponse])
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .search_products(&params.keyword)
        .await
        .map_err(map_service_error)?;

    let products: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();

    Ok(success_response(products))
}

/// Fetch the raw image of a product
#[utoipa::path(
    get,
    path = "/api/product/{id}/image",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 404, description = "Product or image not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let image = state
        .services
        .products
        .get_product_image(id)
        .await
        .map_err(map_service_error)?;

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes))
}

/// Reads the `product` JSON part and the optional `imageFile` binary part
/// out of a multipart body. Unknown parts are ignored.
async fn read_product_multipart(
    mut multipart: Multipart,
) -> Result<(ProductPayload, Option<ImageUpload>), ApiError> {
    let mut payload: Option<ProductPayload> = None;
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|name| name.to_string());

        match name.as_deref() {
            Some(PRODUCT_PART) => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Unreadable part '{}': {}", PRODUCT_PART, e))
                })?;
                let parsed = serde_json::from_str(&text).map_err(|e| {
                    ApiError::BadRequest(format!(
                        "Part '{}' is not valid JSON: {}",
                        PRODUCT_PART, e
                    ))
                })?;
                payload = Some(parsed);
            }
            Some(IMAGE_FILE_PART) => {
                let file_name = field
                    .file_name()
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| IMAGE_FILE_PART.to_string());
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Unreadable part '{}': {}", IMAGE_FILE_PART, e))
                })?;

                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let payload = payload
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required part '{}'", PRODUCT_PART)))?;

    Ok((payload, image))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Wireless Bluetooth Headphones",
    "description": "Over-ear wireless headphones with active noise cancellation.",
    "brand": "AudioTech",
    "category": "electronics",
    "price": 149.99,
    "releaseDate": "15-03-2024",
    "available": true,
    "quantity": 50
}))]
pub struct ProductPayload {
    /// Product display name
    #[serde(default)]
    #[schema(example = "Wireless Bluetooth Headphones")]
    pub name: Option<String>,
    /// Product description
    #[serde(default)]
    #[schema(example = "Over-ear wireless headphones with active noise cancellation.")]
    pub description: Option<String>,
    /// Brand name
    #[serde(default)]
    #[schema(example = "AudioTech")]
    pub brand: Option<String>,
    /// Category label
    #[serde(default)]
    #[schema(example = "electronics")]
    pub category: Option<String>,
    /// Sale price (decimal, accepted as number or string)
    #[serde(default)]
    #[schema(example = "149.99")]
    pub price: Option<Decimal>,
    /// Release date in dd-MM-yyyy form
    #[serde(default, with = "release_date_format")]
    #[schema(example = "15-03-2024", value_type = String)]
    pub release_date: Option<NaiveDate>,
    /// Whether the product is available
    #[serde(default)]
    #[schema(example = true)]
    pub available: bool,
    /// Stock quantity
    #[serde(default)]
    #[schema(example = 50)]
    pub quantity: i32,
}

impl From<ProductPayload> for ProductInput {
    fn from(payload: ProductPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            brand: payload.brand,
            category: payload.category,
            price: payload.price,
            release_date: payload.release_date,
            available: payload.available,
            quantity: payload.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 42,
    "name": "Wireless Bluetooth Headphones",
    "description": "Over-ear wireless headphones with active noise cancellation.",
    "brand": "AudioTech",
    "category": "electronics",
    "price": "149.99",
    "releaseDate": "15-03-2024",
    "available": true,
    "quantity": 50,
    "imageName": "headphones.png",
    "imageType": "image/png",
    "imageData": "iVBORw0KGgo="
}))]
pub struct ProductResponse {
    /// Product ID
    #[schema(example = 42)]
    pub id: i32,
    /// Product display name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Wireless Bluetooth Headphones")]
    pub name: Option<String>,
    /// Product description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Brand name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "AudioTech")]
    pub brand: Option<String>,
    /// Category label
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "electronics")]
    pub category: Option<String>,
    /// Sale price
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "149.99")]
    pub price: Option<Decimal>,
    /// Release date in dd-MM-yyyy form
    #[serde(with = "release_date_format", skip_serializing_if = "Option::is_none")]
    #[schema(example = "15-03-2024", value_type = String)]
    pub release_date: Option<NaiveDate>,
    /// Whether the product is available
    #[schema(example = true)]
    pub available: bool,
    /// Stock quantity
    #[schema(example = 50)]
    pub quantity: i32,
    /// File name of the attached image
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "headphones.png")]
    pub image_name: Option<String>,
    /// MIME type of the attached image
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "image/png")]
    pub image_type: Option<String>,
    /// Base64-encoded bytes of the attached image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl From<crate::entities::product::Model> for ProductResponse {
    fn from(model: crate::entities::product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            brand: model.brand,
            category: model.category,
            price: model.price,
            release_date: model.release_date,
            available: model.available,
            quantity: model.quantity,
            image_name: model.image_name,
            image_type: model.image_type,
            image_data: model
                .image_data
                .map(|bytes| general_purpose::STANDARD.encode(bytes)),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Keyword to match against name, brand, category and description
    #[serde(default)]
    pub keyword: String,
}

/// Wire format for release dates (dd-MM-yyyy)
mod release_date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d-%m-%Y";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => NaiveDate::parse_from_str(&raw, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
