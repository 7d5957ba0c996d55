use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "1.0.0",
        description = r#"
# Product Catalog API

A backend for managing a product catalog: CRUD operations, keyword search
and product image storage.

## Features

- **Product Management**: Create, read, update and delete products
- **Keyword Search**: Case-insensitive substring search over name, brand, category and description
- **Image Storage**: Attach a binary image to a product via multipart upload

## Uploads

`POST /api/product` and `PUT /api/product/{id}` take `multipart/form-data`
bodies with a `product` JSON part and an optional `imageFile` binary part.

## Error Handling

The API uses a consistent error response format with appropriate HTTP status codes:

```json
{
  "error": "Not Found",
  "message": "Product 42 not found",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::add_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::search_products,
        crate::handlers::products::get_product_image,
    ),
    components(
        schemas(
            crate::handlers::products::ProductPayload,
            crate::handlers::products::ProductResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
