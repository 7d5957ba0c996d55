use crate::{
    entities::product::{self, Entity as Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Product service for managing the catalog
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// List all products
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        Product::find().all(&*self.db).await.map_err(Into::into)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: i32) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Create a new product, attaching the image when a non-empty upload is present
    #[instrument(skip(self, image))]
    pub async fn create_product(
        &self,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<product::Model, ServiceError> {
        let mut active = product::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            brand: Set(input.brand),
            category: Set(input.category),
            price: Set(input.price),
            release_date: Set(input.release_date),
            available: Set(input.available),
            quantity: Set(input.quantity),
            image_name: Set(None),
            image_type: Set(None),
            image_data: Set(None),
            ..Default::default()
        };

        if let Some(image) = image.filter(|upload| !upload.is_empty()) {
            active.image_name = Set(Some(image.file_name));
            active.image_type = Set(Some(image.content_type));
            active.image_data = Set(Some(image.bytes));
        }

        let product = active.insert(&*self.db).await?;

        // Publish event
        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;

        info!("Created product: {}", product.id);
        Ok(product)
    }

    /// Replace an existing product
    ///
    /// Every non-image column is overwritten from the input. The stored image
    /// survives unless a new non-empty upload replaces it.
    #[instrument(skip(self, image))]
    pub async fn update_product(
        &self,
        product_id: i32,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<product::Model, ServiceError> {
        let product = self.get_product(product_id).await?;
        let mut active: product::ActiveModel = product.into();

        active.name = Set(input.name);
        active.description = Set(input.description);
        active.brand = Set(input.brand);
        active.category = Set(input.category);
        active.price = Set(input.price);
        active.release_date = Set(input.release_date);
        active.available = Set(input.available);
        active.quantity = Set(input.quantity);

        if let Some(image) = image.filter(|upload| !upload.is_empty()) {
            active.image_name = Set(Some(image.file_name));
            active.image_type = Set(Some(image.content_type));
            active.image_data = Set(Some(image.bytes));
        }

        let product = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        info!("Updated product: {}", product_id);
        Ok(product)
    }

    /// Delete a product by ID
    ///
    /// Deleting an absent product is a no-op success.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i32) -> Result<(), ServiceError> {
        let result = Product::delete_by_id(product_id).exec(&*self.db).await?;

        if result.rows_affected > 0 {
            self.event_sender
                .send_or_log(Event::ProductDeleted(product_id))
                .await;
            info!("Deleted product: {}", product_id);
        }

        Ok(())
    }

    /// Search products by keyword
    ///
    /// Case-insensitive substring match over name, brand, category and
    /// description. A blank keyword matches everything.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        keyword: &str,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.list_products().await;
        }

        // lower() LIKE keeps matching behavior identical across backends
        let pattern = format!("%{}%", keyword.to_lowercase());
        let matches =
            |column: product::Column| Expr::expr(Func::lower(Expr::col(column))).like(&pattern);

        Product::find()
            .filter(
                Condition::any()
                    .add(matches(product::Column::Name))
                    .add(matches(product::Column::Brand))
                    .add(matches(product::Column::Category))
                    .add(matches(product::Column::Description)),
            )
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Get the stored image of a product
    ///
    /// Not found when either the product or its image is absent.
    #[instrument(skip(self))]
    pub async fn get_product_image(&self, product_id: i32) -> Result<ProductImage, ServiceError> {
        let product = self.get_product(product_id).await?;

        match (product.image_name, product.image_type, product.image_data) {
            (Some(file_name), Some(content_type), Some(bytes)) => Ok(ProductImage {
                file_name,
                content_type,
                bytes,
            }),
            _ => Err(ServiceError::NotFound(format!(
                "Product {} has no image",
                product_id
            ))),
        }
    }
}

/// Input for creating or replacing a product
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub release_date: Option<NaiveDate>,
    pub available: bool,
    pub quantity: i32,
}

/// Binary upload extracted from a multipart request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// An upload with no bytes counts as absent
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Stored image attachment of a product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
