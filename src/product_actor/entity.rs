//! [`ActorEntity`] implementation for [`Product`].

use super::{ProductAction, ProductError};
use crate::clients::CategoryClient;
use crate::model::{Product, ProductCreate, ProductFilter, ProductId, ProductUpdate};
use actor_framework::{ActorClient, ActorEntity};
use async_trait::async_trait;
use rust_decimal::Decimal;

impl Product {
    fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::ValidationError("name is required".into()));
        }
        if self.price_min < Decimal::ZERO {
            return Err(ProductError::ValidationError(
                "prices must not be negative".into(),
            ));
        }
        if !self.price_in_range() {
            return Err(ProductError::ValidationError(format!(
                "price {} is outside [{}, {}]",
                self.price, self.price_min, self.price_max
            )));
        }
        Ok(())
    }

    async fn refresh_code(&mut self, categories: &CategoryClient) -> Result<(), ProductError> {
        let category = categories
            .get(self.category)
            .await
            .map_err(|e| ProductError::ActorCommunicationError(e.to_string()))?
            .ok_or_else(|| ProductError::UnknownCategory(self.category.to_string()))?;
        self.code = format!("{}-{}-{}", category.name, self.name, self.id.0);
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ();
    type Filter = ProductFilter;
    type Context = CategoryClient;
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        let product = Self {
            id,
            category: params.category,
            name: params.name.trim().to_string(),
            description: params.description,
            validity: params.validity,
            price_min: params.price_min,
            price: params.price,
            price_max: params.price_max,
            code: String::new(),
        };
        product.validate()?;
        Ok(product)
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        filter.category.map_or(true, |category| category == self.category)
    }

    /// Resolves the category and derives the code.
    async fn on_create(&mut self, categories: &CategoryClient) -> Result<(), Self::Error> {
        self.refresh_code(categories).await
    }

    async fn on_update(
        &mut self,
        update: ProductUpdate,
        categories: &CategoryClient,
    ) -> Result<(), Self::Error> {
        let rename = update.name.is_some() || update.category.is_some();
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(validity) = update.validity {
            self.validity = validity;
        }
        if let Some(price_min) = update.price_min {
            self.price_min = price_min;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(price_max) = update.price_max {
            self.price_max = price_max;
        }
        self.validate()?;
        if rename {
            self.refresh_code(categories).await?;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        match action {}
    }
}
