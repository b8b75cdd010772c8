//! Reference registries: suppliers, locations, categories, and units of
//! measure. Static lookup data with CRUD and soft delete only.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{category, location, supplier, unit_of_measure},
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierRequest {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitOfMeasureRequest {
    pub code: String,
    pub name: String,
}

#[derive(Clone)]
pub struct RegistryService {
    db: Arc<DbPool>,
}

impl RegistryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    // Suppliers

    #[instrument(skip(self, request))]
    pub async fn create_supplier(
        &self,
        request: SupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "supplier name must not be empty".to_string(),
            ));
        }

        let db = &*self.db;
        supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            contact_name: Set(request.contact_name),
            email: Set(request.email),
            phone: Set(request.phone),
            address: Set(request.address),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        request: SupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;
        let existing = self.get_supplier(supplier_id).await?;

        let mut active: supplier::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.contact_name = Set(request.contact_name);
        active.email = Set(request.email);
        active.phone = Set(request.phone);
        active.address = Set(request.address);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)
    }

    pub async fn deactivate_supplier(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = self.get_supplier(supplier_id).await?;
        let mut active: supplier::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;
        supplier::Entity::find_by_id(supplier_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", supplier_id)))
    }

    pub async fn list_suppliers(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<supplier::Model>, u64), ServiceError> {
        let db = &*self.db;
        let paginator = supplier::Entity::find()
            .order_by_asc(supplier::Column::Name)
            .paginate(db, limit);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((rows, total))
    }

    // Locations

    #[instrument(skip(self, request))]
    pub async fn create_location(
        &self,
        request: LocationRequest,
    ) -> Result<location::Model, ServiceError> {
        if request.code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "location code must not be empty".to_string(),
            ));
        }

        let db = &*self.db;
        let duplicate = location::Entity::find()
            .filter(location::Column::Code.eq(request.code.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Location code {} already exists",
                request.code
            )));
        }

        location::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(request.code),
            name: Set(request.name),
            description: Set(request.description),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn deactivate_location(&self, location_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = self.get_location(location_id).await?;
        let mut active: location::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    pub async fn get_location(&self, location_id: Uuid) -> Result<location::Model, ServiceError> {
        let db = &*self.db;
        location::Entity::find_by_id(location_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Location {} not found", location_id)))
    }

    pub async fn list_locations(&self) -> Result<Vec<location::Model>, ServiceError> {
        let db = &*self.db;
        location::Entity::find()
            .order_by_asc(location::Column::Code)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    // Categories

    #[instrument(skip(self, request))]
    pub async fn create_category(
        &self,
        request: CategoryRequest,
    ) -> Result<category::Model, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "category name must not be empty".to_string(),
            ));
        }

        let db = &*self.db;
        category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn deactivate_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = category::Entity::find_by_id(category_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))?;
        let mut active: category::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        let db = &*self.db;
        category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    // Units of measure

    #[instrument(skip(self, request))]
    pub async fn create_unit(
        &self,
        request: UnitOfMeasureRequest,
    ) -> Result<unit_of_measure::Model, ServiceError> {
        if request.code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "unit code must not be empty".to_string(),
            ));
        }

        let db = &*self.db;
        unit_of_measure::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(request.code),
            name: Set(request.name),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn deactivate_unit(&self, unit_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = unit_of_measure::Entity::find_by_id(unit_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Unit {} not found", unit_id)))?;
        let mut active: unit_of_measure::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::db_error)?;
        Ok(())
    }

    pub async fn list_units(&self) -> Result<Vec<unit_of_measure::Model>, ServiceError> {
        let db = &*self.db;
        unit_of_measure::Entity::find()
            .order_by_asc(unit_of_measure::Column::Code)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}
