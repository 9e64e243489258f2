// src/services/project_service.rs
//
// CRUD do portfólio (projeto / prédio / unidade) com soft-delete em cascata.
// Os agregados derivados ficam por conta do motor de maioria.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BuildingRepository, ProjectRepository, UnitRepository},
    models::{
        building::{Building, CreateBuildingPayload},
        project::{CreateProjectPayload, Project},
        unit::{CreateUnitPayload, Unit},
    },
};

/// Invariante do projeto: 0 <= critical <= required <= 100
pub fn validate_thresholds(required: Decimal, critical: Decimal) -> Result<(), AppError> {
    if critical < Decimal::ZERO
        || required > Decimal::ONE_HUNDRED
        || critical > required
    {
        return Err(AppError::InvalidThresholds);
    }
    Ok(())
}

#[derive(Clone)]
pub struct ProjectService {
    projects: ProjectRepository,
    buildings: BuildingRepository,
    units: UnitRepository,
}

impl ProjectService {
    pub fn new(
        projects: ProjectRepository,
        buildings: BuildingRepository,
        units: UnitRepository,
    ) -> Self {
        Self {
            projects,
            buildings,
            units,
        }
    }

    // --- PROJETOS ---

    pub async fn create_project(
        &self,
        pool: &PgPool,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError> {
        validate_thresholds(
            payload.required_majority_percent,
            payload.critical_threshold_percent,
        )?;

        self.projects
            .create(
                pool,
                &payload.project_name,
                &payload.project_code,
                payload.description.as_deref(),
                payload.required_majority_percent,
                payload.critical_threshold_percent,
                payload.majority_calc_type,
            )
            .await
    }

    pub async fn list_projects(&self, pool: &PgPool) -> Result<Vec<Project>, AppError> {
        self.projects.list(pool).await
    }

    pub async fn get_project(&self, pool: &PgPool, id: Uuid) -> Result<Project, AppError> {
        self.projects
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    pub async fn delete_project(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        self.get_project(pool, id).await?;
        self.projects.soft_delete_cascade(pool, id).await?;

        tracing::info!(project_id = %id, "Projeto soft-deletado (cascata até proprietários)");
        Ok(())
    }

    // --- PRÉDIOS ---

    pub async fn create_building(
        &self,
        pool: &PgPool,
        payload: &CreateBuildingPayload,
    ) -> Result<Building, AppError> {
        self.get_project(pool, payload.project_id).await?;

        self.buildings
            .create(
                pool,
                payload.project_id,
                &payload.building_name,
                payload.address.as_deref(),
            )
            .await
    }

    pub async fn list_buildings(
        &self,
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Building>, AppError> {
        self.get_project(pool, project_id).await?;
        self.buildings.list_by_project(pool, project_id).await
    }

    pub async fn get_building(&self, pool: &PgPool, id: Uuid) -> Result<Building, AppError> {
        self.buildings
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::BuildingNotFound)
    }

    pub async fn delete_building(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        self.get_building(pool, id).await?;
        self.buildings.soft_delete_cascade(pool, id).await?;

        tracing::info!(building_id = %id, "Prédio soft-deletado (cascata até proprietários)");
        Ok(())
    }

    // --- UNIDADES ---

    pub async fn create_unit(
        &self,
        pool: &PgPool,
        payload: &CreateUnitPayload,
    ) -> Result<Unit, AppError> {
        self.get_building(pool, payload.building_id).await?;

        self.units
            .create(
                pool,
                payload.building_id,
                payload.floor_number,
                &payload.unit_number,
                payload.area_sqm,
            )
            .await
    }

    pub async fn list_units(
        &self,
        pool: &PgPool,
        building_id: Uuid,
    ) -> Result<Vec<Unit>, AppError> {
        self.get_building(pool, building_id).await?;
        self.units.list_by_building(pool, building_id).await
    }

    pub async fn get_unit(&self, pool: &PgPool, id: Uuid) -> Result<Unit, AppError> {
        self.units
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::UnitNotFound)
    }

    pub async fn delete_unit(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        self.get_unit(pool, id).await?;
        self.units.soft_delete_cascade(pool, id).await?;

        tracing::info!(unit_id = %id, "Unidade soft-deletada (cascata até proprietários)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn limiares_validos() {
        assert!(validate_thresholds(dec("66.67"), dec("50")).is_ok());
        assert!(validate_thresholds(dec("100"), dec("0")).is_ok());
        assert!(validate_thresholds(dec("60"), dec("60")).is_ok());
    }

    #[test]
    fn critico_acima_da_maioria_falha() {
        assert!(matches!(
            validate_thresholds(dec("50"), dec("66.67")),
            Err(AppError::InvalidThresholds)
        ));
    }

    #[test]
    fn limiares_fora_da_faixa_falham() {
        assert!(validate_thresholds(dec("120"), dec("50")).is_err());
        assert!(validate_thresholds(dec("50"), dec("-1")).is_err());
    }
}
