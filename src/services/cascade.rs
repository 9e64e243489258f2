// src/services/cascade.rs
//
// Coordenador da cascata: uma mudança de proprietário re-deriva, nessa
// ordem, unidade -> prédio -> projeto. A ordem importa: o cálculo do prédio
// depende dos status frescos das unidades, e o do projeto depende dos
// percentuais frescos dos prédios.
//
// Falha depois da escrita primária não derruba a ação do usuário: é capturada
// e devolvida como estágio degradado (agregados ficam stale até o próximo
// recálculo bem-sucedido).

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BuildingRepository, OwnerRepository, UnitRepository},
    models::unit::UnitStatus,
    services::{
        majority::{BuildingAggregate, MajorityEngine, ProjectAggregate},
        unit_status::UnitStatusResolver,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CascadeStage {
    Unit,
    Building,
    Project,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CascadeFailure {
    pub stage: CascadeStage,
    pub message: String,
}

/// Resultado da cascata: distingue "ação primária ok" de "cascata ok ou
/// degradada". Estágios não alcançados ficam como None.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CascadeOutcome {
    pub unit_status: Option<UnitStatus>,
    pub building: Option<BuildingAggregate>,
    pub project: Option<ProjectAggregate>,
    pub degraded: Option<CascadeFailure>,
}

impl CascadeOutcome {
    fn empty() -> Self {
        Self {
            unit_status: None,
            building: None,
            project: None,
            degraded: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Exclusão mútua por projeto: cascatas concorrentes de proprietários do
/// mesmo projeto serializam a leitura-e-escrita dos caches de prédio E de
/// projeto (sem isso, last-writer-wins nos percentuais).
#[derive(Default)]
pub struct CascadeLocks {
    inner: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl CascadeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn acquire(&self, project_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(project_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Clone)]
pub struct CascadeCoordinator {
    units: UnitRepository,
    owners: OwnerRepository,
    buildings: BuildingRepository,
    resolver: UnitStatusResolver,
    engine: MajorityEngine,
    locks: Arc<CascadeLocks>,
}

impl CascadeCoordinator {
    pub fn new(
        units: UnitRepository,
        owners: OwnerRepository,
        buildings: BuildingRepository,
        resolver: UnitStatusResolver,
        engine: MajorityEngine,
        locks: Arc<CascadeLocks>,
    ) -> Self {
        Self {
            units,
            owners,
            buildings,
            resolver,
            engine,
            locks,
        }
    }

    /// Cascata a partir de um proprietário (aprovação/rejeição de assinatura,
    /// PUT direto de status, rotinas de manutenção).
    pub async fn run_for_owner(&self, pool: &PgPool, owner_id: Uuid) -> CascadeOutcome {
        let owner = match self.owners.find_by_id(pool, owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return degraded(CascadeStage::Unit, AppError::OwnerNotFound),
            Err(e) => return degraded(CascadeStage::Unit, e),
        };

        self.run_for_unit(pool, owner.unit_id).await
    }

    /// Cascata a partir de uma unidade, estritamente nesta ordem:
    /// 1. resolvedor de status da unidade
    /// 2. motor de maioria do prédio dono
    /// 3. motor de maioria do projeto dono
    pub async fn run_for_unit(&self, pool: &PgPool, unit_id: Uuid) -> CascadeOutcome {
        let mut outcome = CascadeOutcome::empty();

        let unit = match self.units.find_by_id(pool, unit_id).await {
            Ok(Some(unit)) => unit,
            Ok(None) => return degraded(CascadeStage::Unit, AppError::UnitNotFound),
            Err(e) => return degraded(CascadeStage::Unit, e),
        };

        let building = match self.buildings.find_by_id(pool, unit.building_id).await {
            Ok(Some(building)) => building,
            Ok(None) => return degraded(CascadeStage::Building, AppError::BuildingNotFound),
            Err(e) => return degraded(CascadeStage::Building, e),
        };

        // Serializa cascatas concorrentes do mesmo projeto
        let _guard = self.locks.acquire(building.project_id).await;

        // Etapa 1: unidade
        match self.resolver.refresh_unit(pool, unit_id).await {
            Ok(status) => outcome.unit_status = Some(status),
            Err(e) => {
                outcome.degraded = Some(log_failure(CascadeStage::Unit, &e));
                return outcome;
            }
        }

        // Etapa 2: prédio
        match self.engine.calculate_building(pool, unit.building_id).await {
            Ok(aggregate) => outcome.building = Some(aggregate),
            Err(e) => {
                outcome.degraded = Some(log_failure(CascadeStage::Building, &e));
                return outcome;
            }
        }

        // Etapa 3: projeto
        match self.engine.calculate_project(pool, building.project_id).await {
            Ok(aggregate) => outcome.project = Some(aggregate),
            Err(e) => {
                outcome.degraded = Some(log_failure(CascadeStage::Project, &e));
                return outcome;
            }
        }

        outcome
    }
}

fn log_failure(stage: CascadeStage, error: &AppError) -> CascadeFailure {
    tracing::warn!(
        stage = ?stage,
        error = %error,
        "Cascata degradada; agregados ficam stale até o próximo recálculo"
    );
    CascadeFailure {
        stage,
        message: error.to_string(),
    }
}

fn degraded(stage: CascadeStage, error: AppError) -> CascadeOutcome {
    let mut outcome = CascadeOutcome::empty();
    outcome.degraded = Some(log_failure(stage, &error));
    outcome
}
