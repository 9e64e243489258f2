// src/services/majority.rs
//
// Motor de maioria: percentual de consenso por prédio e por projeto.
// O cálculo é uma função pura sobre um snapshot imutável das unidades;
// a persistência do agregado é um passo separado (os campos no banco são
// cache derivado, nunca autoritativos).

use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BuildingRepository, OwnerRepository, ProjectRepository, UnitRepository},
    models::{
        building::TrafficLight,
        owner::OwnerStatus,
        project::MajorityCalcType,
    },
    services::unit_status::{self, UnitStatusResolver},
};

// Cálculo de prédio deve ficar abaixo de 3s.
// Estourar o orçamento gera warn, nunca erro.
const BUILDING_CALC_BUDGET: Duration = Duration::from_secs(3);

/// Snapshot imutável de uma unidade no momento do cálculo
#[derive(Debug, Clone)]
pub struct UnitSnapshot {
    pub area_sqm: Option<Decimal>,
    pub owner_statuses: Vec<OwnerStatus>,
}

impl UnitSnapshot {
    /// Uma unidade só conta no numerador com TODOS os proprietários atuais
    /// assinados. Crédito parcial não existe: meio assinada vale 0, não 50%.
    pub fn is_fully_signed(&self) -> bool {
        !self.owner_statuses.is_empty()
            && unit_status::signed_count(&self.owner_statuses) == self.owner_statuses.len()
    }

    pub fn has_any_signed(&self) -> bool {
        unit_status::signed_count(&self.owner_statuses) > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingAggregate {
    #[schema(value_type = f64)]
    pub signature_percentage: Decimal,
    #[schema(value_type = f64)]
    pub signature_percentage_by_area: Decimal,
    pub traffic_light: TrafficLight,
    pub total_units: i32,
    pub units_signed: i32,
    pub units_partially_signed: i32,
    pub units_not_signed: i32,
    #[schema(value_type = f64)]
    pub signed_area: Decimal,
    #[schema(value_type = f64)]
    pub total_area: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAggregate {
    #[schema(value_type = f64)]
    pub signature_percentage: Decimal,
    #[schema(value_type = f64)]
    pub signature_percentage_by_area: Decimal,
    pub total_units: i32,
    pub units_signed: i32,
    pub units_partially_signed: i32,
    pub units_not_signed: i32,
}

fn percentage(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator * Decimal::ONE_HUNDRED
    }
}

/// Classificação do farol contra os limiares do projeto.
/// GRAY fica por conta do chamador (prédio sem unidades = sem dados).
pub fn classify(percentage: Decimal, required: Decimal, critical: Decimal) -> TrafficLight {
    if percentage >= required {
        TrafficLight::Green
    } else if percentage >= critical {
        TrafficLight::Yellow
    } else {
        TrafficLight::Red
    }
}

/// Cálculo puro do agregado de um prédio.
///
/// HEADCOUNT: unidades totalmente assinadas / total de unidades.
/// AREA: área das unidades totalmente assinadas / área das unidades com área
/// conhecida (sem área = fora do numerador E do denominador).
/// O farol usa o percentual que corresponde ao majority_calc_type do projeto
/// (AREA usa área; os demais caem no headcount).
pub fn compute_building(
    units: &[UnitSnapshot],
    calc_type: MajorityCalcType,
    required: Decimal,
    critical: Decimal,
) -> BuildingAggregate {
    let total_units = units.len() as i32;

    let mut units_signed = 0i32;
    let mut units_partially_signed = 0i32;
    let mut units_not_signed = 0i32;
    let mut total_area = Decimal::ZERO;
    let mut signed_area = Decimal::ZERO;

    for unit in units {
        if unit.is_fully_signed() {
            units_signed += 1;
        } else if unit.has_any_signed() {
            units_partially_signed += 1;
        } else {
            units_not_signed += 1;
        }

        if let Some(area) = unit.area_sqm {
            total_area += area;
            if unit.is_fully_signed() {
                signed_area += area;
            }
        }
    }

    let signature_percentage = percentage(Decimal::from(units_signed), Decimal::from(total_units));
    let signature_percentage_by_area = percentage(signed_area, total_area);

    let driving = match calc_type {
        MajorityCalcType::Area => signature_percentage_by_area,
        _ => signature_percentage,
    };

    let traffic_light = if total_units == 0 {
        TrafficLight::Gray
    } else {
        classify(driving, required, critical)
    };

    BuildingAggregate {
        signature_percentage,
        signature_percentage_by_area,
        traffic_light,
        total_units,
        units_signed,
        units_partially_signed,
        units_not_signed,
        signed_area,
        total_area,
    }
}

#[derive(Clone)]
pub struct MajorityEngine {
    projects: ProjectRepository,
    buildings: BuildingRepository,
    units: UnitRepository,
    owners: OwnerRepository,
    resolver: UnitStatusResolver,
}

impl MajorityEngine {
    pub fn new(
        projects: ProjectRepository,
        buildings: BuildingRepository,
        units: UnitRepository,
        owners: OwnerRepository,
        resolver: UnitStatusResolver,
    ) -> Self {
        Self {
            projects,
            buildings,
            units,
            owners,
            resolver,
        }
    }

    /// Recalcula o agregado de um prédio e persiste o cache.
    /// Idempotente: sem mutação no meio, duas chamadas dão o mesmo resultado.
    pub async fn calculate_building(
        &self,
        pool: &PgPool,
        building_id: Uuid,
    ) -> Result<BuildingAggregate, AppError> {
        let started = Instant::now();

        let building = self
            .buildings
            .find_by_id(pool, building_id)
            .await?
            .ok_or(AppError::BuildingNotFound)?;

        let project = self
            .projects
            .find_by_id(pool, building.project_id)
            .await?
            .ok_or(AppError::ProjectNotFound)?;

        // 1. Re-resolve o status de cada unidade antes de agregar.
        //    O cálculo de maioria não é read-only: ele força consistência.
        let units = self.units.list_by_building(pool, building_id).await?;
        for unit in &units {
            self.resolver.refresh_unit(pool, unit.id).await?;
        }

        // 2. Snapshot imutável das unidades + proprietários atuais
        let mut snapshot = Vec::with_capacity(units.len());
        for unit in &units {
            let owners = self.owners.list_current_by_unit(pool, unit.id).await?;
            snapshot.push(UnitSnapshot {
                area_sqm: unit.area_sqm,
                owner_statuses: owners.iter().map(|o| o.owner_status).collect(),
            });
        }

        // 3. Cálculo puro
        let aggregate = compute_building(
            &snapshot,
            project.majority_calc_type,
            project.required_majority_percent,
            project.critical_threshold_percent,
        );

        // 4. Persistência do cache, num passo único e separado
        self.buildings
            .update_aggregates(pool, building_id, &aggregate)
            .await?;

        let elapsed = started.elapsed();
        if elapsed > BUILDING_CALC_BUDGET {
            tracing::warn!(
                building_id = %building_id,
                elapsed_ms = elapsed.as_millis() as u64,
                "Cálculo de maioria do prédio estourou o orçamento de 3s"
            );
        }

        tracing::info!(
            building_id = %building_id,
            signature_percentage = %aggregate.signature_percentage.round_dp(2),
            signature_percentage_by_area = %aggregate.signature_percentage_by_area.round_dp(2),
            traffic_light = ?aggregate.traffic_light,
            units_signed = aggregate.units_signed,
            total_units = aggregate.total_units,
            calc_type = ?project.majority_calc_type,
            "Maioria do prédio calculada"
        );

        Ok(aggregate)
    }

    /// Recalcula todos os prédios do projeto e soma tallies e áreas.
    /// Não existe farol no nível de projeto (ver prédios).
    pub async fn calculate_project(
        &self,
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<ProjectAggregate, AppError> {
        let project = self
            .projects
            .find_by_id(pool, project_id)
            .await?
            .ok_or(AppError::ProjectNotFound)?;

        let buildings = self.buildings.list_by_project(pool, project_id).await?;

        let mut total_units = 0i32;
        let mut units_signed = 0i32;
        let mut units_partially_signed = 0i32;
        let mut units_not_signed = 0i32;
        let mut total_area = Decimal::ZERO;
        let mut signed_area = Decimal::ZERO;

        for building in &buildings {
            let aggregate = self.calculate_building(pool, building.id).await?;
            total_units += aggregate.total_units;
            units_signed += aggregate.units_signed;
            units_partially_signed += aggregate.units_partially_signed;
            units_not_signed += aggregate.units_not_signed;
            total_area += aggregate.total_area;
            signed_area += aggregate.signed_area;
        }

        let aggregate = ProjectAggregate {
            signature_percentage: percentage(Decimal::from(units_signed), Decimal::from(total_units)),
            signature_percentage_by_area: percentage(signed_area, total_area),
            total_units,
            units_signed,
            units_partially_signed,
            units_not_signed,
        };

        self.projects
            .update_aggregates(
                pool,
                project_id,
                aggregate.signature_percentage.round_dp(2),
                aggregate.signature_percentage_by_area.round_dp(2),
            )
            .await?;

        tracing::info!(
            project_id = %project.id,
            signature_percentage = %aggregate.signature_percentage.round_dp(2),
            units_signed = aggregate.units_signed,
            total_units = aggregate.total_units,
            "Maioria do projeto calculada"
        );

        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use OwnerStatus::*;

    fn unit(area: Option<&str>, statuses: &[OwnerStatus]) -> UnitSnapshot {
        UnitSnapshot {
            area_sqm: area.map(|a| Decimal::from_str(a).unwrap()),
            owner_statuses: statuses.to_vec(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn predio_com_dez_unidades_seis_assinadas() {
        // 10 unidades de 100m², 6 totalmente assinadas:
        // headcount = 60.0, área = 60.0; 66.67/50.0 -> YELLOW
        let mut units = Vec::new();
        for i in 0..10 {
            let statuses = if i < 6 { vec![Signed] } else { vec![NotContacted] };
            units.push(UnitSnapshot {
                area_sqm: Some(dec("100")),
                owner_statuses: statuses,
            });
        }

        let agg = compute_building(
            &units,
            MajorityCalcType::Headcount,
            dec("66.67"),
            dec("50.0"),
        );

        assert_eq!(agg.signature_percentage, dec("60"));
        assert_eq!(agg.signature_percentage_by_area, dec("60"));
        assert_eq!(agg.traffic_light, TrafficLight::Yellow);
        assert_eq!(agg.units_signed, 6);
        assert_eq!(agg.units_not_signed, 4);
    }

    #[test]
    fn unidade_meio_assinada_contribui_zero() {
        // 2 proprietários (60/40), um assinou: a unidade vale 0 no headcount
        // e a área dela fica fora do numerador
        let units = vec![
            unit(Some("100"), &[Signed, NotContacted]),
            unit(Some("100"), &[Signed]),
        ];

        let agg = compute_building(&units, MajorityCalcType::Headcount, dec("50"), dec("25"));

        assert_eq!(agg.signature_percentage, dec("50"));
        assert_eq!(agg.signature_percentage_by_area, dec("50"));
        assert_eq!(agg.units_partially_signed, 1);
        assert_eq!(agg.units_signed, 1);
    }

    #[test]
    fn unidade_sem_area_fica_fora_dos_dois_lados() {
        let units = vec![
            unit(Some("80"), &[Signed]),
            unit(None, &[Signed]),
            unit(Some("20"), &[NotContacted]),
        ];

        let agg = compute_building(&units, MajorityCalcType::Area, dec("90"), dec("50"));

        // área: 80 assinados de 100 conhecidos = 80%
        assert_eq!(agg.signature_percentage_by_area, dec("80"));
        // farol dirigido pela área (AREA): 80 < 90 e >= 50 -> YELLOW
        assert_eq!(agg.traffic_light, TrafficLight::Yellow);
    }

    #[test]
    fn tallies_sempre_fecham_com_o_total() {
        let units = vec![
            unit(Some("50"), &[Signed, Signed]),
            unit(Some("50"), &[Signed, NotContacted]),
            unit(None, &[NotContacted]),
            unit(None, &[]),
        ];

        let agg = compute_building(&units, MajorityCalcType::Headcount, dec("66"), dec("33"));

        assert_eq!(
            agg.units_signed + agg.units_partially_signed + agg.units_not_signed,
            agg.total_units
        );
        assert!(agg.signature_percentage >= Decimal::ZERO);
        assert!(agg.signature_percentage <= Decimal::ONE_HUNDRED);
    }

    #[test]
    fn predio_vazio_fica_cinza() {
        let agg = compute_building(&[], MajorityCalcType::Headcount, dec("66"), dec("33"));
        assert_eq!(agg.traffic_light, TrafficLight::Gray);
        assert_eq!(agg.signature_percentage, Decimal::ZERO);
    }

    #[test]
    fn calculo_e_idempotente() {
        let units = vec![
            unit(Some("100"), &[Signed]),
            unit(Some("60"), &[Signed, WaitForSign]),
        ];

        let a = compute_building(&units, MajorityCalcType::Area, dec("66.67"), dec("50"));
        let b = compute_building(&units, MajorityCalcType::Area, dec("66.67"), dec("50"));
        assert_eq!(a, b);
    }

    #[test]
    fn farol_e_monotonico_no_percentual() {
        // subir o percentual nunca piora o farol
        let required = dec("66.67");
        let critical = dec("50");

        let rank = |tl: TrafficLight| match tl {
            TrafficLight::Red => 0,
            TrafficLight::Yellow => 1,
            TrafficLight::Green => 2,
            TrafficLight::Gray => unreachable!(),
        };

        let mut last = rank(classify(Decimal::ZERO, required, critical));
        for pct in 1..=100 {
            let current = rank(classify(Decimal::from(pct), required, critical));
            assert!(current >= last, "farol piorou ao subir para {pct}%");
            last = current;
        }
    }

    #[test]
    fn limiares_exatos() {
        let required = dec("66.67");
        let critical = dec("50");
        assert_eq!(classify(dec("66.67"), required, critical), TrafficLight::Green);
        assert_eq!(classify(dec("66.66"), required, critical), TrafficLight::Yellow);
        assert_eq!(classify(dec("50"), required, critical), TrafficLight::Yellow);
        assert_eq!(classify(dec("49.99"), required, critical), TrafficLight::Red);
    }
}
