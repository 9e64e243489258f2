// src/services/unit_status.rs
//
// Derivação do status agregado de uma unidade a partir dos seus
// proprietários atuais. O cálculo é puro; a persistência entra depois.

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OwnerRepository, UnitRepository},
    models::{owner::OwnerStatus, unit::UnitStatus},
};

/// Regra de derivação:
/// - sem proprietários atuais -> NOT_CONTACTED
/// - todos SIGNED -> SIGNED
/// - pelo menos um (mas não todos) SIGNED -> PARTIALLY_SIGNED
/// - nenhum SIGNED -> NOT_CONTACTED
pub fn resolve(owner_statuses: &[OwnerStatus]) -> UnitStatus {
    if owner_statuses.is_empty() {
        return UnitStatus::NotContacted;
    }

    let signed = signed_count(owner_statuses);

    if signed == owner_statuses.len() {
        UnitStatus::Signed
    } else if signed > 0 {
        UnitStatus::PartiallySigned
    } else {
        UnitStatus::NotContacted
    }
}

pub fn signed_count(owner_statuses: &[OwnerStatus]) -> usize {
    owner_statuses
        .iter()
        .filter(|s| **s == OwnerStatus::Signed)
        .count()
}

/// Regra de write-back do cache `unit_status`:
/// - SIGNED calculado sempre vence;
/// - fora isso, só sobrescreve se o cache atual é um status de contabilidade
///   (NOT_CONTACTED / SIGNED / PARTIALLY_SIGNED). Status qualitativos do
///   agente (NEGOTIATING, REFUSED...) são preservados.
pub fn write_back(current: UnitStatus, computed: UnitStatus) -> UnitStatus {
    if computed == UnitStatus::Signed {
        UnitStatus::Signed
    } else if current.is_signature_driven() {
        computed
    } else {
        current
    }
}

#[derive(Clone)]
pub struct UnitStatusResolver {
    units: UnitRepository,
    owners: OwnerRepository,
}

impl UnitStatusResolver {
    pub fn new(units: UnitRepository, owners: OwnerRepository) -> Self {
        Self { units, owners }
    }

    /// Recalcula e persiste status + tallies de uma unidade.
    /// Os tallies são sempre atualizados; o status respeita o write-back.
    /// Retorna o status que ficou gravado.
    pub async fn refresh_unit<'e, E>(&self, executor: E, unit_id: Uuid) -> Result<UnitStatus, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let unit = self
            .units
            .find_by_id(&mut *tx, unit_id)
            .await?
            .ok_or(AppError::UnitNotFound)?;

        let owners = self.owners.list_current_by_unit(&mut *tx, unit_id).await?;
        let statuses: Vec<OwnerStatus> = owners.iter().map(|o| o.owner_status).collect();

        let computed = resolve(&statuses);
        let persisted = write_back(unit.unit_status, computed);

        self.units
            .update_status_and_tallies(
                &mut *tx,
                unit_id,
                persisted,
                statuses.len() as i32,
                signed_count(&statuses) as i32,
            )
            .await?;

        tx.commit().await?;

        tracing::debug!(
            unit_id = %unit_id,
            old_status = ?unit.unit_status,
            computed = ?computed,
            persisted = ?persisted,
            "Status da unidade recalculado"
        );

        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OwnerStatus::*;

    #[test]
    fn sem_proprietarios_e_not_contacted() {
        assert_eq!(resolve(&[]), UnitStatus::NotContacted);
    }

    #[test]
    fn todos_assinados_e_signed() {
        assert_eq!(resolve(&[Signed, Signed, Signed]), UnitStatus::Signed);
    }

    #[test]
    fn assinatura_parcial() {
        // Cenário: 2 proprietários (quotas 60/40), um SIGNED e um
        // NOT_CONTACTED -> PARTIALLY_SIGNED, nunca "meio assinado"
        assert_eq!(resolve(&[Signed, NotContacted]), UnitStatus::PartiallySigned);
    }

    #[test]
    fn nenhum_assinado_e_not_contacted() {
        assert_eq!(
            resolve(&[Negotiating, Refused, WaitForSign]),
            UnitStatus::NotContacted
        );
    }

    #[test]
    fn signed_equivale_a_todos_assinados() {
        // unitStatus == SIGNED <=> total > 0 e assinados == total
        let cases: &[&[OwnerStatus]] = &[
            &[],
            &[Signed],
            &[Signed, Signed],
            &[Signed, NotContacted],
            &[NotContacted],
        ];
        for owners in cases {
            let all_signed = !owners.is_empty() && signed_count(owners) == owners.len();
            assert_eq!(resolve(owners) == UnitStatus::Signed, all_signed);
        }
    }

    #[test]
    fn write_back_signed_sempre_vence() {
        assert_eq!(
            write_back(UnitStatus::Negotiating, UnitStatus::Signed),
            UnitStatus::Signed
        );
        assert_eq!(
            write_back(UnitStatus::Refused, UnitStatus::Signed),
            UnitStatus::Signed
        );
    }

    #[test]
    fn write_back_preserva_status_do_agente() {
        // contabilidade não pode resetar um NEGOTIATING definido pelo agente
        assert_eq!(
            write_back(UnitStatus::Negotiating, UnitStatus::NotContacted),
            UnitStatus::Negotiating
        );
        assert_eq!(
            write_back(UnitStatus::Refused, UnitStatus::PartiallySigned),
            UnitStatus::Refused
        );
    }

    #[test]
    fn write_back_atualiza_status_de_contabilidade() {
        assert_eq!(
            write_back(UnitStatus::NotContacted, UnitStatus::PartiallySigned),
            UnitStatus::PartiallySigned
        );
        assert_eq!(
            write_back(UnitStatus::Signed, UnitStatus::PartiallySigned),
            UnitStatus::PartiallySigned
        );
        assert_eq!(
            write_back(UnitStatus::PartiallySigned, UnitStatus::NotContacted),
            UnitStatus::NotContacted
        );
    }
}
