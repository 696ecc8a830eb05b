use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::leave::Turno;
use super::macros::string_enum;
use super::transition::{ActorRoles, TransitionRejection};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftChangeRequest {
    pub id: i64,
    pub employee_id1: i64,
    pub employee_id2: i64,
    pub date: NaiveDate,
    pub date2: Option<NaiveDate>,
    pub turno: Turno,
    pub status: ShiftChangeStatus,
    pub motivo: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftChangeRequest {
    /// A mirror swap ("cambio espejo") carries the counterpart's guard date too.
    pub fn is_mirror(&self) -> bool {
        self.date2.is_some()
    }

    pub fn roles_of(&self, employee_id: i64, is_supervisor: bool) -> ActorRoles {
        ActorRoles {
            requester: self.employee_id1 == employee_id,
            counterpart: self.employee_id2 == employee_id,
            supervisor: is_supervisor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftChangeInput {
    pub employee_id1: i64,
    pub employee_id2: i64,
    pub date: NaiveDate,
    pub date2: Option<NaiveDate>,
    pub turno: Turno,
    pub motivo: Option<String>,
}

impl ShiftChangeInput {
    /// ISO week distance between the two dates of a mirror swap.
    pub fn mirror_week_gap(&self) -> Option<i64> {
        self.date2.map(|second| week_index(second) - week_index(self.date)).map(i64::abs)
    }
}

/// Monday-based week number counted from the epoch, so gaps across year ends stay correct.
fn week_index(date: NaiveDate) -> i64 {
    let monday = date.num_days_from_ce() as i64 - date.weekday().num_days_from_monday() as i64;
    monday.div_euclid(7)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftChangeStatusUpdate {
    pub status: ShiftChangeStatus,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ShiftChangeStatus {
        EnTramite => "en_tramite",
        AceptadoPorEmpleados => "aceptado_por_empleados",
        Aceptado => "aceptado",
        Rechazado => "rechazado",
    }
}

impl ShiftChangeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShiftChangeStatus::Aceptado | ShiftChangeStatus::Rechazado)
    }

    /// Checks `self -> to` against the swap approval table.
    pub fn transition(
        self,
        to: ShiftChangeStatus,
        roles: ActorRoles,
    ) -> Result<(), TransitionRejection> {
        use ShiftChangeStatus::*;

        if self.is_terminal() {
            return Err(TransitionRejection::Terminal);
        }
        if roles.none() {
            return Err(TransitionRejection::NoRole);
        }

        let allowed = match (self, to) {
            (EnTramite, AceptadoPorEmpleados) => roles.counterpart,
            (EnTramite, Rechazado) => roles.requester || roles.counterpart || roles.supervisor,
            (AceptadoPorEmpleados, Aceptado) => roles.supervisor,
            (AceptadoPorEmpleados, Rechazado) => roles.requester || roles.supervisor,
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(TransitionRejection::NotAllowed)
        }
    }
}
