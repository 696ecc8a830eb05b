use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::employee::BalanceKind;
use super::macros::string_enum;
use super::transition::{ActorRoles, TransitionRejection};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type: LeaveType,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub turno: Option<Turno>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours: Option<f64>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Last day covered; single-day requests end where they start.
    pub fn last_day(&self) -> NaiveDate {
        self.date_end.unwrap_or(self.date_start)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    pub employee_id: i64,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub turno: Option<Turno>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStatusUpdate {
    pub status: LeaveStatus,
    pub turno: Option<Turno>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum LeaveType {
        Vacaciones => "vacaciones",
        AsuntosPropios => "asuntos_propios",
        SalidasPersonales => "salidas_personales",
        LicenciasPorJornadas => "licencias_por_jornadas",
        LicenciasPorDias => "licencias_por_dias",
        CompensacionGrupos => "compensacion_grupos",
        HorasSindicales => "horas_sindicales",
    }
}

impl LeaveType {
    /// Allowance drawn down when a request of this type is confirmed.
    /// Statutory licences consume nothing.
    pub fn balance_kind(&self) -> Option<BalanceKind> {
        match self {
            LeaveType::Vacaciones => Some(BalanceKind::VacationDays),
            LeaveType::AsuntosPropios => Some(BalanceKind::ApDays),
            LeaveType::SalidasPersonales => Some(BalanceKind::SpHours),
            LeaveType::CompensacionGrupos => Some(BalanceKind::CompensationDays),
            LeaveType::HorasSindicales => Some(BalanceKind::UnionHours),
            LeaveType::LicenciasPorJornadas | LeaveType::LicenciasPorDias => None,
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum LeaveStatus {
        Pendiente => "Pendiente",
        Confirmada => "Confirmada",
        Cancelada => "Cancelada",
        Denegada => "Denegada",
    }
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeaveStatus::Cancelada | LeaveStatus::Denegada)
    }

    /// Checks `self -> to` against the leave transition table.
    pub fn transition(self, to: LeaveStatus, roles: ActorRoles) -> Result<(), TransitionRejection> {
        if self.is_terminal() {
            return Err(TransitionRejection::Terminal);
        }
        if roles.none() {
            return Err(TransitionRejection::NoRole);
        }

        let allowed = match (self, to) {
            (LeaveStatus::Pendiente, LeaveStatus::Confirmada)
            | (LeaveStatus::Pendiente, LeaveStatus::Denegada)
            | (LeaveStatus::Confirmada, LeaveStatus::Cancelada)
            | (LeaveStatus::Confirmada, LeaveStatus::Denegada) => roles.supervisor,
            (LeaveStatus::Pendiente, LeaveStatus::Cancelada) => roles.requester || roles.supervisor,
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(TransitionRejection::NotAllowed)
        }
    }

    /// Whether leaving `self` for `to` must hand reserved balance back.
    pub fn releases_on(self, to: LeaveStatus) -> bool {
        self == LeaveStatus::Confirmada && to.is_terminal()
    }
}

string_enum! {
    /// Shift slot. Combined slots cover two turnos, Día Completo all three.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Turno {
        Manana => "Mañana",
        Tarde => "Tarde",
        Noche => "Noche",
        MananaYTarde => "Mañana y Tarde",
        TardeYNoche => "Tarde y Noche",
        MananaYNoche => "Mañana y Noche",
        DiaCompleto => "Día Completo",
    }
}

impl Turno {
    /// Jornadas consumed from an AP or compensation allowance.
    pub fn jornadas(&self) -> u8 {
        match self {
            Turno::DiaCompleto => 3,
            Turno::MananaYTarde | Turno::TardeYNoche | Turno::MananaYNoche => 2,
            Turno::Manana | Turno::Tarde | Turno::Noche => 1,
        }
    }
}
