use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub employee_type: EmployeeType,
    pub vacation_days: f64,
    pub ap_days: f64,
    pub sp_hours: f64,
    pub union_hours: f64,
    pub compensation_days: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn balance(&self, kind: BalanceKind) -> f64 {
        match kind {
            BalanceKind::VacationDays => self.vacation_days,
            BalanceKind::ApDays => self.ap_days,
            BalanceKind::SpHours => self.sp_hours,
            BalanceKind::UnionHours => self.union_hours,
            BalanceKind::CompensationDays => self.compensation_days,
        }
    }

    pub fn is_supervisor(&self) -> bool {
        self.employee_type.is_supervisor()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: String,
    pub position: Option<String>,
    pub employee_type: EmployeeType,
    #[serde(default)]
    pub vacation_days: f64,
    #[serde(default)]
    pub ap_days: f64,
    #[serde(default)]
    pub sp_hours: f64,
    #[serde(default)]
    pub union_hours: f64,
    #[serde(default)]
    pub compensation_days: f64,
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum EmployeeType {
        Bombero => "bombero",
        Mando => "mando",
        Jefe => "jefe",
        Empleado => "empleado",
    }
}

impl EmployeeType {
    /// Jefes and mandos hold approval authority over requests.
    pub fn is_supervisor(&self) -> bool {
        matches!(self, EmployeeType::Jefe | EmployeeType::Mando)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum BalanceKind {
        VacationDays => "vacation_days",
        ApDays => "ap_days",
        SpHours => "sp_hours",
        UnionHours => "union_hours",
        CompensationDays => "compensation_days",
    }
}

impl BalanceKind {
    /// Column in `employees` holding this balance.
    pub fn column(&self) -> &'static str {
        self.as_str()
    }

    /// Hour allowances, as opposed to day or jornada ones.
    pub fn is_hours(&self) -> bool {
        matches!(self, BalanceKind::SpHours | BalanceKind::UnionHours)
    }
}

/// Remaining allowances of one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub employee_id: i64,
    pub vacation_days: f64,
    pub ap_days: f64,
    pub sp_hours: f64,
    pub union_hours: f64,
    pub compensation_days: f64,
}

impl From<&Employee> for BalanceSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id,
            vacation_days: employee.vacation_days,
            ap_days: employee.ap_days,
            sp_hours: employee.sp_hours,
            union_hours: employee.union_hours,
            compensation_days: employee.compensation_days,
        }
    }
}
