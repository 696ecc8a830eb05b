//! Checks a leave or shift-change request against balances and the guard
//! calendar. Nothing here writes; a failure is reported to the caller as-is.

use std::future::Future;

use chrono::{Days, NaiveDate, NaiveTime};

use crate::database::models::{
    BalanceKind, Employee, LeaveRequest, LeaveRequestInput, LeaveType, ShiftChangeInput, Turno,
};
use crate::database::repositories::GuardRepository;
use crate::error::AppError;

const EPSILON: f64 = 1e-9;

/// Calendar lookups the validator needs.
pub trait GuardCalendar {
    /// Brigade the employee belongs to on `date`, if any.
    fn brigade_on(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<i64>, AppError>> + Send;

    /// Whether `brigade_id` is on guard somewhere on `date`.
    fn on_guard(
        &self,
        brigade_id: i64,
        date: NaiveDate,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

impl GuardCalendar for GuardRepository {
    async fn brigade_on(&self, employee_id: i64, date: NaiveDate) -> Result<Option<i64>, AppError> {
        Ok(self
            .transfer_in_force(employee_id, date)
            .await?
            .map(|transfer| transfer.to_brigade_id))
    }

    async fn on_guard(&self, brigade_id: i64, date: NaiveDate) -> Result<bool, AppError> {
        Ok(self.brigade_on_guard(brigade_id, date).await?)
    }
}

/// The parts of a leave request the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct LeaveTerms {
    pub leave_type: LeaveType,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub turno: Option<Turno>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours: Option<f64>,
}

impl From<&LeaveRequestInput> for LeaveTerms {
    fn from(input: &LeaveRequestInput) -> Self {
        Self {
            leave_type: input.leave_type,
            date_start: input.date_start,
            date_end: input.date_end,
            turno: input.turno,
            start_time: input.start_time,
            end_time: input.end_time,
            hours: input.hours,
        }
    }
}

impl From<&LeaveRequest> for LeaveTerms {
    fn from(request: &LeaveRequest) -> Self {
        Self {
            leave_type: request.leave_type,
            date_start: request.date_start,
            date_end: request.date_end,
            turno: request.turno,
            start_time: request.start_time,
            end_time: request.end_time,
            hours: request.hours,
        }
    }
}

impl LeaveTerms {
    pub fn last_day(&self) -> NaiveDate {
        self.date_end.unwrap_or(self.date_start)
    }
}

/// Amount a request draws from one allowance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaveCost {
    pub kind: BalanceKind,
    pub amount: f64,
}

/// Hours between two times of the same day. Non-positive spans are an error.
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> Result<f64, AppError> {
    let minutes = (end - start).num_minutes();
    if minutes <= 0 {
        return Err(AppError::InvalidRange(format!(
            "end time {} must be after start time {}",
            end.format("%H:%M"),
            start.format("%H:%M")
        )));
    }
    Ok(minutes as f64 / 60.0)
}

/// Requested hours of an hour-based leave: the time span when both ends are
/// given, otherwise the explicit `hours`.
pub fn requested_hours(terms: &LeaveTerms) -> Result<f64, AppError> {
    if terms.last_day() != terms.date_start {
        return Err(AppError::InvalidRange(format!(
            "{} must start and end on the same day",
            terms.leave_type
        )));
    }

    match (terms.start_time, terms.end_time, terms.hours) {
        (Some(start), Some(end), _) => hours_between(start, end),
        (None, None, Some(hours)) if hours > 0.0 => Ok(hours),
        (None, None, Some(hours)) => Err(AppError::InvalidRange(format!(
            "requested hours must be positive, got {}",
            hours
        ))),
        _ => Err(AppError::validation(format!(
            "{} requires start_time and end_time",
            terms.leave_type
        ))),
    }
}

/// What the request would draw from the ledger. `None` for statutory licences.
pub fn leave_cost(terms: &LeaveTerms) -> Result<Option<LeaveCost>, AppError> {
    if terms.last_day() < terms.date_start {
        return Err(AppError::InvalidRange(format!(
            "end date {} is before start date {}",
            terms.last_day(),
            terms.date_start
        )));
    }

    let Some(kind) = terms.leave_type.balance_kind() else {
        return Ok(None);
    };

    let amount = match terms.leave_type {
        LeaveType::AsuntosPropios | LeaveType::CompensacionGrupos => {
            let turno = terms.turno.ok_or_else(|| {
                AppError::validation(format!("{} requires a turno", terms.leave_type))
            })?;
            turno.jornadas() as f64
        }
        LeaveType::SalidasPersonales | LeaveType::HorasSindicales => requested_hours(terms)?,
        LeaveType::Vacaciones => ((terms.last_day() - terms.date_start).num_days() + 1) as f64,
        LeaveType::LicenciasPorJornadas | LeaveType::LicenciasPorDias => return Ok(None),
    };

    Ok(Some(LeaveCost { kind, amount }))
}

pub fn check_balance(employee: &Employee, cost: &LeaveCost) -> Result<(), AppError> {
    let remaining = employee.balance(cost.kind);
    if cost.amount > remaining + EPSILON {
        return Err(AppError::InsufficientBalance {
            kind: cost.kind.to_string(),
            requested: cost.amount,
            remaining,
        });
    }
    Ok(())
}

/// Vacation must start on a guard day of the employee's brigade and the
/// employee must be back on a guard day the day after it ends.
pub async fn check_vacation_alignment<C: GuardCalendar>(
    calendar: &C,
    employee_id: i64,
    date_start: NaiveDate,
    date_end: NaiveDate,
) -> Result<(), AppError> {
    let return_day = date_end.checked_add_days(Days::new(1)).ok_or_else(|| {
        AppError::InvalidRange(format!("no return day after {}", date_end))
    })?;

    for (label, date) in [("start", date_start), ("return", return_day)] {
        let brigade = calendar.brigade_on(employee_id, date).await?.ok_or_else(|| {
            AppError::ScheduleConflict(format!(
                "employee {} has no brigade on {} ({} day)",
                employee_id, date, label
            ))
        })?;

        if !calendar.on_guard(brigade, date).await? {
            return Err(AppError::ScheduleConflict(format!(
                "brigade {} is not on guard on {} ({} day)",
                brigade, date, label
            )));
        }
    }

    Ok(())
}

/// Full check of a leave request for `employee`. Returns the cost to reserve.
pub async fn validate_leave<C: GuardCalendar>(
    calendar: &C,
    employee: &Employee,
    terms: &LeaveTerms,
) -> Result<Option<LeaveCost>, AppError> {
    let cost = leave_cost(terms)?;

    if terms.leave_type == LeaveType::Vacaciones {
        check_vacation_alignment(calendar, employee.id, terms.date_start, terms.last_day())
            .await?;
    }

    if let Some(cost) = &cost {
        check_balance(employee, cost)?;
    }

    Ok(cost)
}

/// Shape checks for a shift change between two existing employees.
pub fn validate_shift_change(
    input: &ShiftChangeInput,
    max_week_gap: i64,
) -> Result<(), AppError> {
    if input.employee_id1 == input.employee_id2 {
        return Err(AppError::validation(
            "a shift change needs two different employees",
        ));
    }

    if let Some(date2) = input.date2 {
        if date2 == input.date {
            return Err(AppError::validation(
                "mirror swap dates must be different days",
            ));
        }
        let gap = input.mirror_week_gap().unwrap_or(0);
        if gap > max_week_gap {
            return Err(AppError::validation(format!(
                "mirror swap dates {} and {} are {} weeks apart; at most {} allowed",
                input.date, date2, gap, max_week_gap
            )));
        }
    }

    Ok(())
}
