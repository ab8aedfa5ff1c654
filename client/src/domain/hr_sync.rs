//! HR cache synchronizer: divisions, positions, and employees.
//!
//! Collections are a manually invalidated cache of the remote API. Every
//! mutation is sent first; the local collections change only after the
//! remote call succeeds, and denormalized labels are kept consistent across
//! the three collections.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::envelope::{collection, record};
use super::hr::{Division, Employee, Position};
use super::ids::{EntityId, IdBatch};
use super::ports::{ApiRequest, RemoteApi};
use super::status::StatusTracker;
use super::Error;

const DIVISIONS_PATH: &str = "/employees/divisions";
const POSITIONS_PATH: &str = "/employees/positions";
const EMPLOYEES_PATH: &str = "/employees";

/// Snapshot of the HR collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HrCollections {
    pub divisions: Vec<Division>,
    pub positions: Vec<Position>,
    pub employees: Vec<Employee>,
    hydrated: bool,
}

impl HrCollections {
    /// Return whether a full load has completed.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    fn division_name(&self, id: Option<EntityId>) -> Option<String> {
        let id = id?;
        self.divisions
            .iter()
            .find(|division| division.id == Some(id))
            .map(|division| division.name.clone())
    }

    fn position_title(&self, id: Option<EntityId>) -> Option<String> {
        let id = id?;
        self.positions
            .iter()
            .find(|position| position.id == Some(id))
            .map(|position| position.title.clone())
    }

    fn employee_name(&self, id: Option<EntityId>) -> Option<String> {
        let id = id?;
        self.employees
            .iter()
            .find(|employee| employee.id == Some(id))
            .map(|employee| employee.full_name.clone())
    }

    fn label_division(&self, division: &mut Division) {
        resolve_label(&mut division.head, division.head_employee_id, |id| {
            self.employee_name(id)
        });
        resolve_label(&mut division.head_title, division.head_position_id, |id| {
            self.position_title(id)
        });
    }

    fn label_position(&self, position: &mut Position) {
        resolve_label(&mut position.division_name, position.division_id, |id| {
            self.division_name(id)
        });
    }

    fn label_employee(&self, employee: &mut Employee) {
        resolve_label(&mut employee.division_name, employee.division_id, |id| {
            self.division_name(id)
        });
        resolve_label(&mut employee.position_title, employee.position_id, |id| {
            self.position_title(id)
        });
    }

    /// Insert a created division, labelling it from local data if needed.
    ///
    /// Records without an id are returned but not cached.
    pub fn insert_division(&mut self, mut division: Division) -> Division {
        self.label_division(&mut division);
        if division.id.is_some() {
            self.divisions.push(division.clone());
        }
        division
    }

    /// Replace a division and propagate a rename to its dependants.
    ///
    /// Unknown ids leave the collections untouched.
    pub fn replace_division(&mut self, mut division: Division) -> Division {
        self.label_division(&mut division);
        let Some(id) = division.id else {
            return division;
        };
        let Some(slot) = self.divisions.iter_mut().find(|d| d.id == Some(id)) else {
            return division;
        };
        *slot = division.clone();

        for position in self.positions.iter_mut().filter(|p| p.division_id == Some(id)) {
            position.division_name.clone_from(&division.name);
        }
        for employee in self.employees.iter_mut().filter(|e| e.division_id == Some(id)) {
            employee.division_name.clone_from(&division.name);
        }
        division
    }

    /// Drop a division and clear every reference to it.
    pub fn remove_division(&mut self, id: EntityId) {
        self.divisions.retain(|division| division.id != Some(id));
        for position in self.positions.iter_mut().filter(|p| p.division_id == Some(id)) {
            position.division_id = None;
            position.division_name.clear();
        }
        for employee in self.employees.iter_mut().filter(|e| e.division_id == Some(id)) {
            employee.division_id = None;
            employee.division_name.clear();
        }
    }

    /// Insert a created position, labelling it from local data if needed.
    ///
    /// Records without an id are returned but not cached.
    pub fn insert_position(&mut self, mut position: Position) -> Position {
        self.label_position(&mut position);
        if position.id.is_some() {
            self.positions.push(position.clone());
        }
        position
    }

    /// Replace a position and propagate a retitle to its dependants.
    pub fn replace_position(&mut self, mut position: Position) -> Position {
        self.label_position(&mut position);
        let Some(id) = position.id else {
            return position;
        };
        let Some(slot) = self.positions.iter_mut().find(|p| p.id == Some(id)) else {
            return position;
        };
        *slot = position.clone();

        for employee in self.employees.iter_mut().filter(|e| e.position_id == Some(id)) {
            employee.position_title.clone_from(&position.title);
        }
        for division in self
            .divisions
            .iter_mut()
            .filter(|d| d.head_position_id == Some(id))
        {
            division.head_title.clone_from(&position.title);
        }
        position
    }

    /// Drop a position and clear every reference to it.
    pub fn remove_position(&mut self, id: EntityId) {
        self.positions.retain(|position| position.id != Some(id));
        for child in self.positions.iter_mut().filter(|p| p.parent_id == Some(id)) {
            child.parent_id = None;
        }
        for employee in self.employees.iter_mut().filter(|e| e.position_id == Some(id)) {
            employee.position_id = None;
            employee.position_title.clear();
        }
        for division in self
            .divisions
            .iter_mut()
            .filter(|d| d.head_position_id == Some(id))
        {
            division.head_position_id = None;
            division.head_title.clear();
        }
    }

    /// Insert a created employee, labelling it from local data if needed.
    ///
    /// Records without an id are returned but not cached.
    pub fn insert_employee(&mut self, mut employee: Employee) -> Employee {
        self.label_employee(&mut employee);
        if employee.id.is_some() {
            self.employees.push(employee.clone());
        }
        employee
    }

    /// Replace an employee and propagate a rename to division heads.
    pub fn replace_employee(&mut self, mut employee: Employee) -> Employee {
        self.label_employee(&mut employee);
        let Some(id) = employee.id else {
            return employee;
        };
        let Some(slot) = self.employees.iter_mut().find(|e| e.id == Some(id)) else {
            return employee;
        };
        *slot = employee.clone();

        for division in self
            .divisions
            .iter_mut()
            .filter(|d| d.head_employee_id == Some(id))
        {
            division.head.clone_from(&employee.full_name);
        }
        employee
    }

    /// Drop employees and clear division heads that referenced them.
    pub fn remove_employees(&mut self, batch: &IdBatch) {
        self.employees.retain(|employee| !batch.contains(employee.id));
        for division in self
            .divisions
            .iter_mut()
            .filter(|d| batch.contains(d.head_employee_id))
        {
            division.head_employee_id = None;
            division.head.clear();
        }
    }
}

/// Keep a non-empty label echoed by the API; otherwise look it up locally.
/// A missing foreign key always clears the label.
fn resolve_label<F>(label: &mut String, id: Option<EntityId>, lookup: F)
where
    F: FnOnce(Option<EntityId>) -> Option<String>,
{
    if id.is_none() {
        label.clear();
    } else if label.is_empty() {
        if let Some(found) = lookup(id) {
            *label = found;
        }
    }
}

/// Synchronizer for the HR collections.
pub struct HrSynchronizer<A> {
    api: Arc<A>,
    state: RwLock<HrCollections>,
    hydration: Mutex<()>,
    status: StatusTracker,
}

impl<A: RemoteApi> HrSynchronizer<A> {
    /// Create an unhydrated synchronizer.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(HrCollections::default()),
            hydration: Mutex::new(()),
            status: StatusTracker::new(),
        }
    }

    /// Loading flag and last error.
    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// Copy of the current collections.
    pub fn snapshot(&self) -> HrCollections {
        self.read(Clone::clone)
    }

    /// Return whether a full load has completed.
    pub fn is_hydrated(&self) -> bool {
        self.read(HrCollections::is_hydrated)
    }

    /// Cached divisions.
    pub fn divisions(&self) -> Vec<Division> {
        self.read(|state| state.divisions.clone())
    }

    /// Cached positions.
    pub fn positions(&self) -> Vec<Position> {
        self.read(|state| state.positions.clone())
    }

    /// Cached employees.
    pub fn employees(&self) -> Vec<Employee> {
        self.read(|state| state.employees.clone())
    }

    /// Cached division by id.
    pub fn find_division(&self, id: EntityId) -> Option<Division> {
        self.read(|state| state.divisions.iter().find(|d| d.id == Some(id)).cloned())
    }

    /// Cached position by id.
    pub fn find_position(&self, id: EntityId) -> Option<Position> {
        self.read(|state| state.positions.iter().find(|p| p.id == Some(id)).cloned())
    }

    /// Cached employee by id.
    pub fn find_employee(&self, id: EntityId) -> Option<Employee> {
        self.read(|state| state.employees.iter().find(|e| e.id == Some(id)).cloned())
    }

    /// Number of cached employees assigned to `division`.
    pub fn employee_count_by_division(&self, division: EntityId) -> usize {
        self.read(|state| {
            state
                .employees
                .iter()
                .filter(|employee| employee.division_id == Some(division))
                .count()
        })
    }

    fn read<R>(&self, f: impl FnOnce(&HrCollections) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut HrCollections) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Load every collection unless already hydrated.
    ///
    /// Concurrent callers share one load: the second waits for the first and
    /// then observes the hydrated state.
    pub async fn hydrate(&self) -> Result<(), Error> {
        let _single_flight = self.hydration.lock().await;
        if self.is_hydrated() {
            return Ok(());
        }
        self.status.track(self.load_all()).await
    }

    /// Reload every collection regardless of the hydrated flag.
    pub async fn refresh(&self) -> Result<(), Error> {
        let _single_flight = self.hydration.lock().await;
        self.status.track(self.load_all()).await
    }

    async fn load_all(&self) -> Result<(), Error> {
        let (divisions, positions, employees) = tokio::try_join!(
            self.api.send(ApiRequest::get(DIVISIONS_PATH)),
            self.api.send(ApiRequest::get(POSITIONS_PATH)),
            self.api.send(ApiRequest::get(EMPLOYEES_PATH)),
        )?;
        let loaded = HrCollections {
            divisions: collection(divisions).iter().map(Division::from_raw).collect(),
            positions: collection(positions).iter().map(Position::from_raw).collect(),
            employees: collection(employees).iter().map(Employee::from_raw).collect(),
            hydrated: true,
        };
        debug!(
            divisions = loaded.divisions.len(),
            positions = loaded.positions.len(),
            employees = loaded.employees.len(),
            "hr collections loaded"
        );
        self.write(|state| *state = loaded);
        Ok(())
    }

    /// Create a division.
    pub async fn create_division(&self, payload: Value) -> Result<Division, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::post(DIVISIONS_PATH, payload))
                    .await?;
                let division = record(body)
                    .map(|raw| Division::from_raw(&raw))
                    .unwrap_or_default();
                Ok(self.write(|state| state.insert_division(division)))
            })
            .await
    }

    /// Update a division; a rename reaches positions and employees.
    ///
    /// A response without a record leaves the cache untouched and returns the
    /// cached division.
    pub async fn update_division(&self, id: EntityId, payload: Value) -> Result<Division, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::put(format!("{DIVISIONS_PATH}/{id}"), payload))
                    .await?;
                let Some(raw) = record(body) else {
                    debug!(%id, "division update echoed no record");
                    return Ok(self.find_division(id).unwrap_or_else(|| Division {
                        id: Some(id),
                        ..Division::default()
                    }));
                };
                let mut division = Division::from_raw(&raw);
                division.id.get_or_insert(id);
                Ok(self.write(|state| state.replace_division(division)))
            })
            .await
    }

    /// Delete a division and clear references to it.
    pub async fn delete_division(&self, id: EntityId) -> Result<(), Error> {
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(format!("{DIVISIONS_PATH}/{id}")))
                    .await?;
                self.write(|state| state.remove_division(id));
                debug!(%id, "division removed");
                Ok(())
            })
            .await
    }

    /// Create a position.
    pub async fn create_position(&self, payload: Value) -> Result<Position, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::post(POSITIONS_PATH, payload))
                    .await?;
                let position = record(body)
                    .map(|raw| Position::from_raw(&raw))
                    .unwrap_or_default();
                Ok(self.write(|state| state.insert_position(position)))
            })
            .await
    }

    /// Update a position; a retitle reaches employees and division heads.
    pub async fn update_position(&self, id: EntityId, payload: Value) -> Result<Position, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::put(format!("{POSITIONS_PATH}/{id}"), payload))
                    .await?;
                let Some(raw) = record(body) else {
                    debug!(%id, "position update echoed no record");
                    return Ok(self.find_position(id).unwrap_or_else(|| Position {
                        id: Some(id),
                        ..Position::default()
                    }));
                };
                let mut position = Position::from_raw(&raw);
                position.id.get_or_insert(id);
                Ok(self.write(|state| state.replace_position(position)))
            })
            .await
    }

    /// Delete a position and clear references to it.
    pub async fn delete_position(&self, id: EntityId) -> Result<(), Error> {
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(format!("{POSITIONS_PATH}/{id}")))
                    .await?;
                self.write(|state| state.remove_position(id));
                debug!(%id, "position removed");
                Ok(())
            })
            .await
    }

    /// Create an employee.
    pub async fn create_employee(&self, payload: Value) -> Result<Employee, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::post(EMPLOYEES_PATH, payload))
                    .await?;
                let employee = record(body)
                    .map(|raw| Employee::from_raw(&raw))
                    .unwrap_or_default();
                Ok(self.write(|state| state.insert_employee(employee)))
            })
            .await
    }

    /// Update an employee; a rename reaches division heads.
    pub async fn update_employee(&self, id: EntityId, payload: Value) -> Result<Employee, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::put(format!("{EMPLOYEES_PATH}/{id}"), payload))
                    .await?;
                let Some(raw) = record(body) else {
                    debug!(%id, "employee update echoed no record");
                    return Ok(self.find_employee(id).unwrap_or_else(|| Employee {
                        id: Some(id),
                        ..Employee::default()
                    }));
                };
                let mut employee = Employee::from_raw(&raw);
                employee.id.get_or_insert(id);
                Ok(self.write(|state| state.replace_employee(employee)))
            })
            .await
    }

    /// Delete one employee.
    pub async fn delete_employee(&self, id: EntityId) -> Result<(), Error> {
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(format!("{EMPLOYEES_PATH}/{id}")))
                    .await?;
                self.write(|state| state.remove_employees(&IdBatch::from_ids([id])));
                debug!(%id, "employee removed");
                Ok(())
            })
            .await
    }

    /// Delete several employees in one call.
    ///
    /// Entries that are not positive integers are dropped. When nothing
    /// valid remains no request is sent. Returns the number of ids sent.
    pub async fn delete_employees_batch(&self, raw_ids: &[Value]) -> Result<usize, Error> {
        let batch = IdBatch::from_raw(raw_ids);
        let dropped = raw_ids.len().saturating_sub(batch.len());
        if dropped > 0 {
            warn!(dropped, "ignoring malformed or repeated employee ids");
        }
        if batch.is_empty() {
            return Ok(0);
        }
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(EMPLOYEES_PATH).with_body(batch.to_payload()))
                    .await?;
                self.write(|state| state.remove_employees(&batch));
                debug!(count = batch.len(), "employees removed");
                Ok(batch.len())
            })
            .await
    }
}

#[cfg(test)]
#[path = "hr_sync_tests.rs"]
mod tests;
