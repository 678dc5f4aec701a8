//! In-memory repositories for testing and development
//!
//! All seven tables live behind one lock so that foreign-key and uniqueness
//! checks see a consistent snapshot. Constraint names match the migration so
//! errors read the same as from PostgreSQL.

use super::*;
use crate::error::DatabaseError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    fn next_id(&mut self) -> i32 {
        self.last_id = self.last_id.saturating_add(1);
        self.last_id
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn count(&self) -> i64 {
        i64::try_from(self.rows.len()).unwrap_or(i64::MAX)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

struct Tables {
    specialties: Table<Specialty>,
    doctors: Table<Doctor>,
    patients: Table<Patient>,
    consultations: Table<Consultation>,
    medicaments: Table<Medicament>,
    ordonnances: Table<Ordonnance>,
    lignes: Table<OrdonnanceLigne>,
}

impl Tables {
    fn new() -> Self {
        Self {
            specialties: Table::new(),
            doctors: Table::new(),
            patients: Table::new(),
            consultations: Table::new(),
            medicaments: Table::new(),
            ordonnances: Table::new(),
            lignes: Table::new(),
        }
    }

    fn check_specialty(&self, name: &str, id: Option<i32>) -> DatabaseResult<()> {
        if self
            .specialties
            .values()
            .any(|s| s.name == name && Some(s.id) != id)
        {
            return Err(DatabaseError::unique("uq_specialties_name"));
        }
        Ok(())
    }

    fn check_doctor(&self, doctor: &NewDoctor, id: Option<i32>) -> DatabaseResult<()> {
        if !self.specialties.rows.contains_key(&doctor.specialty_id) {
            return Err(DatabaseError::foreign_key("fk_doctors_specialty"));
        }
        if self.doctors.values().any(|d| {
            d.last_name == doctor.last_name
                && d.first_name == doctor.first_name
                && d.specialty_id == doctor.specialty_id
                && Some(d.id) != id
        }) {
            return Err(DatabaseError::unique("uq_doctors_identity"));
        }
        Ok(())
    }

    fn check_patient(&self, patient: &NewPatient, id: Option<i32>) -> DatabaseResult<()> {
        if self.patients.values().any(|p| {
            p.last_name == patient.last_name
                && p.first_name == patient.first_name
                && p.birth_date == patient.birth_date
                && Some(p.id) != id
        }) {
            return Err(DatabaseError::unique("uq_patients_identity"));
        }
        Ok(())
    }

    fn check_consultation(&self, c: &NewConsultation, id: Option<i32>) -> DatabaseResult<()> {
        if !self.doctors.rows.contains_key(&c.doctor_id) {
            return Err(DatabaseError::foreign_key("fk_consultations_doctor"));
        }
        if !self.patients.rows.contains_key(&c.patient_id) {
            return Err(DatabaseError::foreign_key("fk_consultations_patient"));
        }
        let same_slot = |o: &&Consultation| o.date == c.date && o.hour == c.hour && Some(o.id) != id;
        if self.consultations.values().filter(same_slot).any(|o| o.doctor_id == c.doctor_id) {
            return Err(DatabaseError::unique("uq_consultations_doctor_slot"));
        }
        if self.consultations.values().filter(same_slot).any(|o| o.patient_id == c.patient_id) {
            return Err(DatabaseError::unique("uq_consultations_patient_slot"));
        }
        Ok(())
    }

    fn check_medicament(&self, name: &str, id: Option<i32>) -> DatabaseResult<()> {
        if self
            .medicaments
            .values()
            .any(|m| m.name == name && Some(m.id) != id)
        {
            return Err(DatabaseError::unique("uq_medicaments_name"));
        }
        Ok(())
    }

    fn check_ordonnance(&self, o: &NewOrdonnance) -> DatabaseResult<()> {
        if !self.doctors.rows.contains_key(&o.doctor_id) {
            return Err(DatabaseError::foreign_key("fk_ordonnances_doctor"));
        }
        if !self.patients.rows.contains_key(&o.patient_id) {
            return Err(DatabaseError::foreign_key("fk_ordonnances_patient"));
        }
        if let Some(consultation_id) = o.consultation_id {
            if !self.consultations.rows.contains_key(&consultation_id) {
                return Err(DatabaseError::foreign_key("fk_ordonnances_consultation"));
            }
        }
        Ok(())
    }

    fn check_ligne(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
        id: Option<i32>,
    ) -> DatabaseResult<()> {
        if !self.ordonnances.rows.contains_key(&ordonnance_id) {
            return Err(DatabaseError::foreign_key("fk_ordonnance_lignes_ordonnance"));
        }
        if !self.medicaments.rows.contains_key(&ligne.medicament_id) {
            return Err(DatabaseError::foreign_key("fk_ordonnance_lignes_medicament"));
        }
        if ligne.quantity <= 0 {
            return Err(DatabaseError::QueryFailed(
                "check constraint ck_ordonnance_lignes_quantity violated".to_string(),
            ));
        }
        if self.lignes.values().any(|l| is_same_line(l, ordonnance_id, ligne) && Some(l.id) != id) {
            return Err(DatabaseError::unique("uq_ordonnance_lignes_identity"));
        }
        Ok(())
    }
}

fn is_same_line(existing: &OrdonnanceLigne, ordonnance_id: i32, ligne: &NewOrdonnanceLigne) -> bool {
    existing.ordonnance_id == ordonnance_id
        && existing.medicament_id == ligne.medicament_id
        && existing.dosage == ligne.dosage
        && existing.frequency == ligne.frequency
        && existing.duration == ligne.duration
}

fn by_name(a: &(&String, &String), b: &(&String, &String)) -> std::cmp::Ordering {
    a.cmp(b)
}

/// Shared in-memory tables; clones see the same data.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpecialtyRepository for InMemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Specialty>> {
        let mut rows: Vec<Specialty> = self.tables.read().specialties.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Specialty>> {
        Ok(self.tables.read().specialties.get(id))
    }

    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Specialty>> {
        Ok(self
            .tables
            .read()
            .specialties
            .values()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> DatabaseResult<bool> {
        Ok(self
            .tables
            .read()
            .specialties
            .values()
            .any(|s| s.name == name && Some(s.id) != exclude_id))
    }

    async fn has_doctors(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self.tables.read().doctors.values().any(|d| d.specialty_id == id))
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.read().specialties.count())
    }

    async fn insert(&self, specialty: &NewSpecialty) -> DatabaseResult<Specialty> {
        let mut tables = self.tables.write();
        tables.check_specialty(&specialty.name, None)?;
        let row = Specialty {
            id: tables.specialties.next_id(),
            name: specialty.name.clone(),
        };
        tables.specialties.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, specialty: &NewSpecialty) -> DatabaseResult<Option<Specialty>> {
        let mut tables = self.tables.write();
        if !tables.specialties.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.check_specialty(&specialty.name, Some(id))?;
        let row = Specialty {
            id,
            name: specialty.name.clone(),
        };
        tables.specialties.rows.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write();
        if tables.doctors.values().any(|d| d.specialty_id == id) {
            return Err(DatabaseError::foreign_key("fk_doctors_specialty"));
        }
        Ok(tables.specialties.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Doctor>> {
        let mut rows: Vec<Doctor> = self.tables.read().doctors.values().cloned().collect();
        rows.sort_by(|a, b| {
            by_name(&(&a.last_name, &a.first_name), &(&b.last_name, &b.first_name))
        });
        Ok(rows)
    }

    async fn list_by_specialty(&self, specialty_id: i32) -> DatabaseResult<Vec<Doctor>> {
        let mut rows = DoctorRepository::list(self).await?;
        rows.retain(|d| d.specialty_id == specialty_id);
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Doctor>> {
        Ok(self.tables.read().doctors.get(id))
    }

    async fn identity_exists(
        &self,
        last_name: &str,
        first_name: &str,
        specialty_id: i32,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        Ok(self.tables.read().doctors.values().any(|d| {
            d.last_name == last_name
                && d.first_name == first_name
                && d.specialty_id == specialty_id
                && Some(d.id) != exclude_id
        }))
    }

    async fn has_dependents(&self, id: i32) -> DatabaseResult<bool> {
        let tables = self.tables.read();
        Ok(tables.consultations.values().any(|c| c.doctor_id == id)
            || tables.ordonnances.values().any(|o| o.doctor_id == id))
    }

    async fn patients_of(&self, id: i32) -> DatabaseResult<Vec<Patient>> {
        let tables = self.tables.read();
        let mut rows: Vec<Patient> = tables
            .patients
            .values()
            .filter(|p| {
                tables
                    .consultations
                    .values()
                    .any(|c| c.doctor_id == id && c.patient_id == p.id)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            by_name(&(&a.last_name, &a.first_name), &(&b.last_name, &b.first_name))
        });
        Ok(rows)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.read().doctors.count())
    }

    async fn insert(&self, doctor: &NewDoctor) -> DatabaseResult<Doctor> {
        let mut tables = self.tables.write();
        tables.check_doctor(doctor, None)?;
        let row = Doctor {
            id: tables.doctors.next_id(),
            specialty_id: doctor.specialty_id,
            last_name: doctor.last_name.clone(),
            first_name: doctor.first_name.clone(),
        };
        tables.doctors.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, doctor: &NewDoctor) -> DatabaseResult<Option<Doctor>> {
        let mut tables = self.tables.write();
        if !tables.doctors.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.check_doctor(doctor, Some(id))?;
        let row = Doctor {
            id,
            specialty_id: doctor.specialty_id,
            last_name: doctor.last_name.clone(),
            first_name: doctor.first_name.clone(),
        };
        tables.doctors.rows.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write();
        if tables.consultations.values().any(|c| c.doctor_id == id) {
            return Err(DatabaseError::foreign_key("fk_consultations_doctor"));
        }
        if tables.ordonnances.values().any(|o| o.doctor_id == id) {
            return Err(DatabaseError::foreign_key("fk_ordonnances_doctor"));
        }
        Ok(tables.doctors.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Patient>> {
        let mut rows: Vec<Patient> = self.tables.read().patients.values().cloned().collect();
        rows.sort_by(|a, b| {
            by_name(&(&a.last_name, &a.first_name), &(&b.last_name, &b.first_name))
        });
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Patient>> {
        Ok(self.tables.read().patients.get(id))
    }

    async fn identity_exists(
        &self,
        last_name: &str,
        first_name: &str,
        birth_date: NaiveDate,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        Ok(self.tables.read().patients.values().any(|p| {
            p.last_name == last_name
                && p.first_name == first_name
                && p.birth_date == birth_date
                && Some(p.id) != exclude_id
        }))
    }

    async fn has_dependents(&self, id: i32) -> DatabaseResult<bool> {
        let tables = self.tables.read();
        Ok(tables.consultations.values().any(|c| c.patient_id == id)
            || tables.ordonnances.values().any(|o| o.patient_id == id))
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.read().patients.count())
    }

    async fn insert(&self, patient: &NewPatient) -> DatabaseResult<Patient> {
        let mut tables = self.tables.write();
        tables.check_patient(patient, None)?;
        let row = Patient {
            id: tables.patients.next_id(),
            last_name: patient.last_name.clone(),
            first_name: patient.first_name.clone(),
            birth_date: patient.birth_date,
        };
        tables.patients.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, patient: &NewPatient) -> DatabaseResult<Option<Patient>> {
        let mut tables = self.tables.write();
        if !tables.patients.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.check_patient(patient, Some(id))?;
        let row = Patient {
            id,
            last_name: patient.last_name.clone(),
            first_name: patient.first_name.clone(),
            birth_date: patient.birth_date,
        };
        tables.patients.rows.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write();
        if tables.consultations.values().any(|c| c.patient_id == id) {
            return Err(DatabaseError::foreign_key("fk_consultations_patient"));
        }
        if tables.ordonnances.values().any(|o| o.patient_id == id) {
            return Err(DatabaseError::foreign_key("fk_ordonnances_patient"));
        }
        Ok(tables.patients.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl ConsultationRepository for InMemoryStore {
    async fn list(&self, filter: &VisitFilter) -> DatabaseResult<Vec<Consultation>> {
        let mut rows: Vec<Consultation> = self
            .tables
            .read()
            .consultations
            .values()
            .filter(|c| filter.matches(c.doctor_id, c.patient_id, c.date))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.date, c.hour, c.id));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Consultation>> {
        Ok(self.tables.read().consultations.get(id))
    }

    async fn doctor_slot_taken(
        &self,
        doctor_id: i32,
        date: NaiveDate,
        hour: NaiveTime,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        Ok(self.tables.read().consultations.values().any(|c| {
            c.doctor_id == doctor_id && c.date == date && c.hour == hour && Some(c.id) != exclude_id
        }))
    }

    async fn patient_slot_taken(
        &self,
        patient_id: i32,
        date: NaiveDate,
        hour: NaiveTime,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        Ok(self.tables.read().consultations.values().any(|c| {
            c.patient_id == patient_id
                && c.date == date
                && c.hour == hour
                && Some(c.id) != exclude_id
        }))
    }

    async fn has_ordonnances(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self
            .tables
            .read()
            .ordonnances
            .values()
            .any(|o| o.consultation_id == Some(id)))
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.read().consultations.count())
    }

    async fn insert(&self, consultation: &NewConsultation) -> DatabaseResult<Consultation> {
        let mut tables = self.tables.write();
        tables.check_consultation(consultation, None)?;
        let row = Consultation {
            id: tables.consultations.next_id(),
            doctor_id: consultation.doctor_id,
            patient_id: consultation.patient_id,
            date: consultation.date,
            hour: consultation.hour,
            reason: consultation.reason.clone(),
        };
        tables.consultations.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        consultation: &NewConsultation,
    ) -> DatabaseResult<Option<Consultation>> {
        let mut tables = self.tables.write();
        if !tables.consultations.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.check_consultation(consultation, Some(id))?;
        let row = Consultation {
            id,
            doctor_id: consultation.doctor_id,
            patient_id: consultation.patient_id,
            date: consultation.date,
            hour: consultation.hour,
            reason: consultation.reason.clone(),
        };
        tables.consultations.rows.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write();
        let removed = tables.consultations.rows.remove(&id).is_some();
        if removed {
            // ON DELETE SET NULL
            for ordonnance in tables.ordonnances.rows.values_mut() {
                if ordonnance.consultation_id == Some(id) {
                    ordonnance.consultation_id = None;
                }
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl MedicamentRepository for InMemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Medicament>> {
        let mut rows: Vec<Medicament> = self.tables.read().medicaments.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Medicament>> {
        Ok(self.tables.read().medicaments.get(id))
    }

    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Medicament>> {
        Ok(self
            .tables
            .read()
            .medicaments
            .values()
            .find(|m| m.name == name)
            .cloned())
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> DatabaseResult<bool> {
        Ok(self
            .tables
            .read()
            .medicaments
            .values()
            .any(|m| m.name == name && Some(m.id) != exclude_id))
    }

    async fn has_lines(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self.tables.read().lignes.values().any(|l| l.medicament_id == id))
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.read().medicaments.count())
    }

    async fn insert(&self, medicament: &NewMedicament) -> DatabaseResult<Medicament> {
        let mut tables = self.tables.write();
        tables.check_medicament(&medicament.name, None)?;
        let row = Medicament {
            id: tables.medicaments.next_id(),
            name: medicament.name.clone(),
            dosage_form: medicament.dosage_form.clone(),
            strength: medicament.strength.clone(),
            atc_code: medicament.atc_code.clone(),
        };
        tables.medicaments.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        medicament: &NewMedicament,
    ) -> DatabaseResult<Option<Medicament>> {
        let mut tables = self.tables.write();
        if !tables.medicaments.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.check_medicament(&medicament.name, Some(id))?;
        let row = Medicament {
            id,
            name: medicament.name.clone(),
            dosage_form: medicament.dosage_form.clone(),
            strength: medicament.strength.clone(),
            atc_code: medicament.atc_code.clone(),
        };
        tables.medicaments.rows.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write();
        if tables.lignes.values().any(|l| l.medicament_id == id) {
            return Err(DatabaseError::foreign_key("fk_ordonnance_lignes_medicament"));
        }
        Ok(tables.medicaments.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl OrdonnanceRepository for InMemoryStore {
    async fn list(&self, filter: &VisitFilter) -> DatabaseResult<Vec<Ordonnance>> {
        let mut rows: Vec<Ordonnance> = self
            .tables
            .read()
            .ordonnances
            .values()
            .filter(|o| filter.matches(o.doctor_id, o.patient_id, o.date))
            .cloned()
            .collect();
        rows.sort_by_key(|o| (o.date, o.id));
        Ok(rows)
    }

    async fn list_by_consultation(&self, consultation_id: i32) -> DatabaseResult<Vec<Ordonnance>> {
        let mut rows: Vec<Ordonnance> = self
            .tables
            .read()
            .ordonnances
            .values()
            .filter(|o| o.consultation_id == Some(consultation_id))
            .cloned()
            .collect();
        rows.sort_by_key(|o| (o.date, o.id));
        Ok(rows)
    }

    async fn list_by_medicament(&self, medicament_id: i32) -> DatabaseResult<Vec<Ordonnance>> {
        let tables = self.tables.read();
        let mut rows: Vec<Ordonnance> = tables
            .ordonnances
            .values()
            .filter(|o| {
                tables
                    .lignes
                    .values()
                    .any(|l| l.ordonnance_id == o.id && l.medicament_id == medicament_id)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|o| (o.date, o.id));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Ordonnance>> {
        Ok(self.tables.read().ordonnances.get(id))
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.read().ordonnances.count())
    }

    async fn insert(&self, ordonnance: &NewOrdonnance) -> DatabaseResult<Ordonnance> {
        let mut tables = self.tables.write();
        tables.check_ordonnance(ordonnance)?;
        let row = Ordonnance {
            id: tables.ordonnances.next_id(),
            doctor_id: ordonnance.doctor_id,
            patient_id: ordonnance.patient_id,
            consultation_id: ordonnance.consultation_id,
            date: ordonnance.date,
            notes: ordonnance.notes.clone(),
        };
        tables.ordonnances.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        ordonnance: &NewOrdonnance,
    ) -> DatabaseResult<Option<Ordonnance>> {
        let mut tables = self.tables.write();
        if !tables.ordonnances.rows.contains_key(&id) {
            return Ok(None);
        }
        tables.check_ordonnance(ordonnance)?;
        let row = Ordonnance {
            id,
            doctor_id: ordonnance.doctor_id,
            patient_id: ordonnance.patient_id,
            consultation_id: ordonnance.consultation_id,
            date: ordonnance.date,
            notes: ordonnance.notes.clone(),
        };
        tables.ordonnances.rows.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn link_consultation(
        &self,
        id: i32,
        consultation: &Consultation,
    ) -> DatabaseResult<Option<Ordonnance>> {
        let mut tables = self.tables.write();
        if !tables.consultations.rows.contains_key(&consultation.id) {
            return Err(DatabaseError::foreign_key("fk_ordonnances_consultation"));
        }
        let Some(row) = tables.ordonnances.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.consultation_id = Some(consultation.id);
        row.doctor_id = consultation.doctor_id;
        row.patient_id = consultation.patient_id;
        Ok(Some(row.clone()))
    }

    async fn unlink_consultation(&self, id: i32) -> DatabaseResult<Option<Ordonnance>> {
        let mut tables = self.tables.write();
        let Some(row) = tables.ordonnances.rows.get_mut(&id) else {
            return Ok(None);
        };
        row.consultation_id = None;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write();
        let removed = tables.ordonnances.rows.remove(&id).is_some();
        if removed {
            // ON DELETE CASCADE
            tables.lignes.rows.retain(|_, l| l.ordonnance_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl OrdonnanceLigneRepository for InMemoryStore {
    async fn list(&self, ordonnance_id: i32) -> DatabaseResult<Vec<OrdonnanceLigne>> {
        Ok(self
            .tables
            .read()
            .lignes
            .values()
            .filter(|l| l.ordonnance_id == ordonnance_id)
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        ordonnance_id: i32,
        ligne_id: i32,
    ) -> DatabaseResult<Option<OrdonnanceLigne>> {
        Ok(self
            .tables
            .read()
            .lignes
            .get(ligne_id)
            .filter(|l| l.ordonnance_id == ordonnance_id))
    }

    async fn duplicate_exists(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        Ok(self
            .tables
            .read()
            .lignes
            .values()
            .any(|l| is_same_line(l, ordonnance_id, ligne) && Some(l.id) != exclude_id))
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.read().lignes.count())
    }

    async fn insert(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
    ) -> DatabaseResult<OrdonnanceLigne> {
        let mut tables = self.tables.write();
        tables.check_ligne(ordonnance_id, ligne, None)?;
        let row = OrdonnanceLigne {
            id: tables.lignes.next_id(),
            ordonnance_id,
            medicament_id: ligne.medicament_id,
            dosage: ligne.dosage.clone(),
            frequency: ligne.frequency.clone(),
            duration: ligne.duration.clone(),
            quantity: ligne.quantity,
            instructions: ligne.instructions.clone(),
        };
        tables.lignes.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        ordonnance_id: i32,
        ligne_id: i32,
        ligne: &NewOrdonnanceLigne,
    ) -> DatabaseResult<Option<OrdonnanceLigne>> {
        let mut tables = self.tables.write();
        let belongs = tables
            .lignes
            .rows
            .get(&ligne_id)
            .is_some_and(|l| l.ordonnance_id == ordonnance_id);
        if !belongs {
            return Ok(None);
        }
        tables.check_ligne(ordonnance_id, ligne, Some(ligne_id))?;
        let row = OrdonnanceLigne {
            id: ligne_id,
            ordonnance_id,
            medicament_id: ligne.medicament_id,
            dosage: ligne.dosage.clone(),
            frequency: ligne.frequency.clone(),
            duration: ligne.duration.clone(),
            quantity: ligne.quantity,
            instructions: ligne.instructions.clone(),
        };
        tables.lignes.rows.insert(ligne_id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, ordonnance_id: i32, ligne_id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write();
        let belongs = tables
            .lignes
            .rows
            .get(&ligne_id)
            .is_some_and(|l| l.ordonnance_id == ordonnance_id);
        if belongs {
            tables.lignes.rows.remove(&ligne_id);
        }
        Ok(belongs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    async fn seeded() -> (InMemoryStore, Doctor, Patient) {
        let store = InMemoryStore::new();
        let specialty = SpecialtyRepository::insert(
            &store,
            &NewSpecialty {
                name: "Cardiologie".to_string(),
            },
        )
        .await
        .unwrap();
        let doctor = DoctorRepository::insert(
            &store,
            &NewDoctor {
                specialty_id: specialty.id,
                last_name: "Wilson".to_string(),
                first_name: "James".to_string(),
            },
        )
        .await
        .unwrap();
        let patient = PatientRepository::insert(
            &store,
            &NewPatient {
                last_name: "Dupont".to_string(),
                first_name: "Alice".to_string(),
                birth_date: day(1990, 3, 12),
            },
        )
        .await
        .unwrap();
        (store, doctor, patient)
    }

    #[tokio::test]
    async fn unique_specialty_name_is_enforced() {
        let store = InMemoryStore::new();
        let new = NewSpecialty {
            name: "Neurologie".to_string(),
        };
        SpecialtyRepository::insert(&store, &new).await.unwrap();
        let err = SpecialtyRepository::insert(&store, &new).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation { ref constraint } if constraint == "uq_specialties_name"));
    }

    #[tokio::test]
    async fn doctor_requires_existing_specialty() {
        let store = InMemoryStore::new();
        let err = DoctorRepository::insert(
            &store,
            &NewDoctor {
                specialty_id: 42,
                last_name: "House".to_string(),
                first_name: "Gregory".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn consultation_slots_are_unique_per_doctor_and_patient() {
        let (store, doctor, patient) = seeded().await;
        let slot = NewConsultation {
            doctor_id: doctor.id,
            patient_id: patient.id,
            date: day(2025, 1, 15),
            hour: nine(),
            reason: None,
        };
        let first = ConsultationRepository::insert(&store, &slot).await.unwrap();
        assert!(store
            .doctor_slot_taken(doctor.id, slot.date, slot.hour, None)
            .await
            .unwrap());
        assert!(!store
            .doctor_slot_taken(doctor.id, slot.date, slot.hour, Some(first.id))
            .await
            .unwrap());

        let err = ConsultationRepository::insert(&store, &slot).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation { ref constraint } if constraint == "uq_consultations_doctor_slot"));

        // Updating a consultation onto its own slot is not a conflict.
        let updated = ConsultationRepository::update(&store, first.id, &slot).await.unwrap();
        assert_eq!(updated.map(|c| c.id), Some(first.id));
    }

    #[tokio::test]
    async fn deleting_ordonnance_cascades_to_lines() {
        let (store, doctor, patient) = seeded().await;
        let medicament = MedicamentRepository::insert(
            &store,
            &NewMedicament {
                name: "Paracetamol".to_string(),
                dosage_form: "Comprimé".to_string(),
                strength: "500mg".to_string(),
                atc_code: None,
            },
        )
        .await
        .unwrap();
        let ordonnance = OrdonnanceRepository::insert(
            &store,
            &NewOrdonnance {
                doctor_id: doctor.id,
                patient_id: patient.id,
                consultation_id: None,
                date: day(2025, 1, 15),
                notes: None,
            },
        )
        .await
        .unwrap();
        OrdonnanceLigneRepository::insert(
            &store,
            ordonnance.id,
            &NewOrdonnanceLigne {
                medicament_id: medicament.id,
                dosage: "500mg".to_string(),
                frequency: "3x/jour".to_string(),
                duration: "5 jours".to_string(),
                quantity: 15,
                instructions: None,
            },
        )
        .await
        .unwrap();

        assert!(store.has_lines(medicament.id).await.unwrap());
        assert!(OrdonnanceRepository::delete(&store, ordonnance.id).await.unwrap());
        assert_eq!(OrdonnanceLigneRepository::count(&store).await.unwrap(), 0);
        assert!(!store.has_lines(medicament.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_consultation_clears_ordonnance_link() {
        let (store, doctor, patient) = seeded().await;
        let consultation = ConsultationRepository::insert(
            &store,
            &NewConsultation {
                doctor_id: doctor.id,
                patient_id: patient.id,
                date: day(2025, 1, 15),
                hour: nine(),
                reason: None,
            },
        )
        .await
        .unwrap();
        let ordonnance = OrdonnanceRepository::insert(
            &store,
            &NewOrdonnance {
                doctor_id: doctor.id,
                patient_id: patient.id,
                consultation_id: Some(consultation.id),
                date: day(2025, 1, 15),
                notes: None,
            },
        )
        .await
        .unwrap();

        assert!(ConsultationRepository::delete(&store, consultation.id).await.unwrap());
        let reloaded = OrdonnanceRepository::get(&store, ordonnance.id).await.unwrap().unwrap();
        assert_eq!(reloaded.consultation_id, None);
    }

    #[tokio::test]
    async fn patients_of_doctor_are_distinct() {
        let (store, doctor, patient) = seeded().await;
        for hour in [9, 10] {
            ConsultationRepository::insert(
                &store,
                &NewConsultation {
                    doctor_id: doctor.id,
                    patient_id: patient.id,
                    date: day(2025, 1, 15),
                    hour: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                    reason: None,
                },
            )
            .await
            .unwrap();
        }
        let patients = store.patients_of(doctor.id).await.unwrap();
        assert_eq!(patients, vec![patient]);
    }
}
