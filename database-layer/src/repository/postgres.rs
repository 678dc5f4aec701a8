//! PostgreSQL-backed repositories
//!
//! Every query is a single round trip on the shared pool. Unique and foreign-key
//! violations come back as typed [`DatabaseError`](crate::DatabaseError)
//! variants through its `From<sqlx::Error>` impl.

use super::*;
use crate::query::FilteredQuery;
use sqlx::PgPool;
use tracing::debug;

const SPECIALTY_COLUMNS: &str = "id, name";
const DOCTOR_COLUMNS: &str = "id, specialty_id, last_name, first_name";
const PATIENT_COLUMNS: &str = "id, last_name, first_name, birth_date";

// ============================================================================
// SPECIALTIES
// ============================================================================

pub struct PgSpecialtyRepository {
    pool: PgPool,
}

impl PgSpecialtyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpecialtyRepository for PgSpecialtyRepository {
    async fn list(&self) -> DatabaseResult<Vec<Specialty>> {
        let rows = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Specialty>> {
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Specialty>> {
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM specialties
                WHERE name = $1 AND ($2::INTEGER IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_doctors(&self, id: i32) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM doctors WHERE specialty_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM specialties")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, specialty: &NewSpecialty) -> DatabaseResult<Specialty> {
        debug!(name = %specialty.name, "Inserting specialty");
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "INSERT INTO specialties (name) VALUES ($1) RETURNING {SPECIALTY_COLUMNS}"
        ))
        .bind(&specialty.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, specialty: &NewSpecialty) -> DatabaseResult<Option<Specialty>> {
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "UPDATE specialties SET name = $2 WHERE id = $1 RETURNING {SPECIALTY_COLUMNS}"
        ))
        .bind(id)
        .bind(&specialty.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM specialties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// DOCTORS
// ============================================================================

pub struct PgDoctorRepository {
    pool: PgPool,
}

impl PgDoctorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DoctorRepository for PgDoctorRepository {
    async fn list(&self) -> DatabaseResult<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY last_name ASC, first_name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_specialty(&self, specialty_id: i32) -> DatabaseResult<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE specialty_id = $1 \
             ORDER BY last_name ASC, first_name ASC"
        ))
        .bind(specialty_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Doctor>> {
        let row = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn identity_exists(
        &self,
        last_name: &str,
        first_name: &str,
        specialty_id: i32,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM doctors
                WHERE last_name = $1 AND first_name = $2 AND specialty_id = $3
                  AND ($4::INTEGER IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(last_name)
        .bind(first_name)
        .bind(specialty_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_dependents(&self, id: i32) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM consultations WHERE doctor_id = $1)
                OR EXISTS (SELECT 1 FROM ordonnances WHERE doctor_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn patients_of(&self, id: i32) -> DatabaseResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, Patient>(
            r#"
            SELECT p.id, p.last_name, p.first_name, p.birth_date
            FROM patients p
            WHERE EXISTS (
                SELECT 1 FROM consultations c
                WHERE c.patient_id = p.id AND c.doctor_id = $1
            )
            ORDER BY p.last_name ASC, p.first_name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM doctors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, doctor: &NewDoctor) -> DatabaseResult<Doctor> {
        let row = sqlx::query_as::<_, Doctor>(&format!(
            "INSERT INTO doctors (specialty_id, last_name, first_name) VALUES ($1, $2, $3) \
             RETURNING {DOCTOR_COLUMNS}"
        ))
        .bind(doctor.specialty_id)
        .bind(&doctor.last_name)
        .bind(&doctor.first_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, doctor: &NewDoctor) -> DatabaseResult<Option<Doctor>> {
        let row = sqlx::query_as::<_, Doctor>(&format!(
            "UPDATE doctors SET specialty_id = $2, last_name = $3, first_name = $4 \
             WHERE id = $1 RETURNING {DOCTOR_COLUMNS}"
        ))
        .bind(id)
        .bind(doctor.specialty_id)
        .bind(&doctor.last_name)
        .bind(&doctor.first_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// PATIENTS
// ============================================================================

pub struct PgPatientRepository {
    pool: PgPool,
}

impl PgPatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientRepository for PgPatientRepository {
    async fn list(&self) -> DatabaseResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY last_name ASC, first_name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Patient>> {
        let row = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn identity_exists(
        &self,
        last_name: &str,
        first_name: &str,
        birth_date: NaiveDate,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM patients
                WHERE last_name = $1 AND first_name = $2 AND birth_date = $3
                  AND ($4::INTEGER IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(last_name)
        .bind(first_name)
        .bind(birth_date)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_dependents(&self, id: i32) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM consultations WHERE patient_id = $1)
                OR EXISTS (SELECT 1 FROM ordonnances WHERE patient_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM patients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, patient: &NewPatient) -> DatabaseResult<Patient> {
        let row = sqlx::query_as::<_, Patient>(&format!(
            "INSERT INTO patients (last_name, first_name, birth_date) VALUES ($1, $2, $3) \
             RETURNING {PATIENT_COLUMNS}"
        ))
        .bind(&patient.last_name)
        .bind(&patient.first_name)
        .bind(patient.birth_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, patient: &NewPatient) -> DatabaseResult<Option<Patient>> {
        let row = sqlx::query_as::<_, Patient>(&format!(
            "UPDATE patients SET last_name = $2, first_name = $3, birth_date = $4 \
             WHERE id = $1 RETURNING {PATIENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&patient.last_name)
        .bind(&patient.first_name)
        .bind(patient.birth_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// CONSULTATIONS
// ============================================================================

const CONSULTATION_COLUMNS: &str = "id, doctor_id, patient_id, date, hour, reason";

pub struct PgConsultationRepository {
    pool: PgPool,
}

impl PgConsultationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsultationRepository for PgConsultationRepository {
    async fn list(&self, filter: &VisitFilter) -> DatabaseResult<Vec<Consultation>> {
        let mut query = FilteredQuery::new(
            "SELECT id, doctor_id, patient_id, date, hour, reason FROM consultations WHERE 1=1",
        );
        query
            .filter_visits("", filter)
            .order_by("date ASC, hour ASC, id ASC");
        let rows = query.build_query_as::<Consultation>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Consultation>> {
        let row = sqlx::query_as::<_, Consultation>(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn doctor_slot_taken(
        &self,
        doctor_id: i32,
        date: NaiveDate,
        hour: NaiveTime,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM consultations
                WHERE doctor_id = $1 AND date = $2 AND hour = $3
                  AND ($4::INTEGER IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(doctor_id)
        .bind(date)
        .bind(hour)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn patient_slot_taken(
        &self,
        patient_id: i32,
        date: NaiveDate,
        hour: NaiveTime,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM consultations
                WHERE patient_id = $1 AND date = $2 AND hour = $3
                  AND ($4::INTEGER IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(patient_id)
        .bind(date)
        .bind(hour)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_ordonnances(&self, id: i32) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ordonnances WHERE consultation_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM consultations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, consultation: &NewConsultation) -> DatabaseResult<Consultation> {
        let row = sqlx::query_as::<_, Consultation>(&format!(
            "INSERT INTO consultations (doctor_id, patient_id, date, hour, reason) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CONSULTATION_COLUMNS}"
        ))
        .bind(consultation.doctor_id)
        .bind(consultation.patient_id)
        .bind(consultation.date)
        .bind(consultation.hour)
        .bind(&consultation.reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        consultation: &NewConsultation,
    ) -> DatabaseResult<Option<Consultation>> {
        let row = sqlx::query_as::<_, Consultation>(&format!(
            "UPDATE consultations \
             SET doctor_id = $2, patient_id = $3, date = $4, hour = $5, reason = $6 \
             WHERE id = $1 RETURNING {CONSULTATION_COLUMNS}"
        ))
        .bind(id)
        .bind(consultation.doctor_id)
        .bind(consultation.patient_id)
        .bind(consultation.date)
        .bind(consultation.hour)
        .bind(&consultation.reason)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM consultations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// MEDICAMENTS
// ============================================================================

const MEDICAMENT_COLUMNS: &str = "id, name, dosage_form, strength, atc_code";

pub struct PgMedicamentRepository {
    pool: PgPool,
}

impl PgMedicamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicamentRepository for PgMedicamentRepository {
    async fn list(&self) -> DatabaseResult<Vec<Medicament>> {
        let rows = sqlx::query_as::<_, Medicament>(&format!(
            "SELECT {MEDICAMENT_COLUMNS} FROM medicaments ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Medicament>> {
        let row = sqlx::query_as::<_, Medicament>(&format!(
            "SELECT {MEDICAMENT_COLUMNS} FROM medicaments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Medicament>> {
        let row = sqlx::query_as::<_, Medicament>(&format!(
            "SELECT {MEDICAMENT_COLUMNS} FROM medicaments WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM medicaments
                WHERE name = $1 AND ($2::INTEGER IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_lines(&self, id: i32) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ordonnance_lignes WHERE medicament_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM medicaments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, medicament: &NewMedicament) -> DatabaseResult<Medicament> {
        let row = sqlx::query_as::<_, Medicament>(&format!(
            "INSERT INTO medicaments (name, dosage_form, strength, atc_code) \
             VALUES ($1, $2, $3, $4) RETURNING {MEDICAMENT_COLUMNS}"
        ))
        .bind(&medicament.name)
        .bind(&medicament.dosage_form)
        .bind(&medicament.strength)
        .bind(&medicament.atc_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        medicament: &NewMedicament,
    ) -> DatabaseResult<Option<Medicament>> {
        let row = sqlx::query_as::<_, Medicament>(&format!(
            "UPDATE medicaments SET name = $2, dosage_form = $3, strength = $4, atc_code = $5 \
             WHERE id = $1 RETURNING {MEDICAMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&medicament.name)
        .bind(&medicament.dosage_form)
        .bind(&medicament.strength)
        .bind(&medicament.atc_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM medicaments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// ORDONNANCES
// ============================================================================

const ORDONNANCE_COLUMNS: &str = "id, doctor_id, patient_id, consultation_id, date, notes";

pub struct PgOrdonnanceRepository {
    pool: PgPool,
}

impl PgOrdonnanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrdonnanceRepository for PgOrdonnanceRepository {
    async fn list(&self, filter: &VisitFilter) -> DatabaseResult<Vec<Ordonnance>> {
        let mut query = FilteredQuery::new(
            "SELECT id, doctor_id, patient_id, consultation_id, date, notes \
             FROM ordonnances WHERE 1=1",
        );
        query.filter_visits("", filter).order_by("date ASC, id ASC");
        let rows = query.build_query_as::<Ordonnance>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn list_by_consultation(&self, consultation_id: i32) -> DatabaseResult<Vec<Ordonnance>> {
        let rows = sqlx::query_as::<_, Ordonnance>(&format!(
            "SELECT {ORDONNANCE_COLUMNS} FROM ordonnances WHERE consultation_id = $1 \
             ORDER BY date ASC, id ASC"
        ))
        .bind(consultation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_medicament(&self, medicament_id: i32) -> DatabaseResult<Vec<Ordonnance>> {
        let rows = sqlx::query_as::<_, Ordonnance>(
            r#"
            SELECT o.id, o.doctor_id, o.patient_id, o.consultation_id, o.date, o.notes
            FROM ordonnances o
            WHERE EXISTS (
                SELECT 1 FROM ordonnance_lignes l
                WHERE l.ordonnance_id = o.id AND l.medicament_id = $1
            )
            ORDER BY o.date ASC, o.id ASC
            "#,
        )
        .bind(medicament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Ordonnance>> {
        let row = sqlx::query_as::<_, Ordonnance>(&format!(
            "SELECT {ORDONNANCE_COLUMNS} FROM ordonnances WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ordonnances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, ordonnance: &NewOrdonnance) -> DatabaseResult<Ordonnance> {
        let row = sqlx::query_as::<_, Ordonnance>(&format!(
            "INSERT INTO ordonnances (doctor_id, patient_id, consultation_id, date, notes) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ORDONNANCE_COLUMNS}"
        ))
        .bind(ordonnance.doctor_id)
        .bind(ordonnance.patient_id)
        .bind(ordonnance.consultation_id)
        .bind(ordonnance.date)
        .bind(&ordonnance.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i32,
        ordonnance: &NewOrdonnance,
    ) -> DatabaseResult<Option<Ordonnance>> {
        let row = sqlx::query_as::<_, Ordonnance>(&format!(
            "UPDATE ordonnances \
             SET doctor_id = $2, patient_id = $3, consultation_id = $4, date = $5, notes = $6 \
             WHERE id = $1 RETURNING {ORDONNANCE_COLUMNS}"
        ))
        .bind(id)
        .bind(ordonnance.doctor_id)
        .bind(ordonnance.patient_id)
        .bind(ordonnance.consultation_id)
        .bind(ordonnance.date)
        .bind(&ordonnance.notes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn link_consultation(
        &self,
        id: i32,
        consultation: &Consultation,
    ) -> DatabaseResult<Option<Ordonnance>> {
        let row = sqlx::query_as::<_, Ordonnance>(&format!(
            "UPDATE ordonnances SET consultation_id = $2, doctor_id = $3, patient_id = $4 \
             WHERE id = $1 RETURNING {ORDONNANCE_COLUMNS}"
        ))
        .bind(id)
        .bind(consultation.id)
        .bind(consultation.doctor_id)
        .bind(consultation.patient_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn unlink_consultation(&self, id: i32) -> DatabaseResult<Option<Ordonnance>> {
        let row = sqlx::query_as::<_, Ordonnance>(&format!(
            "UPDATE ordonnances SET consultation_id = NULL WHERE id = $1 \
             RETURNING {ORDONNANCE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        // ordonnance_lignes rows go through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM ordonnances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// ORDONNANCE LIGNES
// ============================================================================

const LIGNE_COLUMNS: &str =
    "id, ordonnance_id, medicament_id, dosage, frequency, duration, quantity, instructions";

pub struct PgOrdonnanceLigneRepository {
    pool: PgPool,
}

impl PgOrdonnanceLigneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrdonnanceLigneRepository for PgOrdonnanceLigneRepository {
    async fn list(&self, ordonnance_id: i32) -> DatabaseResult<Vec<OrdonnanceLigne>> {
        let rows = sqlx::query_as::<_, OrdonnanceLigne>(&format!(
            "SELECT {LIGNE_COLUMNS} FROM ordonnance_lignes WHERE ordonnance_id = $1 ORDER BY id ASC"
        ))
        .bind(ordonnance_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(
        &self,
        ordonnance_id: i32,
        ligne_id: i32,
    ) -> DatabaseResult<Option<OrdonnanceLigne>> {
        let row = sqlx::query_as::<_, OrdonnanceLigne>(&format!(
            "SELECT {LIGNE_COLUMNS} FROM ordonnance_lignes WHERE ordonnance_id = $1 AND id = $2"
        ))
        .bind(ordonnance_id)
        .bind(ligne_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn duplicate_exists(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
        exclude_id: Option<i32>,
    ) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM ordonnance_lignes
                WHERE ordonnance_id = $1 AND medicament_id = $2
                  AND dosage = $3 AND frequency = $4 AND duration = $5
                  AND ($6::INTEGER IS NULL OR id <> $6)
            )
            "#,
        )
        .bind(ordonnance_id)
        .bind(ligne.medicament_id)
        .bind(&ligne.dosage)
        .bind(&ligne.frequency)
        .bind(&ligne.duration)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ordonnance_lignes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(
        &self,
        ordonnance_id: i32,
        ligne: &NewOrdonnanceLigne,
    ) -> DatabaseResult<OrdonnanceLigne> {
        let row = sqlx::query_as::<_, OrdonnanceLigne>(&format!(
            "INSERT INTO ordonnance_lignes \
             (ordonnance_id, medicament_id, dosage, frequency, duration, quantity, instructions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LIGNE_COLUMNS}"
        ))
        .bind(ordonnance_id)
        .bind(ligne.medicament_id)
        .bind(&ligne.dosage)
        .bind(&ligne.frequency)
        .bind(&ligne.duration)
        .bind(ligne.quantity)
        .bind(&ligne.instructions)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        ordonnance_id: i32,
        ligne_id: i32,
        ligne: &NewOrdonnanceLigne,
    ) -> DatabaseResult<Option<OrdonnanceLigne>> {
        let row = sqlx::query_as::<_, OrdonnanceLigne>(&format!(
            "UPDATE ordonnance_lignes \
             SET medicament_id = $3, dosage = $4, frequency = $5, duration = $6, \
                 quantity = $7, instructions = $8 \
             WHERE ordonnance_id = $1 AND id = $2 RETURNING {LIGNE_COLUMNS}"
        ))
        .bind(ordonnance_id)
        .bind(ligne_id)
        .bind(ligne.medicament_id)
        .bind(&ligne.dosage)
        .bind(&ligne.frequency)
        .bind(&ligne.duration)
        .bind(ligne.quantity)
        .bind(&ligne.instructions)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, ordonnance_id: i32, ligne_id: i32) -> DatabaseResult<bool> {
        let result =
            sqlx::query("DELETE FROM ordonnance_lignes WHERE ordonnance_id = $1 AND id = $2")
                .bind(ordonnance_id)
                .bind(ligne_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
