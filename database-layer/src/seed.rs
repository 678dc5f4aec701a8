//! Reference catalogues and demo data loaded at startup
//!
//! `specialties.csv` and `medicaments.csv` are read from the configured data
//! directory. Each file is only applied to an empty table, so restarting the
//! server never duplicates rows. The demo dataset is written through the same
//! repositories the services use and is skipped as soon as any clinical
//! table already holds data.

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::*;
use crate::repository::Repositories;
use chrono::{Days, NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SPECIALTIES_FILE: &str = "specialties.csv";
pub const MEDICAMENTS_FILE: &str = "medicaments.csv";

const SPECIALTY_NAME_MAX: usize = 30;
const MEDICAMENT_NAME_MAX: usize = 100;
const DOSAGE_FORM_MAX: usize = 30;
const STRENGTH_MAX: usize = 30;
const ATC_CODE_MAX: usize = 20;

/// What to load and where from
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub data_dir: PathBuf,
    pub demo_data: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            demo_data: true,
        }
    }
}

/// Rows written by a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub specialties: usize,
    pub medicaments: usize,
    pub demo_loaded: bool,
}

/// Load both catalogues, then the demo dataset when enabled.
pub async fn run(repos: &Repositories, options: &SeedOptions) -> DatabaseResult<SeedReport> {
    let specialties = seed_specialties(repos, &options.data_dir.join(SPECIALTIES_FILE)).await?;
    let medicaments = seed_medicaments(repos, &options.data_dir.join(MEDICAMENTS_FILE)).await?;
    let demo_loaded = if options.demo_data {
        seed_demo(repos).await?
    } else {
        false
    };

    info!(
        specialties = specialties,
        medicaments = medicaments,
        demo_loaded = demo_loaded,
        "Seed data applied"
    );

    Ok(SeedReport {
        specialties,
        medicaments,
        demo_loaded,
    })
}

async fn read_catalogue(path: &Path) -> DatabaseResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Seed file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(DatabaseError::QueryFailed(format!(
            "cannot read {}: {e}",
            path.display()
        ))),
    }
}

fn clip(raw: &str, max: usize) -> String {
    raw.trim().chars().take(max).collect()
}

/// Parse `id,name` rows after the header; names are trimmed, clipped and deduplicated.
pub fn parse_specialties(content: &str) -> Vec<NewSpecialty> {
    let mut specialties: Vec<NewSpecialty> = Vec::new();
    for line in content.lines().skip(1) {
        let mut parts = line.split(',');
        let Some(name) = parts.nth(1).map(|raw| clip(raw, SPECIALTY_NAME_MAX)) else {
            continue;
        };
        if name.is_empty() || specialties.iter().any(|s| s.name == name) {
            continue;
        }
        specialties.push(NewSpecialty { name });
    }
    specialties
}

/// Parse `id,name,dosageForm,strength[,atcCode]` rows after the header.
pub fn parse_medicaments(content: &str) -> Vec<NewMedicament> {
    let mut medicaments: Vec<NewMedicament> = Vec::new();
    for line in content.lines().skip(1) {
        let parts: Vec<&str> = line.split(',').collect();
        let (Some(name), Some(form), Some(strength)) = (parts.get(1), parts.get(2), parts.get(3))
        else {
            continue;
        };
        let name = clip(name, MEDICAMENT_NAME_MAX);
        let dosage_form = clip(form, DOSAGE_FORM_MAX);
        let strength = clip(strength, STRENGTH_MAX);
        if name.is_empty() || dosage_form.is_empty() || strength.is_empty() {
            continue;
        }
        if medicaments.iter().any(|m| m.name == name) {
            continue;
        }
        let atc_code = parts
            .get(4)
            .map(|raw| clip(raw, ATC_CODE_MAX))
            .filter(|code| !code.is_empty());
        medicaments.push(NewMedicament {
            name,
            dosage_form,
            strength,
            atc_code,
        });
    }
    medicaments
}

pub async fn seed_specialties(repos: &Repositories, path: &Path) -> DatabaseResult<usize> {
    if repos.specialties.count().await? > 0 {
        debug!("Specialties already present, skipping catalogue");
        return Ok(0);
    }
    let Some(content) = read_catalogue(path).await? else {
        return Ok(0);
    };

    let rows = parse_specialties(&content);
    for specialty in &rows {
        repos.specialties.insert(specialty).await?;
    }
    Ok(rows.len())
}

pub async fn seed_medicaments(repos: &Repositories, path: &Path) -> DatabaseResult<usize> {
    if repos.medicaments.count().await? > 0 {
        debug!("Medicaments already present, skipping catalogue");
        return Ok(0);
    }
    let Some(content) = read_catalogue(path).await? else {
        return Ok(0);
    };

    let rows = parse_medicaments(&content);
    for medicament in &rows {
        repos.medicaments.insert(medicament).await?;
    }
    Ok(rows.len())
}

// ============================================================================
// DEMO DATASET
// ============================================================================

const DEMO_SPECIALTIES: [&str; 6] = [
    "Cardiologie",
    "Dermatologie",
    "Neurologie",
    "Pédiatrie",
    "Chirurgie Orthopédique",
    "Ophtalmologie",
];

/// (last name, first name, specialty)
const DEMO_DOCTORS: [(&str, &str, &str); 6] = [
    ("House", "Gregory", "Neurologie"),
    ("Lambert", "Sarah", "Dermatologie"),
    ("Wilson", "James", "Cardiologie"),
    ("Martin", "Emma", "Pédiatrie"),
    ("Morel", "Lucas", "Chirurgie Orthopédique"),
    ("Robert", "Clara", "Ophtalmologie"),
];

/// (last name, first name, birth date)
const DEMO_PATIENTS: [(&str, &str, (i32, u32, u32)); 5] = [
    ("Dupont", "Alice", (1990, 3, 12)),
    ("Petit", "Marc", (1985, 7, 9)),
    ("Martin", "Elise", (2000, 11, 20)),
    ("Leroy", "Thomas", (1978, 5, 1)),
    ("Henry", "Julien", (1995, 9, 14)),
];

/// (doctor index, patient index, day offset, hour, minute, reason)
const DEMO_CONSULTATIONS: [(usize, usize, u64, u32, u32, &str); 10] = [
    (0, 0, 0, 9, 0, "Migraines récurrentes"),
    (0, 1, 0, 10, 0, "Douleurs cervicales"),
    (1, 0, 1, 11, 0, "Éruption cutanée"),
    (2, 2, 1, 9, 30, "Douleurs thoraciques"),
    (3, 3, 2, 14, 0, "Suivi pédiatrique"),
    (2, 0, 3, 10, 30, "Contrôle cardiologique"),
    (4, 1, 3, 15, 0, "Douleur au genou"),
    (5, 2, 4, 16, 0, "Baisse de vision"),
    (1, 3, 5, 9, 0, "Suivi dermatologique"),
    (3, 0, 5, 10, 0, "Vaccination"),
];

/// (consultation index, notes); doctor, patient and date come from the consultation
const DEMO_ORDONNANCES: [(usize, &str); 5] = [
    (0, "Traitement initial"),
    (5, "Suivi cardiologique"),
    (1, "Crème et antihistaminique"),
    (4, "Antalgiques légers"),
    (3, "Antibiothérapie courte"),
];

/// (ordonnance index, medicament, dosage, frequency, duration, quantity, instructions)
const DEMO_LIGNES: [(usize, &str, &str, &str, &str, i32, Option<&str>); 8] = [
    (0, "Paracetamol", "500mg", "3x/jour", "5 jours", 15, Some("Après les repas")),
    (0, "Ibuprofene", "400mg", "2x/jour", "3 jours", 6, Some("Avec un grand verre d'eau")),
    (1, "Paracetamol", "500mg", "3x/jour", "7 jours", 21, Some("Ne pas dépasser la dose")),
    (1, "Omeprazole", "20mg", "1x/jour", "14 jours", 14, Some("Le matin à jeun")),
    (1, "Salbutamol", "100mcg", "2 inhalations 3x/jour", "10 jours", 1, Some("Agiter avant usage")),
    (2, "Ibuprofene", "400mg", "2x/jour", "5 jours", 10, None),
    (3, "Paracetamol", "500mg", "3x/jour", "3 jours", 9, None),
    (4, "Amoxicilline", "500mg", "3x/jour", "7 jours", 21, Some("Finir le traitement même en cas d'amélioration")),
];

fn demo_base_date() -> DatabaseResult<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 1, 15).ok_or_else(|| invalid_demo("base date"))
}

fn invalid_demo(what: &str) -> DatabaseError {
    DatabaseError::InternalError(anyhow::anyhow!("invalid demo {what}"))
}

fn pick<'a, T>(rows: &'a [T], index: usize, what: &str) -> DatabaseResult<&'a T> {
    rows.get(index).ok_or_else(|| invalid_demo(what))
}

/// Write the demo dataset; returns false when it was skipped.
pub async fn seed_demo(repos: &Repositories) -> DatabaseResult<bool> {
    let populated = repos.doctors.count().await? > 0
        || repos.patients.count().await? > 0
        || repos.consultations.count().await? > 0
        || repos.ordonnances.count().await? > 0;
    if populated {
        debug!("Clinical data already present, skipping demo dataset");
        return Ok(false);
    }

    let mut specialties = HashMap::new();
    for name in DEMO_SPECIALTIES {
        match repos.specialties.find_by_name(name).await? {
            Some(specialty) => {
                specialties.insert(name, specialty.id);
            }
            None => {
                warn!(specialty = name, "Demo dataset needs a missing specialty, skipping");
                return Ok(false);
            }
        }
    }

    let mut doctors = Vec::with_capacity(DEMO_DOCTORS.len());
    for (last_name, first_name, specialty) in DEMO_DOCTORS {
        let specialty_id = *specialties
            .get(specialty)
            .ok_or_else(|| invalid_demo("specialty"))?;
        let doctor = repos
            .doctors
            .insert(&NewDoctor {
                specialty_id,
                last_name: last_name.to_string(),
                first_name: first_name.to_string(),
            })
            .await?;
        doctors.push(doctor);
    }

    let mut patients = Vec::with_capacity(DEMO_PATIENTS.len());
    for (last_name, first_name, (year, month, day)) in DEMO_PATIENTS {
        let birth_date =
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid_demo("birth date"))?;
        let patient = repos
            .patients
            .insert(&NewPatient {
                last_name: last_name.to_string(),
                first_name: first_name.to_string(),
                birth_date,
            })
            .await?;
        patients.push(patient);
    }

    let base = demo_base_date()?;
    let mut consultations = Vec::with_capacity(DEMO_CONSULTATIONS.len());
    for (doctor, patient, offset, hour, minute, reason) in DEMO_CONSULTATIONS {
        let date = base
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| invalid_demo("consultation date"))?;
        let hour = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| invalid_demo("hour"))?;
        let consultation = repos
            .consultations
            .insert(&NewConsultation {
                doctor_id: pick(&doctors, doctor, "doctor")?.id,
                patient_id: pick(&patients, patient, "patient")?.id,
                date,
                hour,
                reason: Some(reason.to_string()),
            })
            .await?;
        consultations.push(consultation);
    }

    let mut ordonnances = Vec::with_capacity(DEMO_ORDONNANCES.len());
    for (consultation, notes) in DEMO_ORDONNANCES {
        let consultation = pick(&consultations, consultation, "consultation")?;
        let ordonnance = repos
            .ordonnances
            .insert(&NewOrdonnance {
                doctor_id: consultation.doctor_id,
                patient_id: consultation.patient_id,
                consultation_id: Some(consultation.id),
                date: consultation.date,
                notes: Some(notes.to_string()),
            })
            .await?;
        ordonnances.push(ordonnance);
    }

    let mut lignes = 0usize;
    for (ordonnance, medicament, dosage, frequency, duration, quantity, instructions) in DEMO_LIGNES
    {
        let Some(medicament) = repos.medicaments.find_by_name(medicament).await? else {
            warn!(medicament = medicament, "Demo line references a missing medicament, skipping");
            continue;
        };
        repos
            .lignes
            .insert(
                pick(&ordonnances, ordonnance, "ordonnance")?.id,
                &NewOrdonnanceLigne {
                    medicament_id: medicament.id,
                    dosage: dosage.to_string(),
                    frequency: frequency.to_string(),
                    duration: duration.to_string(),
                    quantity,
                    instructions: instructions.map(str::to_string),
                },
            )
            .await?;
        lignes += 1;
    }

    info!(
        doctors = doctors.len(),
        patients = patients.len(),
        consultations = consultations.len(),
        ordonnances = ordonnances.len(),
        lignes = lignes,
        "Demo dataset loaded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECIALTIES: &str = "id,name\n1,Cardiologie\n2,Dermatologie\n3,Neurologie\n4,Pédiatrie\n\
                               5,Chirurgie Orthopédique\n6,Ophtalmologie\n7, Cardiologie \n";

    const MEDICAMENTS: &str = "id,name,dosageForm,strength,atcCode\n\
                               1,Paracetamol,Comprimé,500mg,N02BE01\n\
                               2,Ibuprofene,Comprimé,400mg,\n\
                               3,Amoxicilline,Gélule,500mg,J01CA04\n\
                               4,Omeprazole,Gélule,20mg,A02BC01\n\
                               5,Salbutamol,Aérosol,100mcg,R03AC02\n\
                               6,Héparine,Injectable,5000UI,B01AB01\n\
                               7,Broken,,10mg\n";

    #[test]
    fn specialty_rows_are_trimmed_and_deduplicated() {
        let rows = parse_specialties(SPECIALTIES);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].name, "Cardiologie");
        assert_eq!(rows[4].name, "Chirurgie Orthopédique");
    }

    #[test]
    fn long_specialty_names_are_clipped_by_character() {
        let long = "é".repeat(40);
        let rows = parse_specialties(&format!("id,name\n1,{long}\n"));
        assert_eq!(rows[0].name.chars().count(), 30);
    }

    #[test]
    fn medicament_rows_need_required_columns() {
        let rows = parse_medicaments(MEDICAMENTS);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].atc_code.as_deref(), Some("N02BE01"));
        assert_eq!(rows[1].atc_code, None);
        assert!(rows.iter().all(|m| m.name != "Broken"));
    }

    async fn write_catalogues(dir: &Path) {
        tokio::fs::write(dir.join(SPECIALTIES_FILE), SPECIALTIES).await.unwrap();
        tokio::fs::write(dir.join(MEDICAMENTS_FILE), MEDICAMENTS).await.unwrap();
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hospital-seed-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn full_run_loads_catalogues_and_demo_once() {
        let dir = scratch_dir("full");
        write_catalogues(&dir).await;
        let repos = Repositories::in_memory();
        let options = SeedOptions {
            data_dir: dir.clone(),
            demo_data: true,
        };

        let report = run(&repos, &options).await.unwrap();
        assert_eq!(report.specialties, 6);
        assert_eq!(report.medicaments, 6);
        assert!(report.demo_loaded);
        assert_eq!(repos.doctors.count().await.unwrap(), 6);
        assert_eq!(repos.patients.count().await.unwrap(), 5);
        assert_eq!(repos.consultations.count().await.unwrap(), 10);
        assert_eq!(repos.ordonnances.count().await.unwrap(), 5);
        assert_eq!(repos.lignes.count().await.unwrap(), 8);

        let again = run(&repos, &options).await.unwrap();
        assert_eq!(again, SeedReport::default());
        assert_eq!(repos.doctors.count().await.unwrap(), 6);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn demo_ordonnances_match_their_consultations() {
        let dir = scratch_dir("consistency");
        write_catalogues(&dir).await;
        let repos = Repositories::in_memory();
        run(
            &repos,
            &SeedOptions {
                data_dir: dir.clone(),
                demo_data: true,
            },
        )
        .await
        .unwrap();

        for ordonnance in repos.ordonnances.list(&VisitFilter::default()).await.unwrap() {
            let consultation = repos
                .consultations
                .get(ordonnance.consultation_id.unwrap())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(ordonnance.doctor_id, consultation.doctor_id);
            assert_eq!(ordonnance.patient_id, consultation.patient_id);
            assert!(ordonnance.date >= consultation.date);
        }

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn missing_files_are_skipped() {
        let repos = Repositories::in_memory();
        let report = run(
            &repos,
            &SeedOptions {
                data_dir: PathBuf::from("/nonexistent/hospital-data"),
                demo_data: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(report, SeedReport::default());
    }
}
