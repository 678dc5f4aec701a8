pub mod paths;

use axum::{
    routing::{delete, get, put},
    Router,
};
use crate::{
    handlers::{consultations, doctors, health, medicaments, ordonnances, patients, specialties},
    openapi,
    server::HospitalServer,
};

/// Create health check routes
pub fn health_routes() -> Router<HospitalServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

pub fn specialty_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::specialties::SPECIALTIES,
            get(specialties::list_specialties).post(specialties::create_specialty),
        )
        .route(
            paths::specialties::SPECIALTY_BY_ID,
            get(specialties::get_specialty)
                .put(specialties::update_specialty)
                .delete(specialties::delete_specialty),
        )
        .route(
            paths::specialties::SPECIALTY_DOCTORS,
            get(specialties::list_specialty_doctors),
        )
}

pub fn doctor_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::doctors::DOCTORS,
            get(doctors::list_doctors).post(doctors::create_doctor),
        )
        .route(
            paths::doctors::DOCTOR_BY_ID,
            get(doctors::get_doctor)
                .put(doctors::update_doctor)
                .delete(doctors::delete_doctor),
        )
        .route(paths::doctors::DOCTOR_SPECIALTY, get(doctors::get_doctor_specialty))
        .route(
            paths::doctors::DOCTOR_CHANGE_SPECIALTY,
            put(doctors::change_doctor_specialty),
        )
        .route(
            paths::doctors::DOCTOR_CONSULTATIONS,
            get(doctors::list_doctor_consultations),
        )
        .route(paths::doctors::DOCTOR_PATIENTS, get(doctors::list_doctor_patients))
        .route(
            paths::doctors::DOCTOR_ORDONNANCES,
            get(doctors::list_doctor_ordonnances),
        )
}

pub fn patient_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::patients::PATIENTS,
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            paths::patients::PATIENT_BY_ID,
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            paths::patients::PATIENT_CONSULTATIONS,
            get(patients::list_patient_consultations),
        )
        .route(
            paths::patients::PATIENT_ORDONNANCES,
            get(patients::list_patient_ordonnances),
        )
}

pub fn consultation_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::consultations::CONSULTATIONS,
            get(consultations::list_consultations).post(consultations::create_consultation),
        )
        .route(
            paths::consultations::CONSULTATION_BY_ID,
            get(consultations::get_consultation)
                .put(consultations::update_consultation)
                .delete(consultations::delete_consultation),
        )
        .route(
            paths::consultations::CONSULTATION_ORDONNANCES,
            get(consultations::list_consultation_ordonnances)
                .post(consultations::create_consultation_ordonnance),
        )
}

pub fn medicament_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::medicaments::MEDICAMENTS,
            get(medicaments::list_medicaments).post(medicaments::create_medicament),
        )
        .route(
            paths::medicaments::MEDICAMENT_BY_ID,
            get(medicaments::get_medicament)
                .put(medicaments::update_medicament)
                .delete(medicaments::delete_medicament),
        )
        .route(
            paths::medicaments::MEDICAMENT_ORDONNANCES,
            get(medicaments::list_medicament_ordonnances),
        )
}

/// Ordonnances, their lines and the consultation link
pub fn ordonnance_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::ordonnances::ORDONNANCES,
            get(ordonnances::list_ordonnances).post(ordonnances::create_ordonnance),
        )
        .route(
            paths::ordonnances::ORDONNANCE_BY_ID,
            get(ordonnances::get_ordonnance)
                .put(ordonnances::update_ordonnance)
                .delete(ordonnances::delete_ordonnance),
        )
        .route(
            paths::ordonnances::ORDONNANCE_LIGNES,
            get(ordonnances::list_lignes).post(ordonnances::create_ligne),
        )
        .route(
            paths::ordonnances::ORDONNANCE_LIGNE_BY_ID,
            get(ordonnances::get_ligne)
                .put(ordonnances::update_ligne)
                .delete(ordonnances::delete_ligne),
        )
        .route(
            paths::ordonnances::ORDONNANCE_LINK_CONSULTATION,
            put(ordonnances::link_ordonnance_consultation),
        )
        .route(
            paths::ordonnances::ORDONNANCE_CONSULTATION,
            delete(ordonnances::unlink_ordonnance_consultation),
        )
}

/// Create the resource routes served under `/api`
pub fn api_routes() -> Router<HospitalServer> {
    Router::new()
        .merge(specialty_routes())
        .merge(doctor_routes())
        .merge(patient_routes())
        .merge(consultation_routes())
        .merge(medicament_routes())
        .merge(ordonnance_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<HospitalServer> {
    Router::new()
        .merge(health_routes())
        .merge(openapi::create_docs_routes())
        .nest(paths::API, api_routes())
}
